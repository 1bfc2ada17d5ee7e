// ── Screen lifecycle ──
//
// Two-phase lifecycle: one-time initialization, then any number of
// activate/deactivate cycles, each with its own disposable scope.

mod screen_core;
mod screen;
mod state;

pub use screen_core::ScreenCore;
pub use screen::{Lifecycle, Screen, ScreenRef};
pub use state::{LifecycleState, ScreenId};
