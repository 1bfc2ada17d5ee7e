//! Screen lifecycle and reactive command composition for UI view-models.
//!
//! This crate governs when a view-model's state streams are created, when
//! they become live, how nested view-models are composed and torn down, and
//! how enable/disable state is derived from child state:
//!
//! - **[`Scope`]**: accumulates release actions and runs each once, last
//!   registered first, when the scope closes. Every lifecycle phase owns one.
//!
//! - **Reactive engine** ([`reactive`]): single-threaded push streams.
//!   [`ReactiveValue`] is a named observable property; [`Observable`]
//!   composes with `map`, `merge`, `scan`, `combine_latest` and
//!   `switch_latest`.
//!
//! - **[`Command`]**: an invocable unit gated by a can-execute signal.
//!   [`Command::combined`] aggregates members and is executable while any
//!   member is.
//!
//! - **Screens** ([`lifecycle`]): one-time [`initialize`](Lifecycle::initialize),
//!   repeatable [`activate`](Lifecycle::activate) /
//!   [`deactivate`](Lifecycle::deactivate), each phase with its own scope.
//!
//! - **Conductors** ([`conductor`]): [`Single`], [`AllActive`] and
//!   [`OneActive`] own child screens and forward lifecycle to them.
//!
//! - **[`DialogHost`]**: shows a screen modally and resolves to one option.
//!
//! Everything is `!Send` and runs synchronously on the caller's thread.

pub mod command;
pub mod compose;
pub mod conductor;
pub mod dialog;
pub mod error;
pub mod lifecycle;
pub mod reactive;
pub mod scope;
pub mod settings;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, Outcome};
pub use compose::{CounterBoard, CounterScreen, CounterStrategy};
pub use conductor::{
    AllActive, Conducted, ConductorLink, KindRegistry, OneActive, ScreenFactory, ScreenKind,
    Single,
};
pub use dialog::{
    DialogHost, DialogOption, DialogPresenter, DialogRequest, DialogResponse, DialogResult,
    DialogSettings, OptionSet, StandardChoice,
};
pub use error::CoreError;
pub use lifecycle::{Lifecycle, LifecycleState, Screen, ScreenCore, ScreenId, ScreenRef};
pub use reactive::{Observable, ReactiveValue, Subject, Subscription};
pub use scope::Scope;
pub use settings::{RuntimeSettings, SwitchPolicy};
pub use view::{ViewResolver, bind_active_view};
