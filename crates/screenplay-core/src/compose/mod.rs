// ── Reference compositions ──
//
// Screens built purely from the public runtime API.

mod board;
mod counter;

pub use board::CounterBoard;
pub use counter::{CounterScreen, CounterStrategy};
