// ── Reactive composition engine ──
//
// Single-threaded, synchronous push streams:
//
// - `Subject`: hot multicast source.
// - `Observable`: composable subscribe function with `map`, `filter`,
//   `merge`, `scan`, `combine_latest`, `switch_latest` and friends.
// - `ReactiveValue`: named property with current value + change stream.
// - `Subscription`: RAII guard, unsubscribes on drop.

mod observable;
mod subject;
mod subscription;
mod value;

pub use observable::Observable;
pub use subject::Subject;
pub use subscription::Subscription;
pub use value::ReactiveValue;
