// ── Counter screen ──
//
// The canonical derived-state composition: a total folded from signed
// deltas emitted by increment/decrement/reset commands, and decrement/reset
// gated on `total > 0`. The gate observes the very value the gated commands
// produce, so the two wiring strategies differ only in how that cycle is
// broken:
//
// - `Deferred`: total is a pure fold over the merged command results. The
//   gate starts as a constant `false` and switches to the real `total > 0`
//   signal when the initialized marker fires, after every command exists.
// - `TwoPass`: total is a plain mutable value written by the command
//   effects; the gate just observes it from then on.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::command::Command;
use crate::error::CoreError;
use crate::lifecycle::{Screen, ScreenCore};
use crate::reactive::{Observable, ReactiveValue};
use crate::scope::Scope;

/// How the counter breaks the total/gate dependency cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CounterStrategy {
    #[default]
    Deferred,
    TwoPass,
}

struct CounterWiring {
    total: ReactiveValue<i64>,
    increment: Command<i64>,
    decrement: Command<i64>,
    reset: Command<i64>,
}

/// A screen holding one integer total and the commands that change it.
///
/// Accessors return `None` until the screen is initialized.
pub struct CounterScreen {
    core: ScreenCore,
    seed: i64,
    strategy: CounterStrategy,
    wiring: OnceCell<CounterWiring>,
}

impl CounterScreen {
    pub fn new(name: impl Into<String>, seed: i64, strategy: CounterStrategy) -> Self {
        Self {
            core: ScreenCore::new(name),
            seed,
            strategy,
            wiring: OnceCell::new(),
        }
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn strategy(&self) -> CounterStrategy {
        self.strategy
    }

    pub fn total(&self) -> Option<&ReactiveValue<i64>> {
        self.wiring.get().map(|w| &w.total)
    }

    /// Current total, or the seed before initialization.
    pub fn value(&self) -> i64 {
        self.total().map_or(self.seed, ReactiveValue::get)
    }

    /// Whether decrement is currently executable.
    pub fn can_decrement(&self) -> bool {
        self.decrement().is_some_and(Command::is_executable)
    }

    /// Emits `+1`.
    pub fn increment(&self) -> Option<&Command<i64>> {
        self.wiring.get().map(|w| &w.increment)
    }

    /// Emits `-1`; executable while the total is positive.
    pub fn decrement(&self) -> Option<&Command<i64>> {
        self.wiring.get().map(|w| &w.decrement)
    }

    /// Emits `-total`, bringing the total to zero; executable while the
    /// total is positive.
    pub fn reset(&self) -> Option<&Command<i64>> {
        self.wiring.get().map(|w| &w.reset)
    }

    fn wire_deferred(&self, scope: &Scope) -> CounterWiring {
        let name = self.core.name();
        let total = ReactiveValue::new(format!("{name}.total"), self.seed);

        let positive = {
            let total = total.clone();
            self.core
                .initialized()
                .observe()
                .map(move |ready: &bool| {
                    if *ready {
                        total.observe().map(|t: &i64| *t > 0)
                    } else {
                        Observable::just(false)
                    }
                })
                .switch_latest()
        };

        let increment = Command::create(scope, format!("{name}.increment"), |()| 1);
        let decrement = Command::create_with(scope, format!("{name}.decrement"), &positive, |()| -1);
        let reset = {
            let total = total.clone();
            Command::create_with(scope, format!("{name}.reset"), &positive, move |()| -total.get())
        };

        let deltas = Observable::merge([increment.results(), decrement.results(), reset.results()]);
        total.connect(&deltas.scan(self.seed, |acc: &i64, delta: &i64| acc + delta), scope);

        CounterWiring {
            total,
            increment,
            decrement,
            reset,
        }
    }

    fn wire_two_pass(&self, scope: &Scope) -> CounterWiring {
        let name = self.core.name();
        let total = ReactiveValue::new(format!("{name}.total"), self.seed);
        let positive = total.observe().map(|t: &i64| *t > 0);

        let increment = {
            let total = total.clone();
            Command::create(scope, format!("{name}.increment"), move |()| {
                total.update(|t| t + 1);
                1
            })
        };
        let decrement = {
            let total = total.clone();
            Command::create_with(scope, format!("{name}.decrement"), &positive, move |()| {
                total.update(|t| t - 1);
                -1
            })
        };
        let reset = {
            let total = total.clone();
            Command::create_with(scope, format!("{name}.reset"), &positive, move |()| {
                let delta = -total.get();
                total.set(0);
                delta
            })
        };

        CounterWiring {
            total,
            increment,
            decrement,
            reset,
        }
    }
}

impl Screen for CounterScreen {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn on_initialize(&self, scope: &Scope) -> Result<(), CoreError> {
        let wiring = match self.strategy {
            CounterStrategy::Deferred => self.wire_deferred(scope),
            CounterStrategy::TwoPass => self.wire_two_pass(scope),
        };
        debug!(screen = %self.core.name(), strategy = %self.strategy, seed = self.seed, "counter wired");
        self.wiring
            .set(wiring)
            .map_err(|_| CoreError::failed(format!("counter '{}' wired twice", self.core.name())))
    }

    fn on_activate(&self, scope: &Scope) -> Result<(), CoreError> {
        if let Some(total) = self.total() {
            let name = self.core.name().to_owned();
            total.changes().subscribe_in(scope, move |value: &i64| {
                debug!(screen = %name, total = *value, "total changed");
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Outcome;
    use crate::lifecycle::Lifecycle;
    use pretty_assertions::assert_eq;

    fn both() -> [CounterStrategy; 2] {
        [CounterStrategy::Deferred, CounterStrategy::TwoPass]
    }

    #[test]
    fn nothing_is_wired_before_initialize() {
        let counter = CounterScreen::new("c", 4, CounterStrategy::Deferred);
        assert!(counter.total().is_none());
        assert_eq!(counter.value(), 4);
        assert!(!counter.can_decrement());
    }

    #[test]
    fn first_activation_is_safe_for_both_strategies() {
        for strategy in both() {
            let counter = CounterScreen::new("c", 2, strategy);
            counter.activate().unwrap();
            assert!(counter.can_decrement(), "{strategy}");
            assert_eq!(counter.value(), 2);
        }
    }

    #[test]
    fn gate_follows_total() {
        for strategy in both() {
            let counter = CounterScreen::new("c", 0, strategy);
            counter.initialize().unwrap();
            assert!(!counter.can_decrement());

            assert_eq!(counter.increment().unwrap().invoke(), Outcome::Executed(1));
            assert!(counter.can_decrement(), "{strategy}");
            assert_eq!(counter.decrement().unwrap().invoke(), Outcome::Executed(-1));
            assert!(counter.decrement().unwrap().invoke().is_refused());
            assert_eq!(counter.value(), 0);
        }
    }

    #[test]
    fn reset_zeroes_positive_total() {
        for strategy in both() {
            let counter = CounterScreen::new("c", 3, strategy);
            counter.initialize().unwrap();

            assert_eq!(counter.reset().unwrap().invoke(), Outcome::Executed(-3));
            assert_eq!(counter.value(), 0);
            assert!(counter.reset().unwrap().invoke().is_refused());
        }
    }

    #[test]
    fn disposal_releases_commands() {
        let counter = CounterScreen::new("c", 1, CounterStrategy::Deferred);
        counter.activate().unwrap();
        counter.dispose();

        assert!(counter.increment().unwrap().invoke().is_refused());
        assert_eq!(counter.value(), 1);
    }
}
