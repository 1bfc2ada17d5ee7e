// ── Counter board ──
//
// Several counters under one all-active conductor, with a combined reset
// command over the counters' own reset commands and a running total of
// everything the combined command has emitted.

use std::rc::Rc;

use tracing::debug;

use super::counter::CounterScreen;
use crate::command::Command;
use crate::conductor::AllActive;
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, Screen};
use crate::reactive::ReactiveValue;

pub struct CounterBoard {
    conductor: Rc<AllActive>,
    counters: Vec<Rc<CounterScreen>>,
    reset_all: Command<Vec<i64>>,
    reset_total: ReactiveValue<i64>,
}

impl CounterBoard {
    /// Seat `counters` (initializing them) and wire the combined reset.
    pub fn new(name: &str, counters: Vec<Rc<CounterScreen>>) -> Result<Self, CoreError> {
        let conductor = AllActive::new(name);
        conductor.initialize()?;
        for counter in &counters {
            conductor.add(Rc::clone(counter))?;
        }

        let members = counters
            .iter()
            .map(|c| {
                c.reset()
                    .cloned()
                    .ok_or_else(|| CoreError::failed(format!("counter '{}' is not wired", c.core().name())))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scope = conductor.core().init_scope().child(format!("{name}/board"));
        let reset_all = Command::combined(&scope, format!("{name}.reset_all"), members, None);
        let folded = reset_all
            .results()
            .scan(0, |acc: &i64, deltas: &Vec<i64>| acc + deltas.iter().sum::<i64>());
        let reset_total = ReactiveValue::from_observable(format!("{name}.reset_total"), 0, &folded, &scope);
        debug!(board = %name, counters = counters.len(), "board wired");

        Ok(Self {
            conductor,
            counters,
            reset_all,
            reset_total,
        })
    }

    pub fn conductor(&self) -> &Rc<AllActive> {
        &self.conductor
    }

    pub fn counters(&self) -> &[Rc<CounterScreen>] {
        &self.counters
    }

    /// Resets every counter whose own reset is executable.
    pub fn reset_all(&self) -> &Command<Vec<i64>> {
        &self.reset_all
    }

    /// Sum of every delta the combined reset has produced.
    pub fn reset_total(&self) -> &ReactiveValue<i64> {
        &self.reset_total
    }

    pub fn grand_total(&self) -> i64 {
        self.counters.iter().map(|c| c.value()).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Outcome;
    use crate::compose::CounterStrategy;
    use crate::lifecycle::ScreenRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn combined_reset_skips_zero_counters() {
        let a = Rc::new(CounterScreen::new("a", 3, CounterStrategy::Deferred));
        let b = Rc::new(CounterScreen::new("b", 0, CounterStrategy::Deferred));
        let board = CounterBoard::new("board", vec![Rc::clone(&a), Rc::clone(&b)]).unwrap();
        board.conductor().activate().unwrap();

        assert!(board.reset_all().can_execute().get());
        assert_eq!(board.reset_all().invoke(), Outcome::Executed(vec![-3]));
        assert_eq!(board.reset_total().get(), -3);
        assert_eq!((a.value(), b.value()), (0, 0));
        assert!(!board.reset_all().can_execute().get());
    }

    #[test]
    fn closing_the_last_resettable_counter_disables_reset_all() {
        let a = Rc::new(CounterScreen::new("a", 3, CounterStrategy::Deferred));
        let b = Rc::new(CounterScreen::new("b", 0, CounterStrategy::Deferred));
        let board = CounterBoard::new("board", vec![Rc::clone(&a), Rc::clone(&b)]).unwrap();
        board.conductor().activate().unwrap();
        assert!(board.reset_all().can_execute().get());

        let seated: ScreenRef = Rc::clone(&a).into();
        board.conductor().close_item(&seated).unwrap();

        assert!(!a.reset().unwrap().can_execute().get());
        assert!(!board.reset_all().can_execute().get());
        assert!(board.reset_all().invoke().is_refused());
        assert_eq!(board.reset_total().get(), 0);
    }

    #[test]
    fn disposing_board_conductor_disposes_counters() {
        let a = Rc::new(CounterScreen::new("a", 1, CounterStrategy::TwoPass));
        let board = CounterBoard::new("board", vec![Rc::clone(&a)]).unwrap();

        board.conductor().dispose();
        assert!(a.core().state().is_terminal());
        assert!(board.reset_all().invoke().is_refused());
    }
}
