//! Property tests: for any sequence of increment/decrement requests the
//! total equals the running sum of emitted deltas and never goes negative.
#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use screenplay_core::{CounterScreen, CounterStrategy, Lifecycle, Outcome};

#[derive(Debug, Clone, Copy)]
enum Op {
    Increment,
    Decrement,
    Reset,
    Cycle,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Increment),
        4 => Just(Op::Decrement),
        1 => Just(Op::Reset),
        1 => Just(Op::Cycle),
    ]
}

fn strategy() -> impl Strategy<Value = CounterStrategy> {
    prop_oneof![Just(CounterStrategy::Deferred), Just(CounterStrategy::TwoPass)]
}

proptest! {
    #[test]
    fn total_is_running_sum_and_never_negative(
        seed in 0_i64..5,
        wiring in strategy(),
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let counter = CounterScreen::new("prop", seed, wiring);
        counter.activate().unwrap();

        let observed = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&observed);
        let _sub = counter
            .total()
            .unwrap()
            .changes()
            .subscribe(move |t: &i64| o.borrow_mut().push(*t));

        let mut expected = seed;
        for step in ops {
            let was_positive = counter.value() > 0;
            let outcome = match step {
                Op::Increment => counter.increment().unwrap().invoke(),
                Op::Decrement => counter.decrement().unwrap().invoke(),
                Op::Reset => counter.reset().unwrap().invoke(),
                Op::Cycle => {
                    counter.deactivate(false);
                    counter.activate().unwrap();
                    continue;
                }
            };
            match outcome {
                Outcome::Executed(delta) => expected += delta,
                Outcome::Refused => {
                    prop_assert!(!matches!(step, Op::Increment));
                    prop_assert!(!was_positive);
                }
                Outcome::Faulted(err) => prop_assert!(false, "unexpected fault: {err}"),
            }
            prop_assert_eq!(counter.value(), expected);
            prop_assert_eq!(counter.can_decrement(), expected > 0);
        }

        prop_assert!(observed.borrow().iter().all(|t| *t >= 0));
    }
}
