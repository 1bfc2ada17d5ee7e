//! End-to-end scenarios over the public API: counters, combined commands,
//! lifecycle cycling, one-active navigation and cancellation during
//! emission.
#![allow(clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use screenplay_core::{
    Command, CoreError, CounterBoard, CounterScreen, CounterStrategy, Lifecycle, LifecycleState,
    OneActive, Outcome, ReactiveValue, Scope, Screen, ScreenCore, ScreenKind, ScreenRef, Subject,
    SwitchPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn counter(name: &str, seed: i64, strategy: CounterStrategy) -> Rc<CounterScreen> {
    Rc::new(CounterScreen::new(name, seed, strategy))
}

/// Screen recording how often each hook ran.
struct Tracked {
    core: ScreenCore,
    inits: Cell<u32>,
    /// Per activation: (cycle, was the previous cycle's release already run).
    cycles: RefCell<Vec<(u64, bool)>>,
    released: Rc<Cell<u64>>,
}

impl Tracked {
    fn new(name: &str) -> Self {
        Self {
            core: ScreenCore::new(name),
            inits: Cell::new(0),
            cycles: RefCell::new(Vec::new()),
            released: Rc::new(Cell::new(0)),
        }
    }
}

impl Screen for Tracked {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn on_initialize(&self, _scope: &Scope) -> Result<(), CoreError> {
        self.inits.set(self.inits.get() + 1);
        Ok(())
    }

    fn on_activate(&self, scope: &Scope) -> Result<(), CoreError> {
        let cycle = self.core.activations();
        let previous_released = self.released.get() == cycle - 1;
        self.cycles.borrow_mut().push((cycle, previous_released));

        let released = Rc::clone(&self.released);
        scope.add(move || released.set(cycle));
        Ok(())
    }
}

// ── Counters ────────────────────────────────────────────────────────

#[test]
fn two_counters_scenario() {
    for strategy in [CounterStrategy::Deferred, CounterStrategy::TwoPass] {
        let a = counter("a", 0, strategy);
        let b = counter("b", 0, strategy);
        a.activate().unwrap();
        b.activate().unwrap();

        let inc = a.increment().unwrap();
        let dec = a.decrement().unwrap();
        assert!(inc.invoke().is_executed());
        assert!(inc.invoke().is_executed());
        assert!(dec.invoke().is_executed());
        assert_eq!(a.value(), 1);
        assert!(a.can_decrement());

        assert_eq!(b.decrement().unwrap().invoke(), Outcome::Refused);
        assert_eq!(b.value(), 0);
    }
}

#[test]
fn refused_command_changes_nothing() {
    let c = counter("c", 0, CounterStrategy::TwoPass);
    c.activate().unwrap();
    let total = c.total().unwrap();
    let version = total.version();

    assert!(c.decrement().unwrap().invoke().is_refused());
    assert!(c.reset().unwrap().invoke().is_refused());
    assert_eq!(total.version(), version);
    assert_eq!(total.get(), 0);
}

#[test]
fn combined_reset_scenario() {
    let a = counter("a", 3, CounterStrategy::Deferred);
    let b = counter("b", 0, CounterStrategy::Deferred);
    let board = CounterBoard::new("board", vec![Rc::clone(&a), Rc::clone(&b)]).unwrap();
    board.conductor().activate().unwrap();

    let reset_all = board.reset_all();
    assert!(reset_all.can_execute().get());

    let outcome = reset_all.invoke();
    assert_eq!(outcome, Outcome::Executed(vec![-3]));
    assert_eq!(board.reset_total().get(), -3);
    assert_eq!((a.value(), b.value()), (0, 0));
    assert_eq!(board.grand_total(), 0);
}

#[test]
fn combined_can_execute_tracks_members_instantly() {
    let scope = Scope::new("test");
    let gates: Vec<ReactiveValue<bool>> = (0..3)
        .map(|i| ReactiveValue::new(format!("gate-{i}"), false))
        .collect();
    let hits = Rc::new(RefCell::new(Vec::new()));
    let members: Vec<Command<usize>> = gates
        .iter()
        .enumerate()
        .map(|(i, gate)| {
            let hits = Rc::clone(&hits);
            Command::create_with(&scope, format!("m{i}"), &gate.observe(), move |()| {
                hits.borrow_mut().push(i);
                i
            })
        })
        .collect();
    let all = Command::combined(&scope, "all", members, None);

    for mask in 0_u8..8 {
        for (i, gate) in gates.iter().enumerate() {
            gate.set(mask & (1 << i) != 0);
        }
        assert_eq!(all.can_execute().get(), mask != 0, "mask {mask:03b}");

        hits.borrow_mut().clear();
        let expected: Vec<usize> = (0..3).filter(|i| mask & (1 << i) != 0).collect();
        let outcome = all.invoke();
        if mask == 0 {
            assert!(outcome.is_refused());
        } else {
            assert_eq!(outcome, Outcome::Executed(expected.clone()));
        }
        let ran = hits.borrow().clone();
        assert_eq!(ran, if mask == 0 { Vec::new() } else { expected });
    }
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[test]
fn initialize_once_and_cycles_release_in_order() {
    let screen = Tracked::new("tracked");
    for _ in 0..4 {
        screen.activate().unwrap();
        screen.deactivate(false);
    }

    assert_eq!(screen.inits.get(), 1);
    assert_eq!(
        *screen.cycles.borrow(),
        vec![(1, true), (2, true), (3, true), (4, true)]
    );
    assert_eq!(screen.released.get(), 4);
}

#[test]
fn state_is_observable() {
    let screen = Tracked::new("observed");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _sub = screen
        .core()
        .state_value()
        .observe()
        .subscribe(move |state: &LifecycleState| s.borrow_mut().push(*state));

    screen.activate().unwrap();
    screen.deactivate(true);
    screen.dispose();

    assert_eq!(
        *seen.borrow(),
        vec![
            LifecycleState::Created,
            LifecycleState::Initialized,
            LifecycleState::Active,
            LifecycleState::Deactivated,
            LifecycleState::Disposed,
        ]
    );
}

// ── Navigation ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Page {
    Dashboard,
    Reports,
}

impl ScreenKind for Page {}

fn navigator(built: &Rc<Cell<u32>>, policy: SwitchPolicy) -> Rc<OneActive<Page>> {
    let built = Rc::clone(built);
    let nav = OneActive::new("nav", move |kind: Page| -> Result<ScreenRef, CoreError> {
        built.set(built.get() + 1);
        Ok(ScreenRef::new(Tracked::new(match kind {
            Page::Dashboard => "dashboard",
            Page::Reports => "reports",
        })))
    });
    nav.set_switch_policy(policy);
    nav
}

#[test]
fn one_active_preserves_identity_under_both_policies() {
    for policy in [SwitchPolicy::KeepPrevious, SwitchPolicy::DeactivatePrevious] {
        let built = Rc::new(Cell::new(0));
        let nav = navigator(&built, policy);
        nav.activate().unwrap();

        let dashboard = nav.activate_kind(Page::Dashboard).unwrap();
        let reports = nav.activate_kind(Page::Reports).unwrap();
        let back = nav.activate_kind(Page::Dashboard).unwrap();

        assert_eq!(back, dashboard);
        assert_eq!(built.get(), 2);
        assert_eq!(nav.items(), vec![dashboard.clone(), reports.clone()]);

        let expected = match policy {
            SwitchPolicy::KeepPrevious => LifecycleState::Active,
            SwitchPolicy::DeactivatePrevious => LifecycleState::Deactivated,
        };
        assert_eq!(reports.state(), expected, "{policy}");
        assert_eq!(dashboard.state(), LifecycleState::Active);

        let tracked = dashboard.downcast::<Tracked>().unwrap();
        assert_eq!(tracked.inits.get(), 1);
    }
}

#[test]
fn active_item_value_drives_observers() {
    let built = Rc::new(Cell::new(0));
    let nav = navigator(&built, SwitchPolicy::KeepPrevious);
    let names = Rc::new(RefCell::new(Vec::new()));
    let n = Rc::clone(&names);
    let _sub = nav.active_item_value().changes().subscribe(move |item: &Option<ScreenRef>| {
        n.borrow_mut()
            .push(item.as_ref().map_or("-".to_owned(), |s| s.name().to_owned()));
    });

    nav.activate_kind(Page::Reports).unwrap();
    nav.activate_kind(Page::Dashboard).unwrap();
    nav.activate_kind(Page::Dashboard).unwrap();

    assert_eq!(*names.borrow(), vec!["reports", "dashboard"]);
}

// ── Cancellation ────────────────────────────────────────────────────

/// Subscribes two handlers to a merged stream inside its activation scope;
/// the first one deactivates the screen mid-emission.
struct SelfClosing {
    core: ScreenCore,
    source_a: Subject<u32>,
    source_b: Subject<u32>,
    me: RefCell<Option<std::rc::Weak<SelfClosing>>>,
    second_ran: Rc<Cell<u32>>,
}

impl Screen for SelfClosing {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn on_activate(&self, scope: &Scope) -> Result<(), CoreError> {
        let merged = self.source_a.observable().merge_with(&self.source_b.observable());

        let me = self.me.borrow().clone();
        merged.subscribe_in(scope, move |_: &u32| {
            if let Some(screen) = me.as_ref().and_then(std::rc::Weak::upgrade) {
                screen.deactivate(false);
            }
        });

        let second = Rc::clone(&self.second_ran);
        merged.subscribe_in(scope, move |_: &u32| second.set(second.get() + 1));
        Ok(())
    }
}

#[test]
fn closing_activation_scope_mid_emission_stops_later_handlers() {
    let screen = Rc::new(SelfClosing {
        core: ScreenCore::new("self-closing"),
        source_a: Subject::new(),
        source_b: Subject::new(),
        me: RefCell::new(None),
        second_ran: Rc::new(Cell::new(0)),
    });
    *screen.me.borrow_mut() = Some(Rc::downgrade(&screen));

    screen.activate().unwrap();
    screen.source_b.emit(7);

    assert_eq!(screen.core().state(), LifecycleState::Deactivated);
    assert_eq!(screen.second_ran.get(), 0);
    assert_eq!(screen.source_a.observer_count(), 0);
    assert_eq!(screen.source_b.observer_count(), 0);
}
