// ── Hot multicast source ──
//
// Every subscriber sees the same emissions, in registration order. The
// observer list is snapshotted before each delivery so handlers may
// subscribe or unsubscribe re-entrantly.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::observable::{Handler, Observable};
use super::subscription::Subscription;

/// A push source that multicasts each emitted value to all current
/// subscribers, synchronously.
pub struct Subject<T> {
    inner: Rc<SubjectInner<T>>,
}

struct SubjectInner<T> {
    slots: RefCell<Vec<Rc<Slot<T>>>>,
    next_id: Cell<u64>,
}

struct Slot<T> {
    id: u64,
    /// Cleared on unsubscribe; checked before every delivery.
    live: Cell<bool>,
    handler: Handler<T>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SubjectInner {
                slots: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Deliver `value` to every subscriber registered when the call starts.
    ///
    /// A subscriber removed during the delivery (by an earlier handler) is
    /// skipped.
    pub fn emit(&self, value: T) {
        let slots: Vec<Rc<Slot<T>>> = self.inner.slots.borrow().clone();
        for slot in slots {
            if slot.live.get() {
                (slot.handler)(&value);
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    /// A handle that subscribes to this subject.
    pub fn observable(&self) -> Observable<T> {
        let subject = self.clone();
        Observable::create(move |handler| subject.attach(handler))
    }

    pub(crate) fn attach(&self, handler: Handler<T>) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let slot = Rc::new(Slot {
            id,
            live: Cell::new(true),
            handler,
        });
        self.inner.slots.borrow_mut().push(Rc::clone(&slot));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            slot.live.set(false);
            if let Some(inner) = weak.upgrade() {
                inner.slots.borrow_mut().retain(|s| s.id != slot.id);
            }
        })
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.inner.slots.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn emits_to_subscribers_in_registration_order() {
        let subject = Subject::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = subject.observable().subscribe(move |v: &i32| l1.borrow_mut().push(("a", *v)));
        let l2 = Rc::clone(&log);
        let _b = subject.observable().subscribe(move |v: &i32| l2.borrow_mut().push(("b", *v)));

        subject.emit(1);
        subject.emit(2);
        assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let subject = Subject::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = subject.observable().subscribe(move |_: &()| c.set(c.get() + 1));

        subject.emit(());
        drop(sub);
        subject.emit(());
        assert_eq!(count.get(), 1);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn unsubscribe_mid_emission_skips_later_handler() {
        let subject = Subject::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let ran = Rc::new(Cell::new(false));

        let v = Rc::clone(&victim);
        let _killer = subject.observable().subscribe(move |_: &()| {
            let sub = v.borrow_mut().take();
            drop(sub);
        });
        let r = Rc::clone(&ran);
        *victim.borrow_mut() = Some(subject.observable().subscribe(move |_: &()| r.set(true)));

        subject.emit(());
        assert!(!ran.get());
    }
}
