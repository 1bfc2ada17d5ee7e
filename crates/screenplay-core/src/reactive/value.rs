// ── Reactive value ──
//
// A named, observable property. The current value is stored before any
// notification goes out, so a synchronous observer never reads a stale
// value. Setting an equal value is a no-op.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::observable::{Handler, Observable};
use super::subject::Subject;
use crate::scope::Scope;

/// A single named property whose changes are observable.
///
/// Cloning a `ReactiveValue` creates a new handle to the **same** property.
pub struct ReactiveValue<T> {
    inner: Rc<ValueInner<T>>,
}

struct ValueInner<T> {
    name: String,
    value: RefCell<T>,
    /// Bumped exactly once per accepted change.
    version: Cell<u64>,
    changed: Subject<T>,
}

impl<T> Clone for ReactiveValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveValue<T> {
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            inner: Rc::new(ValueInner {
                name: name.into(),
                value: RefCell::new(initial),
                version: Cell::new(0),
                changed: Subject::new(),
            }),
        }
    }

    /// A value that follows `source` for the lifetime of `scope`, starting
    /// from `seed`.
    pub fn from_observable(
        name: impl Into<String>,
        seed: T,
        source: &Observable<T>,
        scope: &Scope,
    ) -> Self {
        let value = Self::new(name, seed);
        value.connect(source, scope);
        value
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Store `value` and notify observers. Returns `false` (and notifies
    /// nobody) when the value is unchanged.
    pub fn set(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        self.inner.value.replace(value.clone());
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        trace!(value = %self.inner.name, version, "value changed");
        self.inner.changed.emit(value);
        true
    }

    /// `f` runs on a copy of the current value, so it may read or set this
    /// value itself.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let current = self.get();
        let next = f(&current);
        self.set(next)
    }

    /// Changes after subscription, without the current value.
    pub fn changes(&self) -> Observable<T> {
        self.inner.changed.observable()
    }

    /// The current value at subscription time, then every change.
    pub fn observe(&self) -> Observable<T> {
        let this = self.clone();
        Observable::create(move |down: Handler<T>| {
            let sub = this.inner.changed.attach(Rc::clone(&down));
            down(&this.get());
            sub
        })
    }

    /// Push every value of `source` into this property until `scope` closes.
    pub fn connect(&self, source: &Observable<T>, scope: &Scope) {
        let weak = Rc::downgrade(&self.inner);
        source.subscribe_in(scope, move |value: &T| {
            if let Some(inner) = weak.upgrade() {
                ReactiveValue { inner }.set(value.clone());
            }
        });
    }

    /// A derived value computed from this one, kept in sync until `scope`
    /// closes.
    pub fn derive<U: Clone + PartialEq + 'static>(
        &self,
        name: impl Into<String>,
        scope: &Scope,
        f: impl Fn(&T) -> U + 'static,
    ) -> ReactiveValue<U> {
        let seed = self.with(&f);
        ReactiveValue::from_observable(name, seed, &self.changes().map(f), scope)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveValue")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}
