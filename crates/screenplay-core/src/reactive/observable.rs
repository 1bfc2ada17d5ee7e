// ── Push-based observable and operators ──
//
// An `Observable<T>` is a subscribe function. Operators wrap the upstream
// subscribe function; per-subscription state (scan accumulators, latest
// values, the current inner stream) lives inside the subscription, so every
// subscriber gets an independent pipeline over the same hot sources.
//
// Delivery is synchronous: an emission runs every downstream handler before
// the emitting call returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::subscription::Subscription;
use crate::scope::Scope;

pub(crate) type Handler<T> = Rc<dyn Fn(&T)>;

/// A composable push stream of `T` values.
///
/// Cloning an `Observable` clones the handle; each [`subscribe()`](Self::subscribe)
/// builds a fresh operator chain over the shared upstream sources.
pub struct Observable<T> {
    source: Rc<dyn Fn(Handler<T>) -> Subscription>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: 'static> Observable<T> {
    /// Build an observable from a subscribe function.
    pub fn create(subscribe: impl Fn(Handler<T>) -> Subscription + 'static) -> Self {
        Self {
            source: Rc::new(subscribe),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        (self.source)(Rc::new(handler))
    }

    /// Subscribe for the lifetime of `scope`.
    ///
    /// The handler checks the scope's cancellation token before every
    /// delivery, so nothing reaches it once the scope has begun closing,
    /// even in the middle of an upstream emission.
    pub fn subscribe_in(&self, scope: &Scope, handler: impl Fn(&T) + 'static) {
        let token = scope.token();
        if token.is_cancelled() {
            warn!(scope = %scope.name(), "subscription requested on a closed scope; ignored");
            return;
        }
        let sub = self.subscribe(move |value| {
            if !token.is_cancelled() {
                handler(value);
            }
        });
        sub.dispose_with(scope);
    }

    /// An observable that never emits.
    pub fn never() -> Self {
        Self::create(|_| Subscription::empty())
    }

    /// Emits `value` once to each subscriber, at subscription time.
    pub fn just(value: T) -> Self
    where
        T: Clone,
    {
        Self::create(move |down| {
            down(&value);
            Subscription::empty()
        })
    }

    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Observable<U> {
        let upstream = self.clone();
        let f = Rc::new(f);
        Observable::create(move |down: Handler<U>| {
            let f = Rc::clone(&f);
            upstream.subscribe(move |value| down(&f(value)))
        })
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T> {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Observable::create(move |down: Handler<T>| {
            let predicate = Rc::clone(&predicate);
            upstream.subscribe(move |value| {
                if predicate(value) {
                    down(value);
                }
            })
        })
    }

    /// Interleave several sources of the same element type, preserving the
    /// order in which the sources emit.
    pub fn merge(sources: impl IntoIterator<Item = Observable<T>>) -> Observable<T> {
        let sources: Rc<Vec<Observable<T>>> = Rc::new(sources.into_iter().collect());
        Observable::create(move |down: Handler<T>| {
            let subs = sources
                .iter()
                .map(|source| {
                    let down = Rc::clone(&down);
                    source.subscribe(move |value| down(value))
                })
                .collect();
            Subscription::join(subs)
        })
    }

    pub fn merge_with(&self, other: &Observable<T>) -> Observable<T> {
        Self::merge([self.clone(), other.clone()])
    }

    /// Fold over time. Each subscriber starts from its own copy of `seed`.
    pub fn scan<A: Clone + 'static>(
        &self,
        seed: A,
        fold: impl Fn(&A, &T) -> A + 'static,
    ) -> Observable<A> {
        let upstream = self.clone();
        let fold = Rc::new(fold);
        Observable::create(move |down: Handler<A>| {
            let acc = Rc::new(RefCell::new(seed.clone()));
            let fold = Rc::clone(&fold);
            upstream.subscribe(move |value| {
                let next = fold(&acc.borrow(), value);
                *acc.borrow_mut() = next.clone();
                down(&next);
            })
        })
    }

    /// Emit `value` to each subscriber before any upstream value.
    pub fn start_with(&self, value: T) -> Observable<T>
    where
        T: Clone,
    {
        let upstream = self.clone();
        Observable::create(move |down: Handler<T>| {
            down(&value);
            let down = Rc::clone(&down);
            upstream.subscribe(move |v| down(v))
        })
    }

    pub fn distinct_until_changed(&self) -> Observable<T>
    where
        T: Clone + PartialEq,
    {
        let upstream = self.clone();
        Observable::create(move |down: Handler<T>| {
            let last: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
            upstream.subscribe(move |value| {
                if last.borrow().as_ref() == Some(value) {
                    return;
                }
                *last.borrow_mut() = Some(value.clone());
                down(value);
            })
        })
    }

    /// Drop the first `count` values of each subscription.
    pub fn skip(&self, count: usize) -> Observable<T> {
        let upstream = self.clone();
        Observable::create(move |down: Handler<T>| {
            let remaining = Rc::new(Cell::new(count));
            upstream.subscribe(move |value| {
                if remaining.get() > 0 {
                    remaining.set(remaining.get() - 1);
                } else {
                    down(value);
                }
            })
        })
    }

    /// Pair the latest values of two sources. Emits once both have produced
    /// a value, then again whenever either one emits.
    pub fn combine_latest<U: Clone + 'static>(&self, other: &Observable<U>) -> Observable<(T, U)>
    where
        T: Clone,
    {
        let left = self.clone();
        let right = other.clone();
        Observable::create(move |down: Handler<(T, U)>| {
            let latest: Rc<RefCell<(Option<T>, Option<U>)>> = Rc::new(RefCell::new((None, None)));

            let emit = {
                let latest = Rc::clone(&latest);
                Rc::new(move || {
                    let pair = match &*latest.borrow() {
                        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                        _ => None,
                    };
                    if let Some(pair) = pair {
                        down(&pair);
                    }
                })
            };

            let left_sub = {
                let latest = Rc::clone(&latest);
                let emit = Rc::clone(&emit);
                left.subscribe(move |value| {
                    latest.borrow_mut().0 = Some(value.clone());
                    emit();
                })
            };
            let right_sub = {
                let latest = Rc::clone(&latest);
                right.subscribe(move |value| {
                    latest.borrow_mut().1 = Some(value.clone());
                    emit();
                })
            };
            Subscription::join(vec![left_sub, right_sub])
        })
    }

    /// N-ary combine-latest. Emits the vector of latest values once every
    /// source has produced one, then on every further emission.
    ///
    /// With no sources, emits a single empty vector at subscription time.
    pub fn combine_latest_all(sources: impl IntoIterator<Item = Observable<T>>) -> Observable<Vec<T>>
    where
        T: Clone,
    {
        let sources: Rc<Vec<Observable<T>>> = Rc::new(sources.into_iter().collect());
        Observable::create(move |down: Handler<Vec<T>>| {
            if sources.is_empty() {
                down(&Vec::new());
                return Subscription::empty();
            }
            let latest: Rc<RefCell<Vec<Option<T>>>> = Rc::new(RefCell::new(vec![None; sources.len()]));
            let subs = sources
                .iter()
                .enumerate()
                .map(|(index, source)| {
                    let latest = Rc::clone(&latest);
                    let down = Rc::clone(&down);
                    source.subscribe(move |value| {
                        let snapshot: Option<Vec<T>> = {
                            let mut slots = latest.borrow_mut();
                            slots[index] = Some(value.clone());
                            slots.iter().cloned().collect()
                        };
                        if let Some(values) = snapshot {
                            down(&values);
                        }
                    })
                })
                .collect();
            Subscription::join(subs)
        })
    }
}

impl<T: 'static> Observable<Observable<T>> {
    /// Flatten a stream of streams to the values of the most recent inner
    /// stream. The previous inner stream is unsubscribed before the next
    /// one is subscribed.
    pub fn switch_latest(&self) -> Observable<T> {
        let outer = self.clone();
        Observable::create(move |down: Handler<T>| {
            let current: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
            // Bumped on every switch; an inner handler only forwards while
            // its own epoch is the current one.
            let epoch = Rc::new(Cell::new(0_u64));

            let outer_sub = {
                let current = Rc::clone(&current);
                let epoch = Rc::clone(&epoch);
                outer.subscribe(move |inner: &Observable<T>| {
                    let mine = epoch.get() + 1;
                    epoch.set(mine);

                    let previous = current.borrow_mut().take();
                    drop(previous);

                    let down = Rc::clone(&down);
                    let live = Rc::clone(&epoch);
                    let sub = inner.subscribe(move |value| {
                        if live.get() == mine {
                            down(value);
                        }
                    });
                    if epoch.get() == mine {
                        *current.borrow_mut() = Some(sub);
                    }
                })
            };

            Subscription::new(move || {
                outer_sub.unsubscribe();
                epoch.set(epoch.get() + 1);
                let inner = current.borrow_mut().take();
                drop(inner);
            })
        })
    }
}
