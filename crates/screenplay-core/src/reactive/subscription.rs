use std::fmt;

use crate::scope::Scope;

/// RAII guard for a live subscription.
///
/// Dropping the guard (or calling [`unsubscribe()`](Self::unsubscribe))
/// detaches the handler before the next delivery, including a delivery
/// already in progress on the same source.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Combine several subscriptions into one guard. They are released in
    /// reverse order.
    pub fn join(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || {
            for sub in subscriptions.into_iter().rev() {
                sub.unsubscribe();
            }
        })
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Hand ownership to `scope`; the subscription ends when its release
    /// turn comes. Delivery is not token-guarded, so callers outside the
    /// crate go through [`Observable::subscribe_in`](super::Observable::subscribe_in).
    pub(crate) fn dispose_with(self, scope: &Scope) {
        scope.own(self);
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    fn release(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
