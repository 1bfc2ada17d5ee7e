// ── Disposable scope ──
//
// Accumulates release actions and runs each of them exactly once when the
// scope closes. Every lifecycle phase of a screen owns one of these.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

type ReleaseAction = Box<dyn FnOnce() -> Result<(), CoreError>>;

/// A container of release actions run once, in reverse registration order,
/// when the scope closes.
///
/// Cloning a `Scope` creates a new handle to the **same** scope. The scope
/// closes on an explicit [`close()`](Self::close) or when the last handle is
/// dropped.
///
/// Closing first cancels the scope's [`CancellationToken`], so handlers
/// subscribed through [`Observable::subscribe_in`](crate::Observable::subscribe_in)
/// stop receiving values before any release action runs.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    name: String,
    token: CancellationToken,
    closed: Cell<bool>,
    actions: RefCell<Vec<ReleaseAction>>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                name: name.into(),
                token: CancellationToken::new(),
                closed: Cell::new(false),
                actions: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether [`close()`](Self::close) has started.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Token cancelled the moment this scope begins closing.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Number of release actions still pending.
    pub fn len(&self) -> usize {
        self.inner.actions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register an infallible release action.
    pub fn add(&self, release: impl FnOnce() + 'static) {
        self.add_fallible(move || {
            release();
            Ok(())
        });
    }

    /// Register a release action that may fail. Failures never stop the
    /// remaining actions from running.
    ///
    /// Registering into a closed scope runs the action immediately.
    pub fn add_fallible(&self, release: impl FnOnce() -> Result<(), CoreError> + 'static) {
        if self.is_closed() {
            warn!(scope = %self.inner.name, "release action registered on a closed scope; releasing now");
            if let Err(err) = run_release(&self.inner.name, Box::new(release)) {
                warn!(scope = %self.inner.name, error = %err, "release action failed");
            }
            return;
        }
        self.inner.actions.borrow_mut().push(Box::new(release));
    }

    /// Keep `value` alive until the scope closes, then drop it.
    pub fn own<T: 'static>(&self, value: T) {
        self.add(move || drop(value));
    }

    /// Create a nested scope that closes together with this one.
    pub fn child(&self, name: impl Into<String>) -> Scope {
        let child = Scope::new(name);
        let handle = child.clone();
        self.add(move || {
            handle.close();
        });
        child
    }

    /// Run every registered release action once, last registered first.
    ///
    /// Returns the failures; each one is also logged. Closing an already
    /// closed scope is a no-op.
    pub fn close(&self) -> Vec<CoreError> {
        self.inner.close()
    }
}

impl ScopeInner {
    fn close(&self) -> Vec<CoreError> {
        if self.closed.replace(true) {
            debug!(scope = %self.name, "scope already closed");
            return Vec::new();
        }
        self.token.cancel();

        let mut failures = Vec::new();
        // Actions registered while closing are released immediately by
        // `add_fallible`, so one drain is enough.
        let actions = std::mem::take(&mut *self.actions.borrow_mut());
        let count = actions.len();
        for action in actions.into_iter().rev() {
            if let Err(err) = run_release(&self.name, action) {
                warn!(scope = %self.name, error = %err, "release action failed");
                failures.push(err);
            }
        }
        debug!(scope = %self.name, released = count, failed = failures.len(), "scope closed");
        failures
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        if !self.closed.get() {
            self.close();
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.inner.name)
            .field("closed", &self.is_closed())
            .field("pending", &self.len())
            .finish()
    }
}

fn run_release(scope: &str, action: ReleaseAction) -> Result<(), CoreError> {
    match panic::catch_unwind(AssertUnwindSafe(action)) {
        Ok(result) => result,
        Err(payload) => Err(CoreError::ReleaseFailed {
            scope: scope.into(),
            reason: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "release action panicked".into()
    }
}
