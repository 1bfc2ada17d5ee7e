// ── Command API ──
//
// An invocable unit gated by a can-execute signal. Invoking a command whose
// signal is currently false is a normal negative outcome
// (`Outcome::Refused`), never an error, and never queued.

mod combined;

use std::fmt;
use std::rc::Rc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::reactive::{Observable, ReactiveValue, Subject};
use crate::scope::Scope;

/// Result of one invocation attempt.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<O> {
    /// The effect ran and produced a result.
    Executed(O),
    /// The command was not executable; no effect ran.
    Refused,
    /// The effect ran and failed.
    Faulted(CoreError),
}

impl<O> Outcome<O> {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Refused)
    }

    /// The produced result, if the effect ran successfully.
    pub fn executed(self) -> Option<O> {
        match self {
            Self::Executed(value) => Some(value),
            Self::Refused | Self::Faulted(_) => None,
        }
    }
}

type Effect<O, I> = Box<dyn Fn(I) -> Result<O, CoreError>>;

/// A named, invocable unit with a can-execute signal and a result stream.
///
/// Cheaply cloneable; clones share state. `I` is the invocation parameter,
/// `()` for parameterless commands.
pub struct Command<O, I = ()> {
    inner: Rc<CommandInner<O, I>>,
}

struct CommandInner<O, I> {
    name: String,
    effect: Effect<O, I>,
    can_execute: ReactiveValue<bool>,
    is_executing: ReactiveValue<bool>,
    results: Subject<O>,
    faults: Subject<CoreError>,
    /// Cancelled when the creating scope closes.
    lifetime: CancellationToken,
}

impl<O, I> Clone for Command<O, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<O: Clone + 'static, I: 'static> Command<O, I> {
    /// A command that is always executable while its scope is open.
    pub fn create(scope: &Scope, name: impl Into<String>, effect: impl Fn(I) -> O + 'static) -> Self {
        Self::try_create(scope, name, None, move |input| Ok(effect(input)))
    }

    /// A command gated by `can_execute`.
    ///
    /// Until the signal produces its first value the command is not
    /// executable.
    pub fn create_with(
        scope: &Scope,
        name: impl Into<String>,
        can_execute: &Observable<bool>,
        effect: impl Fn(I) -> O + 'static,
    ) -> Self {
        Self::try_create(scope, name, Some(can_execute), move |input| Ok(effect(input)))
    }

    /// A command with a fallible effect. Failures are returned as
    /// [`Outcome::Faulted`] and published on [`faults()`](Self::faults).
    pub fn try_create(
        scope: &Scope,
        name: impl Into<String>,
        can_execute: Option<&Observable<bool>>,
        effect: impl Fn(I) -> Result<O, CoreError> + 'static,
    ) -> Self {
        let name = name.into();
        let gate = match can_execute {
            Some(signal) => {
                let value = ReactiveValue::new(format!("{name}.can_execute"), false);
                value.connect(signal, scope);
                value
            }
            None => ReactiveValue::new(format!("{name}.can_execute"), true),
        };
        // A command whose scope has closed reads as disabled.
        let closed = gate.clone();
        scope.add(move || {
            closed.set(false);
        });

        Self {
            inner: Rc::new(CommandInner {
                is_executing: ReactiveValue::new(format!("{name}.is_executing"), false),
                name,
                effect: Box::new(effect),
                can_execute: gate,
                results: Subject::new(),
                faults: Subject::new(),
                lifetime: scope.token(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The can-execute signal as a reactive value.
    pub fn can_execute(&self) -> &ReactiveValue<bool> {
        &self.inner.can_execute
    }

    pub fn is_executing(&self) -> &ReactiveValue<bool> {
        &self.inner.is_executing
    }

    /// Whether an invocation right now would run the effect.
    pub fn is_executable(&self) -> bool {
        !self.inner.lifetime.is_cancelled()
            && self.inner.can_execute.get()
            && !self.inner.is_executing.get()
    }

    /// Results of successful invocations.
    pub fn results(&self) -> Observable<O> {
        self.inner.results.observable()
    }

    /// Errors raised by the effect.
    pub fn faults(&self) -> Observable<CoreError> {
        self.inner.faults.observable()
    }

    /// Invoke the command with `input`.
    pub fn execute(&self, input: I) -> Outcome<O> {
        let inner = &self.inner;
        if !self.is_executable() {
            debug!(command = %inner.name, "execution refused");
            return Outcome::Refused;
        }

        inner.is_executing.set(true);
        let result = (inner.effect)(input);
        inner.is_executing.set(false);

        match result {
            Ok(output) => {
                debug!(command = %inner.name, "executed");
                inner.results.emit(output.clone());
                Outcome::Executed(output)
            }
            Err(err) => {
                warn!(command = %inner.name, error = %err, "execution faulted");
                inner.faults.emit(err.clone());
                Outcome::Faulted(err)
            }
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<O: Clone + 'static> Command<O, ()> {
    /// Invoke a parameterless command.
    pub fn invoke(&self) -> Outcome<O> {
        self.execute(())
    }
}

impl<O, I> fmt::Debug for Command<O, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.inner.name)
            .field("can_execute", &self.inner.can_execute.get())
            .field("is_executing", &self.inner.is_executing.get())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn executes_and_publishes_result() {
        let scope = Scope::new("test");
        let cmd = Command::create(&scope, "double", |n: i32| n * 2);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = cmd.results().subscribe(move |v: &i32| s.borrow_mut().push(*v));

        assert_eq!(cmd.execute(21), Outcome::Executed(42));
        assert_eq!(*seen.borrow(), vec![42]);
    }

    #[test]
    fn refuses_while_signal_is_false() {
        let scope = Scope::new("test");
        let gate = ReactiveValue::new("gate", false);
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        let cmd = Command::create_with(&scope, "gated", &gate.observe(), move |()| r.set(true));

        assert!(cmd.invoke().is_refused());
        assert!(!ran.get());

        gate.set(true);
        assert!(cmd.invoke().is_executed());
        assert!(ran.get());
    }

    #[test]
    fn refuses_before_signal_emits() {
        let scope = Scope::new("test");
        let cmd = Command::create_with(&scope, "silent", &Observable::never(), |()| 1);
        assert!(!cmd.can_execute().get());
        assert!(cmd.invoke().is_refused());
    }

    #[test]
    fn refuses_after_scope_closes() {
        let scope = Scope::new("test");
        let cmd = Command::create(&scope, "noop", |()| ());
        assert!(cmd.can_execute().get());
        scope.close();
        assert!(!cmd.can_execute().get());
        assert!(cmd.invoke().is_refused());
    }

    #[test]
    fn reentrant_invocation_is_refused() {
        let scope = Scope::new("test");
        let slot: Rc<RefCell<Option<Command<bool>>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        let cmd = Command::create(&scope, "reentrant", move |()| {
            let inner = s.borrow().clone().unwrap();
            inner.invoke().is_refused()
        });
        *slot.borrow_mut() = Some(cmd.clone());

        assert_eq!(cmd.invoke(), Outcome::Executed(true));
        *slot.borrow_mut() = None;
    }

    #[test]
    fn fault_is_reported_not_panicked() {
        let scope = Scope::new("test");
        let cmd: Command<i32> =
            Command::try_create(&scope, "broken", None, |()| Err(CoreError::failed("nope")));
        let faults = Rc::new(Cell::new(0));
        let f = Rc::clone(&faults);
        let _sub = cmd.faults().subscribe(move |_| f.set(f.get() + 1));

        assert_eq!(cmd.invoke(), Outcome::Faulted(CoreError::failed("nope")));
        assert_eq!(faults.get(), 1);
        assert!(!cmd.is_executing().get());
    }
}
