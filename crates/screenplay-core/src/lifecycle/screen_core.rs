// ── Per-screen lifecycle bookkeeping ──
//
// Every screen embeds one `ScreenCore` and hands it out through
// `Screen::core()`. The lifecycle driver in `screen.rs` is the only writer
// of its state; everything else reads it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::state::{LifecycleState, ScreenId};
use crate::conductor::ConductorLink;
use crate::error::CoreError;
use crate::reactive::ReactiveValue;
use crate::scope::Scope;

/// Identity, lifecycle state and phase scopes of one screen.
pub struct ScreenCore {
    id: ScreenId,
    name: String,
    state: ReactiveValue<LifecycleState>,
    /// Flips `false -> true` exactly once, right after initialization.
    initialized: ReactiveValue<bool>,
    init_scope: Scope,
    activation: RefCell<Option<Scope>>,
    activations: Cell<u64>,
    transitioning: Cell<bool>,
    /// Lookup-only back edge; the conductor's item list owns the screen.
    parent: RefCell<Option<Weak<dyn ConductorLink>>>,
}

impl ScreenCore {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ScreenId::next(),
            state: ReactiveValue::new(format!("{name}.state"), LifecycleState::Created),
            initialized: ReactiveValue::new(format!("{name}.initialized"), false),
            init_scope: Scope::new(format!("{name}/init")),
            activation: RefCell::new(None),
            activations: Cell::new(0),
            transitioning: Cell::new(false),
            parent: RefCell::new(None),
            name,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Lifecycle state as an observable property.
    pub fn state_value(&self) -> &ReactiveValue<LifecycleState> {
        &self.state
    }

    /// Initialization-complete marker. Observers of this value see `true`
    /// only once every `on_initialize` wiring is in place.
    pub fn initialized(&self) -> &ReactiveValue<bool> {
        &self.initialized
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Scope released only on disposal.
    pub fn init_scope(&self) -> &Scope {
        &self.init_scope
    }

    /// Scope of the current activation, if active.
    pub fn activation_scope(&self) -> Option<Scope> {
        self.activation.borrow().clone()
    }

    /// Number of activations started so far.
    pub fn activations(&self) -> u64 {
        self.activations.get()
    }

    /// The owning conductor, if any and still alive.
    pub fn parent(&self) -> Option<Rc<dyn ConductorLink>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    // ── Lifecycle driver internals ───────────────────────────────────

    pub(crate) fn set_state(&self, state: LifecycleState) {
        self.state.set(state);
    }

    pub(crate) fn mark_initialized(&self) {
        self.initialized.set(true);
    }

    pub(crate) fn begin_activation(&self) -> Scope {
        let n = self.activations.get() + 1;
        self.activations.set(n);
        Scope::new(format!("{}/activation-{n}", self.name))
    }

    pub(crate) fn seat_activation(&self, scope: Scope) {
        self.activation.replace(Some(scope));
    }

    pub(crate) fn take_activation(&self) -> Option<Scope> {
        self.activation.take()
    }

    pub(crate) fn set_parent(&self, parent: Weak<dyn ConductorLink>) {
        self.parent.replace(Some(parent));
    }

    pub(crate) fn clear_parent(&self) {
        self.parent.replace(None);
    }

    /// Mark the screen as mid-transition. Fails if a transition is already
    /// running further up the stack (a hook re-entering its own lifecycle).
    pub(crate) fn enter(&self) -> Result<TransitionGuard<'_>, CoreError> {
        if self.transitioning.replace(true) {
            return Err(CoreError::TransitionInProgress {
                screen: self.name.clone(),
            });
        }
        Ok(TransitionGuard {
            flag: &self.transitioning,
        })
    }
}

impl fmt::Debug for ScreenCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenCore")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("activations", &self.activations.get())
            .finish_non_exhaustive()
    }
}

pub(crate) struct TransitionGuard<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
