// ── Screen lifecycle driver ──
//
// `Screen` is what applications implement: a `ScreenCore` plus optional
// hooks. `Lifecycle` is the driver, blanket-implemented for every screen,
// that enforces the state machine around those hooks.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::screen_core::ScreenCore;
use super::state::{LifecycleState, ScreenId};
use crate::conductor::Conducted;
use crate::error::CoreError;
use crate::scope::Scope;

/// An activatable component.
///
/// Implementors own a [`ScreenCore`] and override whichever hooks they
/// need. Hooks are called only by the [`Lifecycle`] driver.
pub trait Screen: 'static {
    fn core(&self) -> &ScreenCore;

    /// One-time wiring. Everything registered on `scope` lives until the
    /// screen is disposed. An error faults the screen permanently.
    fn on_initialize(&self, _scope: &Scope) -> Result<(), CoreError> {
        Ok(())
    }

    /// Per-activation wiring. `scope` is fresh for every activation and is
    /// closed on the matching deactivation.
    fn on_activate(&self, _scope: &Scope) -> Result<(), CoreError> {
        Ok(())
    }

    /// Called before the activation scope closes. `close` is set when the
    /// screen is being closed rather than merely hidden.
    fn on_deactivate(&self, _close: bool) {}

    /// Conductors return their child list so lifecycle calls are forwarded.
    fn conducted(&self) -> Option<&dyn Conducted> {
        None
    }
}

/// Lifecycle transitions, available on every [`Screen`].
pub trait Lifecycle: Screen {
    /// Run `on_initialize` once. Later calls are no-ops, except on a
    /// faulted or disposed screen, which reports its terminal state.
    fn initialize(&self) -> Result<(), CoreError> {
        let core = self.core();
        match core.state() {
            LifecycleState::Created => {}
            LifecycleState::Faulted => return Err(faulted(core)),
            LifecycleState::Disposed => return Err(disposed(core)),
            LifecycleState::Initialized | LifecycleState::Active | LifecycleState::Deactivated => {
                return Ok(());
            }
        }
        let _guard = core.enter()?;

        debug!(screen = %core.name(), "initializing");
        if let Err(err) = self.on_initialize(core.init_scope()) {
            warn!(screen = %core.name(), error = %err, "initialization failed");
            core.init_scope().close();
            core.set_state(LifecycleState::Faulted);
            return Err(CoreError::initialization(core.name(), err));
        }

        core.set_state(LifecycleState::Initialized);
        core.mark_initialized();
        debug!(screen = %core.name(), "initialized");
        Ok(())
    }

    /// Activate with a fresh activation scope, initializing first if
    /// needed. Activating an active screen is a no-op.
    ///
    /// On failure everything acquired by this activation is released and
    /// the screen stays in its previous (inactive) state.
    fn activate(&self) -> Result<(), CoreError> {
        let core = self.core();
        match core.state() {
            LifecycleState::Active => return Ok(()),
            LifecycleState::Created => self.initialize()?,
            LifecycleState::Faulted => return Err(faulted(core)),
            LifecycleState::Disposed => return Err(disposed(core)),
            LifecycleState::Initialized | LifecycleState::Deactivated => {}
        }
        let _guard = core.enter()?;

        let scope = core.begin_activation();
        debug!(screen = %core.name(), activation = core.activations(), "activating");

        if let Err(err) = self.on_activate(&scope) {
            warn!(screen = %core.name(), error = %err, "activation failed");
            scope.close();
            return Err(CoreError::activation(core.name(), err));
        }
        if let Some(children) = self.conducted() {
            if let Err(err) = children.activate_children() {
                warn!(screen = %core.name(), error = %err, "child activation failed; rolling back");
                self.on_deactivate(false);
                scope.close();
                return Err(CoreError::activation(core.name(), err));
            }
        }

        core.seat_activation(scope);
        core.set_state(LifecycleState::Active);
        info!(screen = %core.name(), "activated");
        Ok(())
    }

    /// Deactivate an active screen: children first, then the hook, then
    /// the activation scope. No-op when not active.
    fn deactivate(&self, close: bool) {
        let core = self.core();
        if !core.is_active() {
            return;
        }
        let Ok(_guard) = core.enter() else {
            warn!(screen = %core.name(), "deactivation requested mid-transition; ignored");
            return;
        };

        debug!(screen = %core.name(), close, "deactivating");
        if let Some(children) = self.conducted() {
            children.deactivate_children(close);
        }
        self.on_deactivate(close);
        if let Some(scope) = core.take_activation() {
            scope.close();
        }
        core.set_state(LifecycleState::Deactivated);
        info!(screen = %core.name(), close, "deactivated");
    }

    /// Tear the screen down for good: deactivate (closing), dispose
    /// children, release the initialization scope.
    fn dispose(&self) {
        let core = self.core();
        if core.state() == LifecycleState::Disposed {
            return;
        }
        self.deactivate(true);
        let Ok(_guard) = core.enter() else {
            warn!(screen = %core.name(), "disposal requested mid-transition; ignored");
            return;
        };

        if let Some(children) = self.conducted() {
            children.dispose_children();
        }
        core.init_scope().close();
        core.clear_parent();
        core.set_state(LifecycleState::Disposed);
        debug!(screen = %core.name(), "disposed");
    }

    /// Ask the owning conductor to close this screen. A screen without a
    /// conductor disposes itself.
    fn try_close(&self) -> Result<(), CoreError> {
        let core = self.core();
        match core.parent() {
            Some(parent) => {
                debug!(screen = %core.name(), conductor = %parent.conductor_name(), "close requested");
                parent.close_child(core.id())
            }
            None => {
                self.dispose();
                Ok(())
            }
        }
    }
}

impl<S: Screen + ?Sized> Lifecycle for S {}

fn faulted(core: &ScreenCore) -> CoreError {
    CoreError::Faulted {
        screen: core.name().into(),
    }
}

fn disposed(core: &ScreenCore) -> CoreError {
    CoreError::Disposed {
        screen: core.name().into(),
    }
}

// ── Shared handle ────────────────────────────────────────────────────

/// Shared, type-erased handle to a screen. Equality is screen identity.
#[derive(Clone)]
pub struct ScreenRef {
    screen: Rc<dyn Screen>,
    any: Rc<dyn Any>,
}

impl ScreenRef {
    pub fn new<S: Screen>(screen: S) -> Self {
        Self::from(Rc::new(screen))
    }

    pub fn id(&self) -> ScreenId {
        self.screen.core().id()
    }

    pub fn name(&self) -> &str {
        self.screen.core().name()
    }

    pub fn state(&self) -> LifecycleState {
        self.screen.core().state()
    }

    /// Recover the concrete screen type.
    pub fn downcast<S: Screen>(&self) -> Option<Rc<S>> {
        Rc::clone(&self.any).downcast::<S>().ok()
    }
}

impl<S: Screen> From<Rc<S>> for ScreenRef {
    fn from(screen: Rc<S>) -> Self {
        let any: Rc<dyn Any> = screen.clone();
        Self { screen, any }
    }
}

impl Deref for ScreenRef {
    type Target = dyn Screen;

    fn deref(&self) -> &Self::Target {
        &*self.screen
    }
}

impl PartialEq for ScreenRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ScreenRef {}

impl fmt::Debug for ScreenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenRef")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}
