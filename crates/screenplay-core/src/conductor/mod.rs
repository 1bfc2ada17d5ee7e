// ── Conductors ──
//
// Screens that own child screens and forward lifecycle to them:
//
// - `Single`: exactly one active child, replaced on activation.
// - `AllActive`: ordered set, every member active with the conductor.
// - `OneActive`: ordered set with one distinguished active member, looked
//   up or constructed by kind.
//
// Children hold only a weak `ConductorLink` back to their conductor; the
// conductor's item list is the owning edge.

mod all_active;
mod children;
mod factory;
mod one_active;
mod single;

use tracing::debug;

pub use all_active::AllActive;
pub use factory::{KindRegistry, ScreenFactory, ScreenKind};
pub use one_active::OneActive;
pub use single::Single;

use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, ScreenId, ScreenRef};

/// Lifecycle forwarding from a conductor to its children.
pub trait Conducted {
    /// Activate the children that should be live while the conductor is.
    /// On failure, children activated by this call are deactivated again.
    fn activate_children(&self) -> Result<(), CoreError>;

    fn deactivate_children(&self, close: bool);

    /// Dispose and drop every child.
    fn dispose_children(&self);
}

/// Child-to-conductor back edge.
pub trait ConductorLink {
    fn conductor_name(&self) -> &str;

    /// Deactivate, remove and dispose the child with `id`.
    fn close_child(&self, id: ScreenId) -> Result<(), CoreError>;
}

/// Activate `items` in order, rolling back the ones this call activated if
/// any of them fails.
pub(crate) fn activate_all(owner: &str, items: &[ScreenRef]) -> Result<(), CoreError> {
    let mut activated: Vec<&ScreenRef> = Vec::new();
    for item in items {
        let was_active = item.core().is_active();
        if let Err(err) = item.activate() {
            debug!(conductor = %owner, rolled_back = activated.len(), "child activation failed");
            for done in activated.iter().rev() {
                done.deactivate(false);
            }
            return Err(err);
        }
        if !was_active {
            activated.push(item);
        }
    }
    Ok(())
}

/// Deactivate `items` last to first.
pub(crate) fn deactivate_all(items: &[ScreenRef], close: bool) {
    for item in items.iter().rev() {
        item.deactivate(close);
    }
}

pub(crate) fn not_a_child(conductor: &str, screen: &ScreenRef) -> CoreError {
    CoreError::NotAChild {
        conductor: conductor.into(),
        screen: screen.name().into(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Screens for conductor tests.

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::error::CoreError;
    use crate::lifecycle::{Screen, ScreenCore, ScreenRef};
    use crate::scope::Scope;

    pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

    pub(crate) struct Leaf {
        core: ScreenCore,
        journal: Journal,
        fail_init: bool,
        pub(crate) fail_activate: Cell<bool>,
    }

    impl Leaf {
        pub(crate) fn new(name: &str, journal: &Journal) -> Self {
            Self {
                core: ScreenCore::new(name),
                journal: Rc::clone(journal),
                fail_init: false,
                fail_activate: Cell::new(false),
            }
        }

        pub(crate) fn shared(name: &str, journal: &Journal) -> ScreenRef {
            ScreenRef::new(Self::new(name, journal))
        }

        pub(crate) fn failing_init(mut self) -> Self {
            self.fail_init = true;
            self
        }

        fn note(&self, what: &str) {
            self.journal
                .borrow_mut()
                .push(format!("{} {what}", self.core.name()));
        }
    }

    impl Screen for Leaf {
        fn core(&self) -> &ScreenCore {
            &self.core
        }

        fn on_initialize(&self, _scope: &Scope) -> Result<(), CoreError> {
            self.note("init");
            if self.fail_init {
                return Err(CoreError::failed("init refused"));
            }
            Ok(())
        }

        fn on_activate(&self, _scope: &Scope) -> Result<(), CoreError> {
            if self.fail_activate.get() {
                return Err(CoreError::failed("activate refused"));
            }
            self.note("activate");
            Ok(())
        }

        fn on_deactivate(&self, close: bool) {
            self.note(if close { "close" } else { "deactivate" });
        }
    }

    pub(crate) fn journal() -> Journal {
        Rc::new(RefCell::new(Vec::new()))
    }
}
