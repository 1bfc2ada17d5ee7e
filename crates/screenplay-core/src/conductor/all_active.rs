use std::rc::{Rc, Weak};

use tracing::debug;

use super::children::ChildList;
use super::{Conducted, ConductorLink, activate_all, deactivate_all, not_a_child};
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, Screen, ScreenCore, ScreenId, ScreenRef};
use crate::reactive::ReactiveValue;

/// Conductor whose members are all active while it is.
pub struct AllActive {
    core: ScreenCore,
    link: Weak<AllActive>,
    items: ChildList<()>,
}

impl AllActive {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|link| Self {
            items: ChildList::new(&name),
            core: ScreenCore::new(name),
            link: link.clone(),
        })
    }

    /// Add `item`, activating it if the conductor is active.
    ///
    /// Returns `Ok(false)` when the item was already a member; that is a
    /// no-op beyond making sure it is active alongside the conductor.
    pub fn add(&self, item: impl Into<ScreenRef>) -> Result<bool, CoreError> {
        let item = item.into();
        if self.items.contains(item.id()) {
            if self.core.is_active() {
                item.activate()?;
            }
            return Ok(false);
        }

        item.initialize()?;
        self.items.insert(item.clone(), ());
        item.core().set_parent(self.link.clone());
        debug!(conductor = %self.core.name(), screen = %item.name(), "item added");

        if self.core.is_active() {
            if let Err(err) = item.activate() {
                self.items.remove(item.id());
                item.core().clear_parent();
                return Err(err);
            }
        }
        Ok(true)
    }

    /// Deactivate and detach `item` without disposing it.
    pub fn remove(&self, item: &ScreenRef) -> Result<(), CoreError> {
        if !self.items.contains(item.id()) {
            return Err(not_a_child(self.core.name(), item));
        }
        item.deactivate(false);
        self.items.remove(item.id());
        item.core().clear_parent();
        debug!(conductor = %self.core.name(), screen = %item.name(), "item removed");
        Ok(())
    }

    /// Deactivate (closing), detach and dispose `item`.
    pub fn close_item(&self, item: &ScreenRef) -> Result<(), CoreError> {
        if !self.items.contains(item.id()) {
            return Err(not_a_child(self.core.name(), item));
        }
        item.deactivate(true);
        self.items.remove(item.id());
        item.dispose();
        Ok(())
    }

    pub fn items(&self) -> Vec<ScreenRef> {
        self.items.screens()
    }

    /// The member list as an observable property.
    pub fn items_value(&self) -> &ReactiveValue<Vec<ScreenRef>> {
        self.items.value()
    }

    pub fn contains(&self, item: &ScreenRef) -> bool {
        self.items.contains(item.id())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Screen for AllActive {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn conducted(&self) -> Option<&dyn Conducted> {
        Some(self)
    }
}

impl Conducted for AllActive {
    fn activate_children(&self) -> Result<(), CoreError> {
        activate_all(self.core.name(), &self.items.screens())
    }

    fn deactivate_children(&self, close: bool) {
        deactivate_all(&self.items.screens(), close);
    }

    fn dispose_children(&self) {
        for item in self.items.drain() {
            item.dispose();
        }
    }
}

impl ConductorLink for AllActive {
    fn conductor_name(&self) -> &str {
        self.core.name()
    }

    fn close_child(&self, id: ScreenId) -> Result<(), CoreError> {
        let item = self.items.get(id).ok_or_else(|| CoreError::NotAChild {
            conductor: self.core.name().into(),
            screen: id.to_string(),
        })?;
        self.close_item(&item)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conductor::testing::{Leaf, journal};
    use crate::lifecycle::LifecycleState;
    use pretty_assertions::assert_eq;

    #[test]
    fn members_follow_conductor() {
        let j = journal();
        let all = AllActive::new("all");
        let a = Leaf::shared("a", &j);
        let b = Leaf::shared("b", &j);
        all.add(a.clone()).unwrap();
        all.add(b.clone()).unwrap();

        all.activate().unwrap();
        assert!(a.core().is_active() && b.core().is_active());

        all.deactivate(false);
        assert_eq!(
            *j.borrow(),
            vec!["a init", "b init", "a activate", "b activate", "b deactivate", "a deactivate"]
        );
    }

    #[test]
    fn adding_to_active_conductor_activates_and_readd_is_noop() {
        let j = journal();
        let all = AllActive::new("all");
        all.activate().unwrap();
        let a = Leaf::shared("a", &j);

        assert!(all.add(a.clone()).unwrap());
        assert!(!all.add(a.clone()).unwrap());
        assert_eq!(all.len(), 1);
        assert_eq!(a.core().activations(), 1);
    }

    #[test]
    fn failed_child_activation_rolls_back_siblings() {
        let j = journal();
        let all = AllActive::new("all");
        let a = Leaf::shared("a", &j);
        let bad = Rc::new(Leaf::new("bad", &j));
        bad.fail_activate.set(true);
        all.add(a.clone()).unwrap();
        all.add(bad.clone()).unwrap();

        assert!(all.activate().is_err());
        assert_eq!(all.core().state(), LifecycleState::Initialized);
        assert_eq!(a.state(), LifecycleState::Deactivated);
    }

    #[test]
    fn failed_initialize_is_never_seated() {
        let j = journal();
        let all = AllActive::new("all");
        let bad = ScreenRef::new(Leaf::new("bad", &j).failing_init());

        assert!(all.add(bad.clone()).is_err());
        assert!(all.is_empty());
        assert!(bad.core().parent().is_none());
    }

    #[test]
    fn remove_deactivates_without_disposing() {
        let j = journal();
        let all = AllActive::new("all");
        all.activate().unwrap();
        let a = Leaf::shared("a", &j);
        all.add(a.clone()).unwrap();

        all.remove(&a).unwrap();
        assert_eq!(a.state(), LifecycleState::Deactivated);
        assert!(all.remove(&a).is_err());

        all.add(a.clone()).unwrap();
        all.close_item(&a).unwrap();
        assert_eq!(a.state(), LifecycleState::Disposed);
        assert_eq!(all.items_value().get(), Vec::new());
    }
}
