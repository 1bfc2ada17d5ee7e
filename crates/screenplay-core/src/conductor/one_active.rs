// ── One-active conductor ──
//
// An ordered set of members with one distinguished active member. Members
// are looked up by kind: an existing member of the requested kind is
// reactivated in place, otherwise the injected factory builds exactly one
// new instance.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use super::children::ChildList;
use super::factory::{ScreenFactory, ScreenKind};
use super::{Conducted, ConductorLink, activate_all, deactivate_all, not_a_child};
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, Screen, ScreenCore, ScreenId, ScreenRef};
use crate::reactive::ReactiveValue;
use crate::settings::{RuntimeSettings, SwitchPolicy};

/// Conductor with an ordered member set and one active member (or none).
///
/// Under [`SwitchPolicy::KeepPrevious`] switching never deactivates the
/// previous member; only removal or closing does. Under
/// [`SwitchPolicy::DeactivatePrevious`] the previous member is deactivated
/// (without closing) once the new one is active.
pub struct OneActive<K: ScreenKind> {
    core: ScreenCore,
    link: Weak<OneActive<K>>,
    items: ChildList<K>,
    active: ReactiveValue<Option<ScreenRef>>,
    factory: Box<dyn ScreenFactory<K>>,
    policy: Cell<SwitchPolicy>,
}

impl<K: ScreenKind> OneActive<K> {
    pub fn new(name: impl Into<String>, factory: impl ScreenFactory<K> + 'static) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|link| Self {
            items: ChildList::new(&name),
            active: ReactiveValue::new(format!("{name}.active_item"), None),
            core: ScreenCore::new(name),
            link: link.clone(),
            factory: Box::new(factory),
            policy: Cell::new(SwitchPolicy::default()),
        })
    }

    pub fn with_settings(
        name: impl Into<String>,
        factory: impl ScreenFactory<K> + 'static,
        settings: &RuntimeSettings,
    ) -> Rc<Self> {
        let conductor = Self::new(name, factory);
        conductor.set_switch_policy(settings.switch_policy);
        conductor
    }

    pub fn switch_policy(&self) -> SwitchPolicy {
        self.policy.get()
    }

    pub fn set_switch_policy(&self, policy: SwitchPolicy) {
        self.policy.set(policy);
    }

    pub fn active_item(&self) -> Option<ScreenRef> {
        self.active.get()
    }

    /// The active member as an observable property, for view resolvers.
    pub fn active_item_value(&self) -> &ReactiveValue<Option<ScreenRef>> {
        &self.active
    }

    pub fn items(&self) -> Vec<ScreenRef> {
        self.items.screens()
    }

    pub fn items_value(&self) -> &ReactiveValue<Vec<ScreenRef>> {
        self.items.value()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, item: &ScreenRef) -> bool {
        self.items.contains(item.id())
    }

    pub fn kind_of(&self, item: &ScreenRef) -> Option<K> {
        self.items.kind_of(item.id())
    }

    /// First member whose kind matches `kind`.
    pub fn find(&self, kind: K) -> Option<ScreenRef> {
        self.items.find(|member| member.matches(kind))
    }

    /// Make a member of `kind` the active one, constructing it if no member
    /// matches. Returns the member that is now active.
    pub fn activate_kind(&self, kind: K) -> Result<ScreenRef, CoreError> {
        if let Some(existing) = self.find(kind) {
            debug!(conductor = %self.core.name(), ?kind, screen = %existing.name(), "reusing member");
            self.switch_to(&existing)?;
            return Ok(existing);
        }

        let item = self.factory.create(kind)?;
        debug!(conductor = %self.core.name(), ?kind, screen = %item.name(), "constructed member");
        self.activate_item(kind, item.clone())?;
        Ok(item)
    }

    /// Add `item` (if new) under `kind` and make it the active member.
    ///
    /// A new item that fails to initialize or activate is not kept.
    pub fn activate_item(&self, kind: K, item: impl Into<ScreenRef>) -> Result<(), CoreError> {
        let item = item.into();
        if self.items.contains(item.id()) {
            return self.switch_to(&item);
        }

        item.initialize()?;
        self.items.insert(item.clone(), kind);
        item.core().set_parent(self.link.clone());

        if let Err(err) = self.switch_to(&item) {
            self.items.remove(item.id());
            item.core().clear_parent();
            return Err(err);
        }
        Ok(())
    }

    /// Deactivate a member. With `close` set the member is also removed and
    /// disposed; otherwise it stays in the set (and stays the active member
    /// if it was).
    pub fn deactivate_item(&self, item: &ScreenRef, close: bool) -> Result<(), CoreError> {
        if close {
            return self.close_item(item);
        }
        if !self.items.contains(item.id()) {
            return Err(not_a_child(self.core.name(), item));
        }
        item.deactivate(false);
        Ok(())
    }

    /// Deactivate and detach `item` without disposing it. Removing the
    /// active member leaves the conductor without one.
    pub fn remove(&self, item: &ScreenRef) -> Result<(), CoreError> {
        if !self.items.contains(item.id()) {
            return Err(not_a_child(self.core.name(), item));
        }
        item.deactivate(false);
        self.items.remove(item.id());
        item.core().clear_parent();
        if self.is_active_item(item) {
            self.active.set(None);
        }
        Ok(())
    }

    /// Deactivate (closing), remove and dispose `item`. Closing the active
    /// member activates its neighbour: the previous member if there is
    /// one, else the next.
    pub fn close_item(&self, item: &ScreenRef) -> Result<(), CoreError> {
        let index = self
            .items
            .index_of(item.id())
            .ok_or_else(|| not_a_child(self.core.name(), item))?;
        let was_active = self.is_active_item(item);

        item.deactivate(true);
        self.items.remove(item.id());
        item.dispose();
        info!(conductor = %self.core.name(), screen = %item.name(), "member closed");

        if was_active {
            self.active.set(None);
            let neighbour = self.items.get_index(index.saturating_sub(1));
            if let Some(next) = neighbour {
                self.switch_to(&next)?;
            }
        }
        Ok(())
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn is_active_item(&self, item: &ScreenRef) -> bool {
        self.active.with(|active| active.as_ref() == Some(item))
    }

    /// Make an existing member the active one.
    fn switch_to(&self, item: &ScreenRef) -> Result<(), CoreError> {
        if self.core.is_active() {
            item.activate()?;
        }
        let previous = self.active.get();
        if previous.as_ref() == Some(item) {
            return Ok(());
        }
        self.active.set(Some(item.clone()));
        debug!(conductor = %self.core.name(), screen = %item.name(), "switched active member");

        if let Some(previous) = previous {
            if self.policy.get() == SwitchPolicy::DeactivatePrevious {
                previous.deactivate(false);
            }
        }
        Ok(())
    }

    /// Members that should be live while the conductor is active.
    fn live_members(&self) -> Vec<ScreenRef> {
        match self.policy.get() {
            SwitchPolicy::KeepPrevious => self.items.screens(),
            SwitchPolicy::DeactivatePrevious => self.active.get().into_iter().collect(),
        }
    }
}

impl<K: ScreenKind> Screen for OneActive<K> {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn conducted(&self) -> Option<&dyn Conducted> {
        Some(self)
    }
}

impl<K: ScreenKind> Conducted for OneActive<K> {
    fn activate_children(&self) -> Result<(), CoreError> {
        activate_all(self.core.name(), &self.live_members())
    }

    fn deactivate_children(&self, close: bool) {
        deactivate_all(&self.items.screens(), close);
    }

    fn dispose_children(&self) {
        self.active.set(None);
        for item in self.items.drain() {
            item.dispose();
        }
    }
}

impl<K: ScreenKind> ConductorLink for OneActive<K> {
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
    use std::cell::Cell;

    use super::*;
    use crate::conductor::testing::{Journal, Leaf, journal};
    use crate::lifecycle::LifecycleState;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Page {
        Home,
        Settings,
        About,
    }

    impl ScreenKind for Page {}

    fn shell(j: &Journal, built: &Rc<Cell<u32>>) -> Rc<OneActive<Page>> {
        let j = Rc::clone(j);
        let built = Rc::clone(built);
        OneActive::new("shell", move |kind: Page| -> Result<ScreenRef, CoreError> {
            built.set(built.get() + 1);
            let name = match kind {
                Page::Home => "home",
                Page::Settings => "settings",
                Page::About => "about",
            };
            Ok(Leaf::shared(name, &j))
        })
    }

    #[test]
    fn existing_kind_is_reactivated_in_place() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.activate().unwrap();

        let home = nav.activate_kind(Page::Home).unwrap();
        let settings = nav.activate_kind(Page::Settings).unwrap();
        let again = nav.activate_kind(Page::Home).unwrap();

        assert_eq!(again, home);
        assert_eq!(built.get(), 2);
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.active_item(), Some(home));
        assert_eq!(nav.kind_of(&settings), Some(Page::Settings));
    }

    #[test]
    fn keep_previous_leaves_old_member_active() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.activate().unwrap();

        let home = nav.activate_kind(Page::Home).unwrap();
        nav.activate_kind(Page::About).unwrap();

        assert_eq!(home.state(), LifecycleState::Active);
    }

    #[test]
    fn deactivate_previous_policy_hides_old_member() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.set_switch_policy(SwitchPolicy::DeactivatePrevious);
        nav.activate().unwrap();

        let home = nav.activate_kind(Page::Home).unwrap();
        let about = nav.activate_kind(Page::About).unwrap();
        assert_eq!(home.state(), LifecycleState::Deactivated);
        assert_eq!(about.state(), LifecycleState::Active);

        nav.deactivate(false);
        nav.activate().unwrap();
        assert_eq!(home.state(), LifecycleState::Deactivated);
        assert_eq!(about.state(), LifecycleState::Active);
    }

    #[test]
    fn closing_active_member_selects_neighbour() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.activate().unwrap();
        let home = nav.activate_kind(Page::Home).unwrap();
        let settings = nav.activate_kind(Page::Settings).unwrap();
        let about = nav.activate_kind(Page::About).unwrap();

        nav.activate_item(Page::Settings, settings.clone()).unwrap();
        settings.try_close().unwrap();
        assert_eq!(nav.active_item(), Some(home.clone()));
        assert_eq!(settings.state(), LifecycleState::Disposed);

        nav.close_item(&home).unwrap();
        assert_eq!(nav.active_item(), Some(about.clone()));
        nav.close_item(&about).unwrap();
        assert_eq!(nav.active_item(), None);
        assert!(nav.is_empty());
    }

    #[test]
    fn remove_keeps_member_alive() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.activate().unwrap();
        let home = nav.activate_kind(Page::Home).unwrap();

        nav.remove(&home).unwrap();
        assert_eq!(nav.active_item(), None);
        assert_eq!(home.state(), LifecycleState::Deactivated);
        assert!(home.core().parent().is_none());

        // Absent again, so a fresh instance is built.
        let rebuilt = nav.activate_kind(Page::Home).unwrap();
        assert_ne!(rebuilt, home);
        assert_eq!(built.get(), 2);
    }

    #[test]
    fn item_failing_to_initialize_is_never_seated() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.activate().unwrap();
        let home = nav.activate_kind(Page::Home).unwrap();

        let bad = ScreenRef::new(Leaf::new("bad", &j).failing_init());
        let err = nav.activate_item(Page::About, bad.clone()).unwrap_err();

        assert!(matches!(err, CoreError::InitializationFailed { .. }));
        assert!(!nav.items().contains(&bad));
        assert!(bad.core().parent().is_none());
        assert_eq!(nav.active_item(), Some(home));
    }

    #[test]
    fn constructed_member_failing_to_initialize_is_dropped() {
        let j = journal();
        let factory_journal = Rc::clone(&j);
        let nav = OneActive::new("shell", move |kind: Page| -> Result<ScreenRef, CoreError> {
            Ok(match kind {
                Page::About => ScreenRef::new(Leaf::new("about", &factory_journal).failing_init()),
                _ => Leaf::shared("home", &factory_journal),
            })
        });
        nav.activate().unwrap();
        let home = nav.activate_kind(Page::Home).unwrap();

        assert!(nav.activate_kind(Page::About).is_err());
        assert!(nav.find(Page::About).is_none());
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.active_item(), Some(home));
    }

    #[test]
    fn item_failing_to_activate_is_rolled_back() {
        let (j, built) = (journal(), Rc::new(Cell::new(0)));
        let nav = shell(&j, &built);
        nav.activate().unwrap();
        let home = nav.activate_kind(Page::Home).unwrap();

        let bad = Rc::new(Leaf::new("bad", &j));
        bad.fail_activate.set(true);
        let err = nav.activate_item(Page::About, Rc::clone(&bad)).unwrap_err();
        let bad = ScreenRef::from(bad);

        assert!(matches!(err, CoreError::ActivationFailed { .. }));
        assert!(!nav.contains(&bad));
        assert!(bad.core().parent().is_none());
        assert_eq!(nav.active_item(), Some(home.clone()));
        assert_eq!(home.state(), LifecycleState::Active);
    }

    #[test]
    fn factory_failure_surfaces_to_caller() {
        let nav = OneActive::new("shell", |kind: Page| -> Result<ScreenRef, CoreError> {
            Err(CoreError::UnknownKind {
                conductor: "shell".into(),
                kind: format!("{kind:?}"),
            })
        });
        let err = nav.activate_kind(Page::About).unwrap_err();
        assert!(matches!(err, CoreError::UnknownKind { .. }));
        assert!(nav.is_empty());
    }
}
