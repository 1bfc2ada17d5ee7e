use std::rc::{Rc, Weak};

use tracing::debug;

use super::{Conducted, ConductorLink};
use crate::error::CoreError;
use crate::lifecycle::{Lifecycle, Screen, ScreenCore, ScreenId, ScreenRef};
use crate::reactive::ReactiveValue;

/// Conductor with exactly one child at a time.
///
/// Activating a new item initializes it, closes and detaches the previous
/// item, then activates the new one if the conductor is active.
pub struct Single {
    core: ScreenCore,
    link: Weak<Single>,
    active: ReactiveValue<Option<ScreenRef>>,
}

impl Single {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|link| Self {
            active: ReactiveValue::new(format!("{name}.active_item"), None),
            core: ScreenCore::new(name),
            link: link.clone(),
        })
    }

    pub fn active_item(&self) -> Option<ScreenRef> {
        self.active.get()
    }

    /// The current child as an observable property, for view resolvers.
    pub fn active_item_value(&self) -> &ReactiveValue<Option<ScreenRef>> {
        &self.active
    }

    /// Seat `item` as the only child.
    ///
    /// An item that fails to initialize is never seated and the previous
    /// item is kept. An item that fails to activate is unseated again and
    /// the error is returned.
    pub fn activate_item(&self, item: impl Into<ScreenRef>) -> Result<(), CoreError> {
        let item = item.into();
        if self.active.with(|current| current.as_ref() == Some(&item)) {
            if self.core.is_active() {
                item.activate()?;
            }
            return Ok(());
        }

        item.initialize()?;

        if let Some(previous) = self.active.get() {
            debug!(conductor = %self.core.name(), screen = %previous.name(), "replacing active item");
            previous.deactivate(true);
            previous.core().clear_parent();
        }

        item.core().set_parent(self.link.clone());
        self.active.set(Some(item.clone()));

        if self.core.is_active() {
            if let Err(err) = item.activate() {
                item.core().clear_parent();
                self.active.set(None);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Close the current child: deactivate, detach and dispose it.
    pub fn close_item(&self) {
        if let Some(item) = self.active.get() {
            item.deactivate(true);
            item.core().clear_parent();
            self.active.set(None);
            item.dispose();
        }
    }
}

impl Screen for Single {
    fn core(&self) -> &ScreenCore {
        &self.core
    }

    fn conducted(&self) -> Option<&dyn Conducted> {
        Some(self)
    }
}

impl Conducted for Single {
    fn activate_children(&self) -> Result<(), CoreError> {
        match self.active.get() {
            Some(item) => item.activate(),
            None => Ok(()),
        }
    }

    fn deactivate_children(&self, close: bool) {
        if let Some(item) = self.active.get() {
            item.deactivate(close);
        }
    }

    fn dispose_children(&self) {
        if let Some(item) = self.active.get() {
            self.active.set(None);
            item.dispose();
        }
    }
}

impl ConductorLink for Single {
    fn conductor_name(&self) -> &str {
        self.core.name()
    }

    fn close_child(&self, id: ScreenId) -> Result<(), CoreError> {
        match self.active.get() {
            Some(item) if item.id() == id => {
                self.close_item();
                Ok(())
            }
            _ => Err(CoreError::NotAChild {
                conductor: self.core.name().into(),
                screen: id.to_string(),
            }),
        }
    }
}
