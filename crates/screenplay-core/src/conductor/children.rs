// ── Ordered child collection ──
//
// Insertion-ordered, duplicate-free storage keyed by screen identity, with
// a snapshot of the item list exposed as a reactive value. Every mutation
// rebuilds the snapshot.

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::lifecycle::{ScreenId, ScreenRef};
use crate::reactive::ReactiveValue;

struct Entry<K> {
    screen: ScreenRef,
    kind: K,
}

pub(crate) struct ChildList<K> {
    entries: RefCell<IndexMap<ScreenId, Entry<K>>>,
    snapshot: ReactiveValue<Vec<ScreenRef>>,
}

impl<K: Copy + 'static> ChildList<K> {
    pub(crate) fn new(owner: &str) -> Self {
        Self {
            entries: RefCell::new(IndexMap::new()),
            snapshot: ReactiveValue::new(format!("{owner}.items"), Vec::new()),
        }
    }

    /// Append `screen`. Returns `false` if it is already present.
    pub(crate) fn insert(&self, screen: ScreenRef, kind: K) -> bool {
        {
            let mut entries = self.entries.borrow_mut();
            if entries.contains_key(&screen.id()) {
                return false;
            }
            entries.insert(screen.id(), Entry { screen, kind });
        }
        self.rebuild_snapshot();
        true
    }

    /// Remove by identity, preserving the order of the rest.
    pub(crate) fn remove(&self, id: ScreenId) -> Option<ScreenRef> {
        let removed = self.entries.borrow_mut().shift_remove(&id);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed.map(|entry| entry.screen)
    }

    /// Remove everything, returning the former members in order.
    pub(crate) fn drain(&self) -> Vec<ScreenRef> {
        let drained: Vec<ScreenRef> = self
            .entries
            .borrow_mut()
            .drain(..)
            .map(|(_, entry)| entry.screen)
            .collect();
        if !drained.is_empty() {
            self.rebuild_snapshot();
        }
        drained
    }

    pub(crate) fn contains(&self, id: ScreenId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub(crate) fn get(&self, id: ScreenId) -> Option<ScreenRef> {
        self.entries.borrow().get(&id).map(|e| e.screen.clone())
    }

    pub(crate) fn index_of(&self, id: ScreenId) -> Option<usize> {
        self.entries.borrow().get_index_of(&id)
    }

    pub(crate) fn get_index(&self, index: usize) -> Option<ScreenRef> {
        self.entries
            .borrow()
            .get_index(index)
            .map(|(_, e)| e.screen.clone())
    }

    pub(crate) fn kind_of(&self, id: ScreenId) -> Option<K> {
        self.entries.borrow().get(&id).map(|e| e.kind)
    }

    /// First member whose kind satisfies `pred`.
    pub(crate) fn find(&self, pred: impl Fn(K) -> bool) -> Option<ScreenRef> {
        self.entries
            .borrow()
            .values()
            .find(|e| pred(e.kind))
            .map(|e| e.screen.clone())
    }

    pub(crate) fn screens(&self) -> Vec<ScreenRef> {
        self.snapshot.get()
    }

    pub(crate) fn value(&self) -> &ReactiveValue<Vec<ScreenRef>> {
        &self.snapshot
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let screens: Vec<ScreenRef> = self
            .entries
            .borrow()
            .values()
            .map(|e| e.screen.clone())
            .collect();
        // Observers may call back into the list; no borrow is held here.
        self.snapshot.set(screens);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conductor::testing::{journal, Leaf};
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_is_duplicate_free_and_ordered() {
        let j = journal();
        let list: ChildList<u8> = ChildList::new("test");
        let a = Leaf::shared("a", &j);
        let b = Leaf::shared("b", &j);

        assert!(list.insert(a.clone(), 1));
        assert!(list.insert(b.clone(), 2));
        assert!(!list.insert(a.clone(), 3));

        assert_eq!(list.screens(), vec![a.clone(), b.clone()]);
        assert_eq!(list.kind_of(a.id()), Some(1));
        assert_eq!(list.find(|k| k == 2), Some(b));
    }

    #[test]
    fn remove_rebuilds_snapshot() {
        let j = journal();
        let list: ChildList<()> = ChildList::new("test");
        let a = Leaf::shared("a", &j);
        let b = Leaf::shared("b", &j);
        list.insert(a.clone(), ());
        list.insert(b.clone(), ());
        let before = list.value().version();

        assert_eq!(list.remove(a.id()), Some(a.clone()));
        assert_eq!(list.remove(a.id()), None);
        assert_eq!(list.screens(), vec![b.clone()]);
        assert_eq!(list.index_of(b.id()), Some(0));
        assert_eq!(list.value().version(), before + 1);
    }
}
