// ── Kind-to-screen construction ──

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::lifecycle::ScreenRef;

/// Tag identifying what a one-active conductor's member is.
///
/// Normally a fieldless enum matched exhaustively by the application's
/// factory.
pub trait ScreenKind: Copy + Eq + fmt::Debug + 'static {
    /// Whether an existing member of kind `self` satisfies a request for
    /// `requested`.
    fn matches(self, requested: Self) -> bool {
        self == requested
    }
}

/// Constructs a new screen for a kind. Injected into
/// [`OneActive`](super::OneActive); nothing is looked up globally.
pub trait ScreenFactory<K> {
    fn create(&self, kind: K) -> Result<ScreenRef, CoreError>;
}

impl<K, F> ScreenFactory<K> for F
where
    F: Fn(K) -> Result<ScreenRef, CoreError>,
{
    fn create(&self, kind: K) -> Result<ScreenRef, CoreError> {
        self(kind)
    }
}

type Constructor = Box<dyn Fn() -> Result<ScreenRef, CoreError>>;

/// A map-based factory for kind sets that are only partially constructible.
/// Requesting an unregistered kind fails with
/// [`CoreError::UnknownKind`].
pub struct KindRegistry<K> {
    owner: String,
    constructors: IndexMap<K, Constructor>,
}

impl<K: ScreenKind + Hash> KindRegistry<K> {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            constructors: IndexMap::new(),
        }
    }

    /// Register (or replace) the constructor for `kind`.
    #[must_use]
    pub fn with(
        mut self,
        kind: K,
        constructor: impl Fn() -> Result<ScreenRef, CoreError> + 'static,
    ) -> Self {
        self.register(kind, constructor);
        self
    }

    pub fn register(
        &mut self,
        kind: K,
        constructor: impl Fn() -> Result<ScreenRef, CoreError> + 'static,
    ) {
        self.constructors.insert(kind, Box::new(constructor));
    }

    pub fn kinds(&self) -> impl Iterator<Item = K> + '_ {
        self.constructors.keys().copied()
    }
}

impl<K: ScreenKind + Hash> ScreenFactory<K> for KindRegistry<K> {
    fn create(&self, kind: K) -> Result<ScreenRef, CoreError> {
        let constructor = self
            .constructors
            .get(&kind)
            .ok_or_else(|| CoreError::UnknownKind {
                conductor: self.owner.clone(),
                kind: format!("{kind:?}"),
            })?;
        constructor()
    }
}

impl<K: fmt::Debug> fmt::Debug for KindRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRegistry")
            .field("owner", &self.owner)
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
