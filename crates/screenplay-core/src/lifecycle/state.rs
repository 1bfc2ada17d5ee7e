use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use strum::Display;

/// Where a screen is in its lifecycle.
///
/// ```text
/// Created --initialize--> Initialized --activate--> Active
/// Active --deactivate--> Deactivated --activate--> Active
/// Created --failed initialize--> Faulted
/// any --dispose--> Disposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleState {
    Created,
    Initialized,
    Active,
    Deactivated,
    /// Initialization failed. Terminal; the screen is never retried.
    Faulted,
    Disposed,
}

impl LifecycleState {
    /// Whether initialization has completed and the screen is still usable.
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Initialized | Self::Active | Self::Deactivated)
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// `Faulted` and `Disposed` admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Faulted | Self::Disposed)
    }
}

static NEXT_SCREEN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a screen instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(u64);

impl ScreenId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SCREEN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
