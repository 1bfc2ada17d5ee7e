// ── Core error types ──
//
// Lifecycle and composition failures raised by the runtime. Refused command
// invocations are NOT errors: they surface as `Outcome::Refused`. Reuse of a
// closed scope is logged, never returned.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("screen '{screen}' failed to initialize: {source}")]
    InitializationFailed {
        screen: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("screen '{screen}' failed to activate: {source}")]
    ActivationFailed {
        screen: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("screen '{screen}' is faulted after a failed initialization")]
    Faulted { screen: String },

    #[error("screen '{screen}' has been disposed")]
    Disposed { screen: String },

    #[error("screen '{screen}' is already in the middle of a lifecycle transition")]
    TransitionInProgress { screen: String },

    // ── Conductor errors ─────────────────────────────────────────────
    #[error("conductor '{conductor}' has no constructor for kind '{kind}'")]
    UnknownKind { conductor: String, kind: String },

    #[error("screen '{screen}' is not a child of conductor '{conductor}'")]
    NotAChild { conductor: String, screen: String },

    // ── Scope errors ─────────────────────────────────────────────────
    #[error("release action in scope '{scope}' failed: {reason}")]
    ReleaseFailed { scope: String, reason: String },

    // ── Dialog errors ────────────────────────────────────────────────
    #[error("dialog choice {index} is out of range for {available} options")]
    InvalidChoice { index: usize, available: usize },

    // ── User code errors ─────────────────────────────────────────────
    #[error("{message}")]
    OperationFailed { message: String },
}

impl CoreError {
    /// Build an [`OperationFailed`](Self::OperationFailed) error from any message.
    ///
    /// Intended for screen hooks and command effects.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }

    pub(crate) fn initialization(screen: &str, source: Self) -> Self {
        Self::InitializationFailed {
            screen: screen.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn activation(screen: &str, source: Self) -> Self {
        Self::ActivationFailed {
            screen: screen.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error leaves the failing screen permanently unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InitializationFailed { .. } | Self::Faulted { .. } | Self::Disposed { .. }
        )
    }
}
