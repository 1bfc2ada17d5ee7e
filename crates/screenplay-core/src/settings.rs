// ── Runtime settings ──
//
// Tuning knobs for conductors and the dialog host. Built by the binary
// (usually from `screenplay-config`) and handed in; core never reads
// config files.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What happens to the previously active member when a one-active
/// conductor switches to another member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SwitchPolicy {
    /// The previous member stays active in the background until removed.
    #[default]
    KeepPrevious,
    /// The previous member is deactivated (without closing) on switch.
    DeactivatePrevious,
}

/// Runtime configuration for conductors and dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Switching behavior for one-active conductors.
    pub switch_policy: SwitchPolicy,
    /// When set, a dismissed dialog resolves to its last (cancel) option
    /// instead of "dismissed".
    pub dismiss_as_cancel: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            switch_policy: SwitchPolicy::KeepPrevious,
            dismiss_as_cancel: false,
        }
    }
}
