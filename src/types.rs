use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

/// Hardware-confirmed enablement state of the radio interface.
///
/// Encoded with the platform's integer codes. Codes the platform may add
/// later decode to `Unknown`.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Eq, Hash, PartialEq, Serialize_repr)]
#[repr(u8)]
pub enum EnablementState {
    Disabling = 0,
    Disabled = 1,
    Enabling = 2,
    Enabled = 3,
    #[default]
    #[serde(other)]
    Unknown = 4,
}

impl EnablementState {
    /// Whether the control may be interacted with, i.e. the interface is not
    /// in the middle of a transition.
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Enabled | Self::Disabled | Self::Unknown)
    }
}

impl fmt::Display for EnablementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabling => write!(f, "Disabling"),
            Self::Disabled => write!(f, "Disabled"),
            Self::Enabling => write!(f, "Enabling"),
            Self::Enabled => write!(f, "Enabled"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Detailed network association state, only meaningful while enabled.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    Scanning,
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    #[serde(other)]
    Other,
}

/// Notification delivered through an interface subscription.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusEvent {
    EnablementChanged {
        current: EnablementState,
        previous: EnablementState,
    },
    ConnectivityChanged(ConnectivityState),
}

/// What the user sees of the control.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub checked: bool,
    pub enabled: bool,
    pub status_text: Option<String>,
}
