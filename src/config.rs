use crate::types::ConnectivityState;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_valid::Validate;
use std::{env, path::PathBuf, time::Duration};

/// Enabler configuration loaded and validated at startup
#[derive(Clone, Debug, Validate)]
pub struct EnablerConfig {
    /// Status bar indicator hidden when the user turns the radio off
    #[validate(min_length = 1)]
    pub indicator_id: String,

    /// Properties written, in order, the first time the user enables the radio
    #[validate]
    pub first_enable_properties: Vec<PropertyWrite>,

    /// User-visible status texts
    pub messages: StatusMessages,
}

#[derive(Clone, Debug, Eq, PartialEq, Validate)]
pub struct PropertyWrite {
    #[validate(min_length = 1)]
    pub key: String,
    pub value: String,
}

/// Status texts shown as the control's summary.
///
/// Missing fields of a messages file keep their default.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct StatusMessages {
    pub starting: String,
    pub stopping: String,
    pub failed_to_start: String,
    pub failed_to_stop: String,
    pub generic_error: String,
    pub scanning: String,
    pub connecting: String,
    pub connected: String,
    pub disconnecting: String,
    pub disconnected: String,
}

#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    pub transition_delay: Duration,
    /// Indicator shown once the simulated radio is connected
    pub indicator_id: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            transition_delay: Duration::from_millis(500),
            indicator_id: EnablerConfig::DEFAULT_INDICATOR_ID.to_string(),
        }
    }
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            starting: "starting".to_string(),
            stopping: "stopping".to_string(),
            failed_to_start: "failed to start".to_string(),
            failed_to_stop: "failed to stop".to_string(),
            generic_error: "error".to_string(),
            scanning: "scanning".to_string(),
            connecting: "connecting".to_string(),
            connected: "connected".to_string(),
            disconnecting: "disconnecting".to_string(),
            disconnected: "disconnected".to_string(),
        }
    }
}

impl StatusMessages {
    /// Caption for a connectivity state, `None` for states without one
    pub fn caption(&self, state: ConnectivityState) -> Option<&str> {
        match state {
            ConnectivityState::Scanning => Some(&self.scanning),
            ConnectivityState::Connecting => Some(&self.connecting),
            ConnectivityState::Connected => Some(&self.connected),
            ConnectivityState::Disconnecting => Some(&self.disconnecting),
            ConnectivityState::Disconnected => Some(&self.disconnected),
            ConnectivityState::Other => None,
        }
    }

    /// Error text for a failed command in the given direction
    pub fn command_failed(&self, enable: bool) -> &str {
        if enable {
            &self.failed_to_start
        } else {
            &self.failed_to_stop
        }
    }
}

impl Default for EnablerConfig {
    fn default() -> Self {
        Self {
            indicator_id: EnablerConfig::DEFAULT_INDICATOR_ID.to_string(),
            first_enable_properties: vec![
                PropertyWrite {
                    key: "wimax.dualmode.1xrtt".to_string(),
                    value: "0".to_string(),
                },
                PropertyWrite {
                    key: "wimax.wifi.disable".to_string(),
                    value: "1".to_string(),
                },
            ],
            messages: StatusMessages::default(),
        }
    }
}

impl EnablerConfig {
    pub const DEFAULT_INDICATOR_ID: &str = "wimax";

    /// Load and validate the configuration from environment variables
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let indicator_id = env::var("RADIO_INDICATOR_ID").unwrap_or(defaults.indicator_id);

        let first_enable_properties = match env::var("RADIO_FIRST_ENABLE_PROPERTIES") {
            Ok(properties) => Self::parse_properties(&properties)
                .context("failed to parse RADIO_FIRST_ENABLE_PROPERTIES")?,
            Err(_) => defaults.first_enable_properties,
        };

        let messages = match env::var("RADIO_STATUS_MESSAGES_FILE") {
            Ok(path) => StatusMessages::from_file(PathBuf::from(path))?,
            Err(_) => defaults.messages,
        };

        let config = Self {
            indicator_id,
            first_enable_properties,
            messages,
        };

        config.validate().context("invalid enabler configuration")?;

        Ok(config)
    }

    /// Parse `key=value` pairs separated by `;`
    fn parse_properties(properties: &str) -> Result<Vec<PropertyWrite>> {
        properties
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let Some((key, value)) = pair.split_once('=') else {
                    bail!("missing '=' in property assignment: {pair}");
                };

                Ok(PropertyWrite {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                })
            })
            .collect()
    }
}

impl StatusMessages {
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .context(format!("failed to read status messages file: {path:?}"))?;

        serde_json::from_str(&contents)
            .context(format!("failed to parse status messages file: {path:?}"))
    }
}

impl SimulatorConfig {
    /// Load the simulator settings, showing the same indicator the enabler hides
    pub fn load(enabler: &EnablerConfig) -> Result<Self> {
        let transition_delay = match env::var("RADIO_SIM_TRANSITION_MS") {
            Ok(millis) => Duration::from_millis(
                millis
                    .parse::<u64>()
                    .context("failed to parse RADIO_SIM_TRANSITION_MS: invalid format")?,
            ),
            Err(_) => Self::default().transition_delay,
        };

        Ok(Self {
            transition_delay,
            indicator_id: enabler.indicator_id.clone(),
        })
    }
}
