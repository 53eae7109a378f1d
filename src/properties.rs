use anyhow::{Result, ensure};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use std::collections::BTreeMap;

/// Device property setter used for configuration coupled to the radio.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait PropertyStore {
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Property store kept in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProperties {
    values: BTreeMap<String, String>,
}

impl InMemoryProperties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl PropertyStore for InMemoryProperties {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        ensure!(!key.is_empty(), "failed to set property: empty key");

        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
