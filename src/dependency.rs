#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use std::collections::HashMap;

/// Looks up the control another control depends on.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DependencyResolver {
    /// Whether the control registered under `key` forces its dependents
    /// disabled, `None` if no such control exists
    fn resolve_veto(&self, key: &str) -> Option<bool>;
}

/// Resolver over a fixed table of control keys.
#[derive(Clone, Debug, Default)]
pub struct DependencyTable {
    vetoes: HashMap<String, bool>,
}

impl DependencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control(mut self, key: impl Into<String>, disables_dependents: bool) -> Self {
        self.vetoes.insert(key.into(), disables_dependents);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, disables_dependents: bool) {
        self.vetoes.insert(key.into(), disables_dependents);
    }
}

impl DependencyResolver for DependencyTable {
    fn resolve_veto(&self, key: &str) -> Option<bool> {
        self.vetoes.get(key).copied()
    }
}
