use std::sync::{Arc, PoisonError, RwLock};

/// Version used when nothing else is configured
pub const DEFAULT_BALANCE_VERSION: &str = "v1";

/// Environment variable naming the active balance version
pub const BALANCE_VERSION_ENV: &str = "BALANCE_VERSION";

/// Shared handle to the active balance version
///
/// Clones share the same version. A loader built from one clone sees a switch
/// made through any other clone on its next read.
#[derive(Debug, Clone)]
pub struct BalanceContext {
    version: Arc<RwLock<String>>,
}

impl Default for BalanceContext {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE_VERSION)
    }
}

impl BalanceContext {
    pub fn new(version: impl Into<String>) -> Self {
        BalanceContext {
            version: Arc::new(RwLock::new(version.into())),
        }
    }

    /// Context initialised from `BALANCE_VERSION`, or `v1` when unset or blank
    pub fn from_env() -> Self {
        match std::env::var(BALANCE_VERSION_ENV) {
            Ok(v) if !v.trim().is_empty() => Self::new(v.trim()),
            _ => Self::default(),
        }
    }

    pub fn version(&self) -> String {
        self.version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_version(&self, version: impl Into<String>) {
        *self
            .version
            .write()
            .unwrap_or_else(PoisonError::into_inner) = version.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version() {
        assert_eq!(BalanceContext::default().version(), "v1");
    }

    #[test]
    fn test_clones_share_version() {
        let context = BalanceContext::new("v1");
        let other = context.clone();
        other.set_version("v2");
        assert_eq!(context.version(), "v2");
    }
}
