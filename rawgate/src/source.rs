//! Key-value configuration sources.

use std::collections::{BTreeMap, HashMap};

/// Read-only lookup of named settings.
///
/// Implementations return `None` for unset keys. Empty values are filtered out
/// by [`ProxyConfig::from_source`](crate::ProxyConfig::from_source), so a source
/// does not need to care about them.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Settings taken from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}
