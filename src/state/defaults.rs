//! # Central default-slice factories.
//!
//! Instead of every pane re-deriving the shape of a slice it reads first, the
//! bootstrap registers one factory per key. [`StateStore::get`](super::StateStore::get)
//! consults it when the key has no value yet.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::ConfigError;
use crate::sync::{read, write};

/// Produces the default value of one key.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Registry of default factories, at most one per key.
#[derive(Default)]
pub struct Defaults {
    factories: RwLock<HashMap<String, DefaultFn>>,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default for `key`.
    ///
    /// A second registration for the same key is rejected and the first stays.
    pub fn register(&self, key: &str, factory: DefaultFn) -> Result<(), ConfigError> {
        let mut factories = write(&self.factories);
        if factories.contains_key(key) {
            return Err(ConfigError::DuplicateDefault { key: key.to_string() });
        }
        factories.insert(key.to_string(), factory);
        Ok(())
    }

    /// Builds a fresh default for `key`, if one is registered.
    pub fn produce(&self, key: &str) -> Option<Value> {
        let factory = read(&self.factories).get(key).cloned()?;
        Some(factory())
    }
}
