//! # World Configuration
//!
//! Tuning knobs loaded once at startup from TOML.
//!
//! ```toml
//! initial_entity_capacity = 4096
//! initial_component_capacity = 256
//! trace_events = true
//! ```
//!
//! Missing keys fall back to [`WorldConfig::default`].

use std::path::Path;

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Entity slots reserved up front.
    pub initial_entity_capacity: usize,
    /// Capacity reserved by each component store when it is first created.
    pub initial_component_capacity: usize,
    /// Emit a `trace!` record for every event dispatch.
    pub trace_events: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_entity_capacity: 1024,
            initial_component_capacity: 64,
            trace_events: false,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        toml::from_str(text).map_err(|err| EcsError::InvalidConfig(err.to_string()))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Io`] if the file cannot be read, or
    /// [`EcsError::InvalidConfig`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Sets the initial entity capacity.
    #[must_use]
    pub const fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.initial_entity_capacity = capacity;
        self
    }

    /// Enables or disables per-dispatch tracing.
    #[must_use]
    pub const fn with_trace_events(mut self, enabled: bool) -> Self {
        self.trace_events = enabled;
        self
    }
}
