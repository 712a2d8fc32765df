//! Runtime configuration.
//!
//! Configuration is per thread, like the rest of the reactive runtime. It is
//! installed with [`Runtime::configure`](crate::reactive::Runtime::configure)
//! and can be loaded from JSON so hosts can keep it next to their own
//! settings.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default maximum runner nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Tunables for the per-thread reactive runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How many runners may be nested inside each other before a cascade is
    /// treated as a non-converging write cycle.
    pub max_depth: usize,
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder-style setter for `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
