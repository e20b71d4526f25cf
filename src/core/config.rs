//! # Runtime configuration.
//!
//! Provides [`Config`], centralized settings for a [`Runtime`](crate::Runtime).
//!
//! ## Sentinel values
//! - `max_emit_depth = 0` → nested emits are not bounded
//! - `bus_capacity = 0` → clamped to 1
//!
//! Config can be built in code or loaded from JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Global configuration of one runtime.
///
/// ## Field semantics
/// - `marker_attribute`: attribute naming a container's pane type
/// - `mounted_attribute`: attribute the runtime sets on mounted containers
/// - `bus_capacity`: diagnostics bus ring buffer size (min 1)
/// - `max_emit_depth`: bound on nested pane-bus emits (`0` = unbounded)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attribute that declares a container's pane type, e.g. `data-pane="counter"`.
    pub marker_attribute: String,

    /// Attribute set on a container while a pane instance is mounted in it.
    ///
    /// Its value is the instance id. Discovery skips containers carrying it.
    pub mounted_attribute: String,

    /// Capacity of the diagnostics broadcast channel.
    ///
    /// Subscribers that lag behind more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,

    /// Maximum nesting of pane-bus emits.
    ///
    /// A listener that writes state in reaction to a change re-enters the bus; two
    /// panes doing that to each other would never terminate. Emits nested deeper
    /// than this are dropped and reported as `CycleDetected`.
    pub max_emit_depth: usize,
}

impl Config {
    /// Parses a config from JSON; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the emit depth bound as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` nested emits
    #[inline]
    pub fn emit_depth_limit(&self) -> Option<usize> {
        if self.max_emit_depth == 0 {
            None
        } else {
            Some(self.max_emit_depth)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `marker_attribute = "data-pane"`
    /// - `mounted_attribute = "data-pane-mounted"`
    /// - `bus_capacity = 1024`
    /// - `max_emit_depth = 32`
    fn default() -> Self {
        Self {
            marker_attribute: "data-pane".to_string(),
            mounted_attribute: "data-pane-mounted".to_string(),
            bus_capacity: 1024,
            max_emit_depth: 32,
        }
    }
}
