//! # Registry configuration.
//!
//! Provides [`RegistryConfig`], the settings a [`Registry`](crate::Registry)
//! is created with.
//!
//! Config is used in two ways:
//! 1. **Registry creation**: `Registry::new(config)`
//! 2. **Lane defaults**: lanes created lazily on first submission take their
//!    [`LaneConfig`] from here (`config_for(&key)`)
//!
//! ## Lookup order for a lazily created lane
//! ```text
//! LaneKey::Named(n)   → lanes[n] → named_lane
//! LaneKey::Session(_) → session_lane
//! ```
//!
//! ## Loading
//! Both config types are `serde` structs with `#[serde(default)]`, so a
//! partial document is enough:
//! ```toml
//! bus_capacity = 256
//!
//! [lanes.build]
//! mode = "bounded-parallel"
//! max_concurrency = 4
//! backpressure = "reject"
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LaneError;
use crate::lanes::{LaneConfig, LaneKey};

/// Configuration of a lane registry.
///
/// ## Field semantics
/// - `bus_capacity`: broadcast ring size for raw event receivers (min 1)
/// - `named_lane`: default config for named lanes without a preset
/// - `session_lane`: default config for session lanes
/// - `lanes`: per-name presets, applied when that lane is first created
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Capacity of the event broadcast channel.
    ///
    /// Receivers that lag behind more than `bus_capacity` events get
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Config of named lanes that have no entry in `lanes`.
    pub named_lane: LaneConfig,

    /// Config of session-keyed lanes.
    pub session_lane: LaneConfig,

    /// Presets keyed by lane name.
    pub lanes: HashMap<String, LaneConfig>,
}

impl Default for RegistryConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `named_lane = LaneConfig::default()` (serial, depth 1024, block)
    /// - `session_lane = LaneConfig::default()`
    /// - `lanes = {}`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            named_lane: LaneConfig::default(),
            session_lane: LaneConfig::default(),
            lanes: HashMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Adds a preset for the named lane `name`.
    pub fn with_lane(mut self, name: impl Into<String>, config: LaneConfig) -> Self {
        self.lanes.insert(name.into(), config);
        self
    }

    /// Validates every contained lane config.
    pub fn validate(&self) -> Result<(), LaneError> {
        self.named_lane.validate()?;
        self.session_lane.validate()?;
        for (name, cfg) in &self.lanes {
            cfg.validate().map_err(|e| match e {
                LaneError::InvalidConfig { reason } => {
                    LaneError::invalid(format!("lane {name:?}: {reason}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Config a lane with this key receives when created implicitly.
    pub fn config_for(&self, key: &LaneKey) -> &LaneConfig {
        match key {
            LaneKey::Session(_) => &self.session_lane,
            LaneKey::Named(name) => self.lanes.get(&**name).unwrap_or(&self.named_lane),
        }
    }
}
