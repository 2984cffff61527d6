//! Bus configuration and validation
//!
//! # Example
//!
//! ```
//! use conduit_bus::{Bus, BusConfig};
//!
//! let config = BusConfig::default()
//!     .with_name("commands")
//!     .with_max_senders(64);
//!
//! let bus: Bus<String> = Bus::with_config(config).expect("valid config");
//! assert_eq!(bus.config().name, "commands");
//! ```

use crate::error::BusError;
use crate::{DEFAULT_BUS_NAME, DEFAULT_MAX_SENDERS};
use serde::{Deserialize, Serialize};

/// Bus configuration.
///
/// Building a bus from a configuration allocates nothing; the conduits are
/// still created lazily on first use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Label attached to every log event emitted by the bus.
    pub name: String,
    /// Representable range of the sender counter. Connecting a sender when
    /// this many are attached is a fatal accounting fault.
    pub max_senders: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUS_NAME.to_string(),
            max_senders: DEFAULT_MAX_SENDERS,
        }
    }
}

impl BusConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), BusError> {
        if self.name.is_empty() {
            return Err(BusError::InvalidConfig("name cannot be empty".to_string()));
        }

        if self.max_senders == 0 {
            return Err(BusError::InvalidConfig(
                "max_senders cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the bus name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style method to set the sender counter bound
    pub fn with_max_senders(mut self, max: u32) -> Self {
        self.max_senders = max;
        self
    }
}
