//! Engine configuration options.

use crate::config::ConfigError;
use crate::risk::RiskConfig;
use serde::{Deserialize, Serialize};

/// Engine configuration. There is deliberately no `Default`: the risk section
/// has no fallback values, so an engine cannot be built without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Exit rule settings, validated at engine construction.
    pub risk: RiskConfig,
    /// Print opens and closes as they happen.
    #[serde(default)]
    pub verbose: bool,
}

impl EngineConfig {
    pub fn new(risk: RiskConfig) -> Self {
        Self {
            risk,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk.validate()
    }
}
