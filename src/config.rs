// 8.0 config.rs: shared configuration pieces. collector settings and the
// validation errors every config section reports through. the engine's own
// runtime options live with the engine, the risk section lives in risk.rs.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Collector settings: which instruments to poll and the cadence the polling
// caller should run at. The collector itself never sleeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    // instruments to poll, in polling order
    pub symbols: Vec<Symbol>,
    // advisory interval between polling rounds, milliseconds
    pub poll_interval_ms: i64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                Symbol::new("EURUSD"),
                Symbol::new("GBPUSD"),
                Symbol::new("USDJPY"),
            ],
            poll_interval_ms: 60_000,
        }
    }
}

impl CollectorConfig {
    pub fn new(symbols: Vec<Symbol>, poll_interval_ms: i64) -> Self {
        Self {
            symbols,
            poll_interval_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::InvalidCollector {
                reason: "symbol list must not be empty".to_string(),
            });
        }

        if self.symbols.iter().any(|symbol| symbol.is_empty()) {
            return Err(ConfigError::InvalidCollector {
                reason: "symbol list contains an empty symbol".to_string(),
            });
        }

        if self.poll_interval_ms <= 0 {
            return Err(ConfigError::InvalidCollector {
                reason: format!(
                    "poll_interval_ms must be positive, got {}",
                    self.poll_interval_ms
                ),
            });
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required risk setting '{0}'")]
    MissingRiskSetting(&'static str),
    #[error("invalid risk settings: {reason}")]
    InvalidRisk { reason: String },
    #[error("invalid collector settings: {reason}")]
    InvalidCollector { reason: String },
}
