// 9.0.2: result types and errors for tick processing.

use crate::metrics::PortfolioMetrics;
use crate::position::Position;
use crate::registry::RegistryError;
use crate::strategy::StrategyFailure;
use crate::tick::TickValidationError;
use crate::types::{PositionId, Symbol, Timestamp};

/// Everything one processed tick did to the book. Strategy failures ride
/// along here instead of aborting the tick; an empty `strategy_failures`
/// means every evaluator ran clean.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub instrument: Symbol,
    pub timestamp: Timestamp,
    pub metrics: PortfolioMetrics,
    pub closed: Vec<Position>,
    pub opened: Vec<PositionId>,
    pub strategy_failures: Vec<StrategyFailure>,
}

impl TickReport {
    pub fn has_failures(&self) -> bool {
        !self.strategy_failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid tick: {0}")]
    InvalidTick(#[from] TickValidationError),

    #[error("illegal position state: {0}")]
    IllegalState(#[from] RegistryError),
}
