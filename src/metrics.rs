// 6.0: point-in-time portfolio metrics. a snapshot is a pure read over the active
// set: same book in, same numbers out. unrealized pnl counts only positions that
// have seen a tick; exposure and the head count cover everything.

use crate::analytics::{CorrelationMatrix, PortfolioAnalytics};
use crate::position::Position;
use crate::types::Quote;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_positions: usize,
    // sum of size * direction sign over the whole active set, base units
    pub net_exposure: Decimal,
    // sum over positions with a known current price. never-ticked positions
    // are excluded, not counted as zero
    pub total_unrealized_pnl: Quote,
    pub max_drawdown: Option<Quote>,
    pub strategy_correlation: Option<CorrelationMatrix>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn snapshot(&self, positions: &[Position]) -> PortfolioMetrics {
        PortfolioMetrics {
            total_positions: positions.len(),
            net_exposure: positions.iter().map(Position::exposure).sum(),
            total_unrealized_pnl: positions
                .iter()
                .filter_map(Position::unrealized_pnl)
                .sum(),
            max_drawdown: None,
            strategy_correlation: None,
        }
    }

    // same core numbers, extension hooks filled from the analytics series
    pub fn snapshot_with_analytics(
        &self,
        positions: &[Position],
        analytics: &PortfolioAnalytics,
    ) -> PortfolioMetrics {
        let mut metrics = self.snapshot(positions);
        metrics.max_drawdown = analytics.max_drawdown();
        metrics.strategy_correlation = analytics.strategy_correlation();
        metrics
    }
}
