// 7.0: portfolio time series. the engine pushes one sample per processed tick;
// everything here is derived from those samples plus the realized pnl ledger.
// equity = cumulative realized pnl + current unrealized. the book starts flat,
// so the drawdown peak starts at zero.

use crate::position::Position;
use crate::types::{Quote, StrategyId, Timestamp};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symmetric pairwise matrix, keyed both ways. The diagonal is omitted.
pub type CorrelationMatrix = BTreeMap<StrategyId, BTreeMap<StrategyId, Decimal>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: Timestamp,
    pub equity: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalytics {
    realized_total: Quote,
    realized_by_strategy: BTreeMap<StrategyId, Quote>,
    equity_curve: Vec<EquityPoint>,
    strategy_equity: BTreeMap<StrategyId, Vec<Decimal>>,
}

impl PortfolioAnalytics {
    pub fn new() -> Self {
        Self {
            realized_total: Quote::zero(),
            realized_by_strategy: BTreeMap::new(),
            equity_curve: Vec::new(),
            strategy_equity: BTreeMap::new(),
        }
    }

    // 7.1: realized pnl accrues when a position leaves the book.
    pub fn record_close(&mut self, position: &Position) {
        if let Some(realized) = position.realized_pnl() {
            self.realized_total = self.realized_total.add(realized);
            let entry = self
                .realized_by_strategy
                .entry(position.strategy_id.clone())
                .or_insert_with(Quote::zero);
            *entry = entry.add(realized);
        }
    }

    // 7.2: one equity sample per tick, taken after that tick's closes and opens.
    // positions without a current price contribute nothing yet.
    pub fn record_sample(&mut self, timestamp: Timestamp, active: &[Position]) {
        let unrealized: Quote = active
            .iter()
            .filter_map(|position| position.unrealized_pnl())
            .sum();
        self.equity_curve.push(EquityPoint {
            timestamp,
            equity: self.realized_total.add(unrealized),
        });

        // per-strategy series: any strategy seen before keeps sampling (flat at
        // its realized level once its book is empty), new ones start here.
        let mut ids: Vec<StrategyId> = self.strategy_equity.keys().cloned().collect();
        for id in self.realized_by_strategy.keys() {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        for position in active {
            if !ids.contains(&position.strategy_id) {
                ids.push(position.strategy_id.clone());
            }
        }

        for id in ids {
            let realized = self
                .realized_by_strategy
                .get(&id)
                .copied()
                .unwrap_or_else(Quote::zero);
            let unrealized: Quote = active
                .iter()
                .filter(|position| position.strategy_id == id)
                .filter_map(|position| position.unrealized_pnl())
                .sum();
            self.strategy_equity
                .entry(id)
                .or_default()
                .push(realized.add(unrealized).value());
        }
    }

    pub fn realized_pnl(&self) -> Quote {
        self.realized_total
    }

    pub fn realized_for(&self, strategy_id: &StrategyId) -> Quote {
        self.realized_by_strategy
            .get(strategy_id)
            .copied()
            .unwrap_or_else(Quote::zero)
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn sample_count(&self) -> usize {
        self.equity_curve.len()
    }

    // 7.3: worst peak-to-trough equity drop, absolute quote amount.
    // None until the first sample lands.
    pub fn max_drawdown(&self) -> Option<Quote> {
        if self.equity_curve.is_empty() {
            return None;
        }

        let mut peak = Decimal::ZERO;
        let mut worst = Decimal::ZERO;
        for point in &self.equity_curve {
            let equity = point.equity.value();
            if equity > peak {
                peak = equity;
            }
            let drawdown = peak - equity;
            if drawdown > worst {
                worst = drawdown;
            }
        }
        Some(Quote::new(worst))
    }

    // 7.4: pearson over per-tick equity deltas, pairwise. series are aligned
    // on their tails so a strategy that joined late still gets compared over
    // the stretch both were live. pairs without enough movement are skipped;
    // None when no pair qualifies.
    pub fn strategy_correlation(&self) -> Option<CorrelationMatrix> {
        let ids: Vec<&StrategyId> = self.strategy_equity.keys().collect();
        let mut matrix = CorrelationMatrix::new();

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if let Some(corr) = self.pairwise_correlation(ids[i], ids[j]) {
                    matrix
                        .entry(ids[i].clone())
                        .or_default()
                        .insert(ids[j].clone(), corr);
                    matrix
                        .entry(ids[j].clone())
                        .or_default()
                        .insert(ids[i].clone(), corr);
                }
            }
        }

        if matrix.is_empty() {
            None
        } else {
            Some(matrix)
        }
    }

    fn pairwise_correlation(&self, a: &StrategyId, b: &StrategyId) -> Option<Decimal> {
        let series_a = self.strategy_equity.get(a)?;
        let series_b = self.strategy_equity.get(b)?;

        let n = series_a.len().min(series_b.len());
        if n < 3 {
            return None; // fewer than two deltas says nothing
        }

        let deltas =
            |series: &[Decimal]| -> Vec<Decimal> {
                series[series.len() - n..]
                    .windows(2)
                    .map(|pair| pair[1] - pair[0])
                    .collect()
            };

        pearson(&deltas(series_a), &deltas(series_b))
    }
}

impl Default for PortfolioAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

fn pearson(xs: &[Decimal], ys: &[Decimal]) -> Option<Decimal> {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 {
        return None;
    }

    let n = Decimal::from(xs.len() as u64);
    let mean_x = xs.iter().copied().sum::<Decimal>() / n;
    let mean_y = ys.iter().copied().sum::<Decimal>() / n;

    let mut covariance = Decimal::ZERO;
    let mut variance_x = Decimal::ZERO;
    let mut variance_y = Decimal::ZERO;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = *x - mean_x;
        let dy = *y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x.is_zero() || variance_y.is_zero() {
        return None;
    }

    let denominator = (variance_x * variance_y).sqrt()?;
    if denominator.is_zero() {
        return None;
    }
    Some(covariance / denominator)
}
