//! Exit risk rule: the MFE trailing stop.
//!
//! Positions are judged per instrument, not one by one. All open positions on
//! a symbol form one group; the group's best seen profit (summed MFE) sets the
//! water mark, and once current group P&L gives back more than the configured
//! share of that mark, the whole group is flagged for close. A group that has
//! never been in profit is never flagged, no matter how deep under water.

use crate::config::ConfigError;
use crate::position::{ExitReason, Position};
use crate::types::{PositionId, Quote, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Risk settings the engine refuses to run without. There is deliberately no
/// `Default`: a missing threshold is a construction-time failure, not a
/// silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Give-back tolerance in (0, 1]. 0.5 means: flag the group once current
    /// P&L drops below half of its total MFE.
    pub mfe_exit_threshold: Decimal,
}

impl RiskConfig {
    pub fn new(mfe_exit_threshold: Decimal) -> Self {
        Self { mfe_exit_threshold }
    }

    /// Build from a plain settings map, for callers whose configuration
    /// arrives as loose key/value pairs. Required keys missing from the map
    /// fail here rather than later.
    pub fn from_map(settings: &HashMap<String, Decimal>) -> Result<Self, ConfigError> {
        let mfe_exit_threshold = settings
            .get("mfe_exit_threshold")
            .copied()
            .ok_or(ConfigError::MissingRiskSetting("mfe_exit_threshold"))?;

        let config = Self { mfe_exit_threshold };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mfe_exit_threshold <= Decimal::ZERO || self.mfe_exit_threshold > Decimal::ONE {
            return Err(ConfigError::InvalidRisk {
                reason: format!(
                    "mfe_exit_threshold must be in (0, 1], got {}",
                    self.mfe_exit_threshold
                ),
            });
        }
        Ok(())
    }
}

/// One position flagged for close and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSignal {
    pub position_id: PositionId,
    pub reason: ExitReason,
}

/// Applies the trailing-stop rule over the active set. Pure: looks, never
/// touches.
#[derive(Debug, Clone)]
pub struct ExitEvaluator {
    threshold: Decimal,
}

impl ExitEvaluator {
    pub fn new(config: &RiskConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            threshold: config.mfe_exit_threshold,
        })
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Flag groups that gave back too much. Output order is deterministic:
    /// groups in first-seen symbol order, positions in active-set order.
    pub fn evaluate(&self, positions: &[Position]) -> Vec<ExitSignal> {
        let mut groups: Vec<(&Symbol, Vec<&Position>)> = Vec::new();
        for position in positions {
            match groups
                .iter_mut()
                .find(|(symbol, _)| *symbol == &position.symbol)
            {
                Some((_, members)) => members.push(position),
                None => groups.push((&position.symbol, vec![position])),
            }
        }

        let mut signals = Vec::new();
        for (_, members) in &groups {
            let total_mfe: Quote = members
                .iter()
                .map(|position| position.max_favorable_excursion)
                .sum();

            if total_mfe.value() <= Decimal::ZERO {
                continue;
            }

            // positions that have never seen a tick carry no P&L term here,
            // same as in the unrealized total.
            let current_pl: Quote = members
                .iter()
                .filter_map(|position| position.unrealized_pnl())
                .sum();

            let floor = total_mfe.mul(Decimal::ONE - self.threshold);
            if current_pl < floor {
                for member in members {
                    signals.push(ExitSignal {
                        position_id: member.id,
                        reason: ExitReason::MfeTrailingStop,
                    });
                }
            }
        }

        signals
    }
}
