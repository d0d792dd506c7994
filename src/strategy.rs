// Strategy Dispatch
//
// The engine is agnostic to how trade signals are produced. A strategy is
// anything implementing `Strategy`; the router holds them in registration
// order and feeds every validated tick to each of them, passing along the
// positions that strategy currently owns. One misbehaving strategy never
// stops the others: its error is collected and reported with the tick result.

use crate::position::Position;
use crate::registry::PositionRegistry;
use crate::tick::Tick;
use crate::types::{Side, Size, StrategyId, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalAction {
    Buy,
    Sell,
}

impl SignalAction {
    /// Buy opens a long, sell opens a short.
    pub fn side(&self) -> Side {
        match self {
            SignalAction::Buy => Side::Long,
            SignalAction::Sell => Side::Short,
        }
    }
}

/// Ephemeral strategy output: consumed by the engine on the tick it was
/// produced for, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: SignalAction,
    pub size: Size,
}

impl Signal {
    pub fn buy(size: Size) -> Self {
        Self {
            action: SignalAction::Buy,
            size,
        }
    }

    pub fn sell(size: Size) -> Self {
        Self {
            action: SignalAction::Sell,
            size,
        }
    }
}

/// Failure inside one strategy's `evaluate`. Carried as data so the caller
/// can report it; it never aborts the tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StrategyError {
    message: String,
}

impl StrategyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait Strategy {
    /// Evaluate one tick. `own_positions` is the slice of active positions
    /// opened under this strategy's id, in open order. `&mut self` because
    /// real strategies keep rolling state between ticks.
    fn evaluate(
        &mut self,
        tick: &Tick,
        own_positions: &[&Position],
    ) -> Result<Option<Signal>, StrategyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy_id: StrategyId,
    pub error: StrategyError,
}

/// Everything one dispatch produced: signals in registration order, plus the
/// failures that were isolated along the way.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub signals: Vec<(StrategyId, Signal)>,
    pub failures: Vec<StrategyFailure>,
}

/// Ordered registry of strategy evaluators. Registration order is the
/// dispatch order; re-registering an id swaps the evaluator but keeps the
/// slot, so downstream ordering never shifts under a hot swap.
#[derive(Default)]
pub struct StrategyRouter {
    entries: Vec<(StrategyId, Box<dyn Strategy>)>,
}

impl StrategyRouter {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, id: StrategyId, strategy: Box<dyn Strategy>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = strategy,
            None => self.entries.push((id, strategy)),
        }
    }

    pub fn strategy_ids(&self) -> Vec<&StrategyId> {
        self.entries.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dispatch(&mut self, tick: &Tick, registry: &PositionRegistry) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for (id, strategy) in self.entries.iter_mut() {
            let own_positions = registry.positions_for(id);
            match strategy.evaluate(tick, &own_positions) {
                Ok(Some(signal)) => outcome.signals.push((id.clone(), signal)),
                Ok(None) => {}
                Err(error) => outcome.failures.push(StrategyFailure {
                    strategy_id: id.clone(),
                    error,
                }),
            }
        }

        outcome
    }
}

/// Reference strategy: rolling-mean momentum on one instrument. Buys when the
/// price crosses above its rolling mean, sells when it crosses below, and
/// stays quiet while it already holds a position. Ticks for other instruments
/// are ignored. Mostly here so the simulator has something realistic to run;
/// real deployments bring their own implementations.
pub struct MomentumStrategy {
    symbol: Symbol,
    window_len: usize,
    size: Size,
    window: VecDeque<Decimal>,
}

impl MomentumStrategy {
    pub fn new(symbol: Symbol, window_len: usize, size: Size) -> Self {
        debug_assert!(window_len >= 2, "momentum needs at least two samples");
        Self {
            symbol,
            window_len,
            size,
            window: VecDeque::with_capacity(window_len),
        }
    }

    fn rolling_mean(&self) -> Decimal {
        let sum: Decimal = self.window.iter().copied().sum();
        sum / Decimal::from(self.window.len() as u64)
    }
}

impl Strategy for MomentumStrategy {
    fn evaluate(
        &mut self,
        tick: &Tick,
        own_positions: &[&Position],
    ) -> Result<Option<Signal>, StrategyError> {
        if tick.instrument != self.symbol {
            return Ok(None);
        }

        self.window.push_back(tick.price.value());
        while self.window.len() > self.window_len {
            self.window.pop_front();
        }

        if self.window.len() < self.window_len || !own_positions.is_empty() {
            return Ok(None);
        }

        let mean = self.rolling_mean();
        let price = tick.price.value();
        if price > mean {
            Ok(Some(Signal::buy(self.size)))
        } else if price < mean {
            Ok(Some(Signal::sell(self.size)))
        } else {
            Ok(None)
        }
    }
}
