// 9.0 engine/core.rs: main engine. owns the registry, the strategy router, the
// exit evaluator, the analytics series and the trade history. everything a tick
// can touch lives behind this struct.

use super::config::EngineConfig;
use crate::analytics::PortfolioAnalytics;
use crate::config::ConfigError;
use crate::history::{TradeHistory, TradeRecord};
use crate::metrics::{MetricsCalculator, PortfolioMetrics};
use crate::position::Position;
use crate::registry::PositionRegistry;
use crate::risk::ExitEvaluator;
use crate::strategy::{Strategy, StrategyRouter};
use crate::types::{PositionId, Quote, StrategyId};

/** 9.1: main engine struct. all state lives here */
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) registry: PositionRegistry,
    pub(super) router: StrategyRouter,
    pub(super) exits: ExitEvaluator,
    pub(super) metrics: MetricsCalculator,
    pub(super) analytics: PortfolioAnalytics,
    pub(super) history: TradeHistory,
    pub(super) ticks_processed: u64,
}

// manual impl: `router` holds `Box<dyn Strategy>`, which has no Debug bound
impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("exits", &self.exits)
            .field("metrics", &self.metrics)
            .field("analytics", &self.analytics)
            .field("history", &self.history)
            .field("ticks_processed", &self.ticks_processed)
            .finish_non_exhaustive()
    }
}

impl Engine {
    // fail fast: a bad risk config never yields an engine
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let exits = ExitEvaluator::new(&config.risk)?;
        Ok(Self {
            config,
            registry: PositionRegistry::new(),
            router: StrategyRouter::new(),
            exits,
            metrics: MetricsCalculator::new(),
            analytics: PortfolioAnalytics::new(),
            history: TradeHistory::new(),
            ticks_processed: 0,
        })
    }

    // last registration wins; a replaced id keeps its dispatch slot
    pub fn register_strategy(&mut self, id: StrategyId, strategy: Box<dyn Strategy>) {
        self.router.register(id, strategy);
    }

    pub fn strategy_ids(&self) -> Vec<&StrategyId> {
        self.router.strategy_ids()
    }

    pub fn active_positions(&self) -> &[Position] {
        self.registry.active_positions()
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.registry.get(id)
    }

    pub fn history(&self) -> &[TradeRecord] {
        self.history.records()
    }

    pub fn realized_pnl(&self) -> Quote {
        self.analytics.realized_pnl()
    }

    pub fn analytics(&self) -> &PortfolioAnalytics {
        &self.analytics
    }

    // current snapshot without processing anything
    pub fn metrics(&self) -> PortfolioMetrics {
        self.metrics
            .snapshot_with_analytics(self.registry.active_positions(), &self.analytics)
    }

    pub fn ticks_processed(&self) -> u64 {
        self.ticks_processed
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
