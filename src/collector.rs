// Collector Integration
//
// This module abstracts how raw ticks get from a trading terminal into the
// tick store. The engine never sees any of this; it runs off whatever records
// it is handed. `QuoteFeed` is the terminal boundary (one current tick per
// instrument on request), `TickCollector` is the polling loop body: one round
// asks the feed for each configured symbol and writes through to the store.
// Loop cadence belongs to the caller; `poll_interval_ms` in the config is
// advisory and nothing here ever sleeps.

use crate::config::{CollectorConfig, ConfigError};
use crate::store::TickStore;
use crate::tick::TickRecord;
use crate::types::Symbol;
use std::collections::HashMap;
use std::collections::VecDeque;

/// Terminal boundary: the freshest tick for one instrument, if the terminal
/// has one. `&mut self` because real feeds consume from a session.
pub trait QuoteFeed {
    fn current_tick(&mut self, symbol: &Symbol) -> Option<TickRecord>;
}

/// Scripted in-memory feed for simulations and tests. Each call pops the next
/// queued record for the requested symbol.
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    queues: HashMap<Symbol, VecDeque<TickRecord>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    pub fn push(&mut self, symbol: Symbol, record: TickRecord) {
        self.queues.entry(symbol).or_default().push_back(record);
    }

    pub fn is_drained(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }
}

impl QuoteFeed for ScriptedFeed {
    fn current_tick(&mut self, symbol: &Symbol) -> Option<TickRecord> {
        self.queues.get_mut(symbol).and_then(VecDeque::pop_front)
    }
}

/// What one polling round did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub stored: usize,
    /// symbols the feed had nothing for, plus records the store refused
    pub skipped: usize,
}

pub struct TickCollector {
    config: CollectorConfig,
}

impl TickCollector {
    pub fn new(config: CollectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// One polling round over the configured symbols, in configured order.
    pub fn collect_once(&self, feed: &mut dyn QuoteFeed, store: &mut TickStore) -> CollectStats {
        let mut stats = CollectStats::default();

        for symbol in &self.config.symbols {
            match feed.current_tick(symbol) {
                Some(record) => match store.insert(record) {
                    Ok(()) => stats.stored += 1,
                    Err(_) => stats.skipped += 1,
                },
                None => stats.skipped += 1,
            }
        }

        stats
    }
}
