// Tick Storage
//
// In-memory stand-in for the collector's persistence layer. Records are held
// per symbol in timestamp order; equal timestamps keep arrival order. The
// store accepts raw records as the feed delivered them, so a stored tick may
// still be missing its price; only instrument and timestamp are required,
// because they are the storage key. Validation for trading purposes happens
// later, at the engine boundary.

use crate::tick::{TickRecord, TickValidationError};
use crate::types::{Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The bounded-query contract a tick source honors: per instrument, in
/// timestamp order, both bounds inclusive.
pub trait TickSource {
    fn tick_range(&self, symbol: &Symbol, start: Timestamp, end: Timestamp) -> Vec<TickRecord>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickStore {
    series: BTreeMap<Symbol, Vec<TickRecord>>,
}

impl TickStore {
    pub fn new() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }

    /// Store one raw record under its instrument and timestamp.
    pub fn insert(&mut self, record: TickRecord) -> Result<(), TickValidationError> {
        let symbol = match &record.instrument {
            Some(symbol) if !symbol.is_empty() => symbol.clone(),
            _ => return Err(TickValidationError::MissingInstrument),
        };
        let timestamp = record
            .timestamp
            .ok_or(TickValidationError::MissingTimestamp)?;

        let series = self.series.entry(symbol).or_default();
        // stored series are always timestamp sorted, so this partition point
        // lands right after the last record at or before the new timestamp
        let at = series.partition_point(|existing| {
            existing
                .timestamp
                .map_or(false, |existing_ts| existing_ts <= timestamp)
        });
        series.insert(at, record);
        Ok(())
    }

    /// All stored ticks for one instrument, oldest first.
    pub fn replay(&self, symbol: &Symbol) -> impl Iterator<Item = &TickRecord> {
        self.series
            .get(symbol)
            .into_iter()
            .flat_map(|series| series.iter())
    }

    /// Every stored tick across instruments merged into timestamp order.
    /// Ties keep symbol order, so two runs replay identically.
    pub fn replay_all(&self) -> Vec<TickRecord> {
        let mut merged: Vec<TickRecord> = self
            .series
            .values()
            .flat_map(|series| series.iter().cloned())
            .collect();
        merged.sort_by_key(|record| record.timestamp);
        merged
    }

    pub fn latest(&self, symbol: &Symbol) -> Option<&TickRecord> {
        self.series.get(symbol).and_then(|series| series.last())
    }

    pub fn symbols(&self) -> Vec<&Symbol> {
        self.series.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }
}

impl TickSource for TickStore {
    fn tick_range(&self, symbol: &Symbol, start: Timestamp, end: Timestamp) -> Vec<TickRecord> {
        let Some(series) = self.series.get(symbol) else {
            return Vec::new();
        };

        let from = series.partition_point(|record| {
            record.timestamp.map_or(false, |timestamp| timestamp < start)
        });
        let to = series.partition_point(|record| {
            record.timestamp.map_or(false, |timestamp| timestamp <= end)
        });
        series[from..to].to_vec()
    }
}
