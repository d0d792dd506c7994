// 3.0: every open and close lands in the trade history. append-only, never rewritten.
// one record per lifecycle transition, carrying a full snapshot of the position as it
// looked at that moment. this is the audit trail external reporting reads.

use crate::position::{ExitReason, Position};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeSeq(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub seq: TradeSeq,
    pub timestamp: Timestamp,
    pub entry: TradeEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TradeEntry {
    Opened {
        position: Position,
    },
    Closed {
        position: Position,
        reason: ExitReason,
    },
}

impl TradeEntry {
    pub fn position(&self) -> &Position {
        match self {
            TradeEntry::Opened { position } => position,
            TradeEntry::Closed { position, .. } => position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeHistory {
    records: Vec<TradeRecord>,
    next_seq: u64,
}

impl TradeHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_seq: 1,
        }
    }

    pub fn record_open(&mut self, timestamp: Timestamp, position: Position) {
        let seq = self.next_seq();
        self.records.push(TradeRecord {
            seq,
            timestamp,
            entry: TradeEntry::Opened { position },
        });
    }

    pub fn record_close(&mut self, timestamp: Timestamp, position: Position, reason: ExitReason) {
        let seq = self.next_seq();
        self.records.push(TradeRecord {
            seq,
            timestamp,
            entry: TradeEntry::Closed { position, reason },
        });
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn opened_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| matches!(record.entry, TradeEntry::Opened { .. }))
            .count()
    }

    pub fn closed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| matches!(record.entry, TradeEntry::Closed { .. }))
            .count()
    }

    fn next_seq(&mut self) -> TradeSeq {
        let seq = TradeSeq(self.next_seq);
        self.next_seq += 1;
        seq
    }
}

impl Default for TradeHistory {
    fn default() -> Self {
        Self::new()
    }
}
