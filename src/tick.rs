// Tick Ingress
//
// This module defines the raw tick record as delivered by a collector or
// terminal feed, and the validated form the engine pipeline runs on. Raw
// records are loosely typed because upstream sources drop fields; validation
// is the only way to obtain a `Tick`, so everything downstream can rely on
// instrument, price and timestamp being present and well formed.

use crate::types::{Price, Symbol, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw tick as received from a data source. Every field is optional;
/// absence means the source did not supply it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickRecord {
    pub instrument: Option<Symbol>,
    pub price: Option<Decimal>,
    pub timestamp: Option<Timestamp>,
    pub volume: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
}

impl TickRecord {
    pub fn new(instrument: Symbol, price: Decimal, timestamp: Timestamp) -> Self {
        Self {
            instrument: Some(instrument),
            price: Some(price),
            timestamp: Some(timestamp),
            volume: None,
            bid: None,
            ask: None,
        }
    }

    pub fn with_quote(mut self, bid: Decimal, ask: Decimal) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Check the record field by field and build the validated tick.
    /// Fails on the first missing or malformed required field; optional
    /// bid/ask values that are not positive are dropped rather than rejected.
    pub fn validate(&self) -> Result<Tick, TickValidationError> {
        let instrument = match &self.instrument {
            Some(symbol) if !symbol.is_empty() => symbol.clone(),
            _ => return Err(TickValidationError::MissingInstrument),
        };

        let raw_price = self.price.ok_or(TickValidationError::MissingPrice)?;
        let price =
            Price::new(raw_price).ok_or(TickValidationError::NonPositivePrice(raw_price))?;

        let timestamp = self.timestamp.ok_or(TickValidationError::MissingTimestamp)?;

        Ok(Tick {
            instrument,
            price,
            timestamp,
            volume: self.volume,
            bid: self.bid.and_then(Price::new),
            ask: self.ask.and_then(Price::new),
        })
    }
}

/// A validated market observation. Construction goes through
/// [`TickRecord::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: Symbol,
    pub price: Price,
    pub timestamp: Timestamp,
    pub volume: Option<Decimal>,
    pub bid: Option<Price>,
    pub ask: Option<Price>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TickValidationError {
    #[error("tick is missing required field 'instrument'")]
    MissingInstrument,
    #[error("tick is missing required field 'price'")]
    MissingPrice,
    #[error("tick is missing required field 'timestamp'")]
    MissingTimestamp,
    #[error("tick price {0} is not positive")]
    NonPositivePrice(Decimal),
}
