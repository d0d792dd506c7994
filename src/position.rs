// 2.0: position lifecycle + excursion tracking. pnl = (current - entry) * sign * size.
// MFE only ratchets up, MAE only ratchets down. 2.2 has the close transition.

use crate::types::{Price, PositionId, Quote, Side, Size, StrategyId, Symbol, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// why a position left the book. strategy-originated closes would extend this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    MfeTrailingStop,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::MfeTrailingStop => write!(f, "MFE_TRAILING_STOP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionExit {
    pub price: Price,
    pub time: Timestamp,
    pub reason: ExitReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: Symbol,
    pub strategy_id: StrategyId,
    pub side: Side,
    pub size: Size,
    pub entry_price: Price,
    pub entry_time: Timestamp,
    pub current_price: Option<Price>,
    pub max_favorable_excursion: Quote,
    pub max_adverse_excursion: Quote,
    pub exit: Option<PositionExit>,
}

impl Position {
    pub fn open(
        id: PositionId,
        symbol: Symbol,
        strategy_id: StrategyId,
        side: Side,
        size: Size,
        entry_price: Price,
        entry_time: Timestamp,
    ) -> Self {
        Self {
            id,
            symbol,
            strategy_id,
            side,
            size,
            entry_price,
            entry_time,
            current_price: None,
            max_favorable_excursion: Quote::zero(),
            max_adverse_excursion: Quote::zero(),
            exit: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    // 2.1: paper gains/losses at an arbitrary price
    pub fn pnl_at(&self, price: Price) -> Quote {
        let pnl =
            (price.value() - self.entry_price.value()) * self.side.sign() * self.size.value();
        Quote::new(pnl)
    }

    // None until the position has seen a tick on its own instrument
    pub fn unrealized_pnl(&self) -> Option<Quote> {
        self.current_price.map(|price| self.pnl_at(price))
    }

    // signed size in base units. longs positive, shorts negative
    pub fn exposure(&self) -> Decimal {
        self.side.sign() * self.size.value()
    }

    // mark to the latest trade price and ratchet the excursions
    pub fn mark(&mut self, price: Price) {
        debug_assert!(self.is_open(), "closed positions never move");

        self.current_price = Some(price);
        let pnl = self.pnl_at(price);
        self.max_favorable_excursion = self.max_favorable_excursion.max(pnl);
        self.max_adverse_excursion = self.max_adverse_excursion.min(pnl);
    }

    // 2.2: one way transition. exit fields are set exactly once.
    pub fn close(&mut self, price: Price, time: Timestamp, reason: ExitReason) {
        debug_assert!(self.is_open(), "position closed twice");
        self.exit = Some(PositionExit {
            price,
            time,
            reason,
        });
    }

    pub fn realized_pnl(&self) -> Option<Quote> {
        self.exit.as_ref().map(|exit| self.pnl_at(exit.price))
    }
}
