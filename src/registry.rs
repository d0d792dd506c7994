// 4.0: the active position set. single writer: every open, mark-to-market and close
// goes through here. opens and closes append to the trade history handed in by the
// caller, and the history is only touched after the mutation is known to be legal.

use crate::history::TradeHistory;
use crate::position::{ExitReason, Position};
use crate::tick::Tick;
use crate::types::{PositionId, Side, Size, StrategyId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("position {0} is not in the active set")]
    PositionNotActive(PositionId),
}

#[derive(Debug, Clone)]
pub struct PositionRegistry {
    active: Vec<Position>,
    next_position_id: u64,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            next_position_id: 1,
        }
    }

    // 4.1: open at the tick's price and time. ids are handed out in order, so two runs
    // over the same tick sequence produce the same ids.
    pub fn open(
        &mut self,
        strategy_id: StrategyId,
        tick: &Tick,
        side: Side,
        size: Size,
        history: &mut TradeHistory,
    ) -> PositionId {
        let id = self.next_id();
        let position = Position::open(
            id,
            tick.instrument.clone(),
            strategy_id,
            side,
            size,
            tick.price,
            tick.timestamp,
        );

        history.record_open(tick.timestamp, position.clone());
        self.active.push(position);
        id
    }

    // 4.2: mark every active position on the tick's instrument. other instruments
    // keep their last observed price.
    pub fn update_all(&mut self, tick: &Tick) {
        for position in self
            .active
            .iter_mut()
            .filter(|position| position.symbol == tick.instrument)
        {
            position.mark(tick.price);
        }
    }

    // 4.3: close at the tick's price and time, remove from the active set keeping the
    // order of the rest, return the closed snapshot. an id that is not active is an
    // illegal state and leaves the history untouched.
    pub fn close(
        &mut self,
        id: PositionId,
        tick: &Tick,
        reason: ExitReason,
        history: &mut TradeHistory,
    ) -> Result<Position, RegistryError> {
        let index = self
            .active
            .iter()
            .position(|position| position.id == id)
            .ok_or(RegistryError::PositionNotActive(id))?;

        let mut position = self.active.remove(index);
        position.close(tick.price, tick.timestamp, reason);
        history.record_close(tick.timestamp, position.clone(), reason);
        Ok(position)
    }

    pub fn active_positions(&self) -> &[Position] {
        &self.active
    }

    pub fn positions_for(&self, strategy_id: &StrategyId) -> Vec<&Position> {
        self.active
            .iter()
            .filter(|position| &position.strategy_id == strategy_id)
            .collect()
    }

    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.active.iter().find(|position| position.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn next_id(&mut self) -> PositionId {
        let id = PositionId(self.next_position_id);
        self.next_position_id += 1;
        id
    }
}

impl Default for PositionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
