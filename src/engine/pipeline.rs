//! Tick processing. One fixed pipeline, same order every tick.

use super::core::Engine;
use super::results::{EngineError, TickReport};
use crate::tick::TickRecord;

impl Engine {
    /// Run one tick through the book:
    ///
    /// 1. validate the raw record
    /// 2. mark positions on the tick's instrument
    /// 3. evaluate exit rules on the updated book
    /// 4. close every flagged position, in flag order
    /// 5. dispatch the tick to strategies, registration order
    /// 6. open a position per signal, dispatch order
    /// 7. sample the analytics series
    /// 8. snapshot portfolio metrics
    ///
    /// The order is load bearing: exits see this tick's excursions, and a
    /// position opened in step 6 cannot be closed by step 4 of the same tick.
    pub fn process_tick(&mut self, record: &TickRecord) -> Result<TickReport, EngineError> {
        // nothing runs on an invalid record. state is untouched on failure.
        let tick = record.validate()?;

        self.registry.update_all(&tick);

        let exit_signals = self.exits.evaluate(self.registry.active_positions());
        let mut closed = Vec::with_capacity(exit_signals.len());
        for signal in exit_signals {
            let position = self.registry.close(
                signal.position_id,
                &tick,
                signal.reason,
                &mut self.history,
            )?;
            self.analytics.record_close(&position);

            if self.config.verbose {
                println!(
                    "[close] {} {} {} @ {} ({})",
                    position.id, position.side, position.symbol, tick.price, signal.reason
                );
            }
            closed.push(position);
        }

        let dispatch = self.router.dispatch(&tick, &self.registry);

        let mut opened = Vec::with_capacity(dispatch.signals.len());
        for (strategy_id, signal) in dispatch.signals {
            let side = signal.action.side();
            let id = self.registry.open(
                strategy_id.clone(),
                &tick,
                side,
                signal.size,
                &mut self.history,
            );

            if self.config.verbose {
                println!(
                    "[open] {} {} {} x{} @ {} ({})",
                    id, side, tick.instrument, signal.size, tick.price, strategy_id
                );
            }
            opened.push(id);
        }

        self.analytics
            .record_sample(tick.timestamp, self.registry.active_positions());
        self.ticks_processed += 1;

        let metrics = self
            .metrics
            .snapshot_with_analytics(self.registry.active_positions(), &self.analytics);

        Ok(TickReport {
            instrument: tick.instrument,
            timestamp: tick.timestamp,
            metrics,
            closed,
            opened,
            strategy_failures: dispatch.failures,
        })
    }
}
