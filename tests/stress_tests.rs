//! Engine invariant tests.
//!
//! These tests verify invariants that must hold for the book to stay
//! consistent under any tick stream: random streams over a small universe
//! of instruments, with re-entering strategies churning positions.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use tickbook::*;

const SYMBOLS: [&str; 3] = ["EURUSD", "GBPUSD", "USDJPY"];

/// Re-enters a fresh long whenever it holds nothing on its instrument, so a
/// long stream keeps positions churning through open and close.
struct Reentrant {
    symbol: Symbol,
    size: Size,
}

impl Reentrant {
    fn new(symbol: &str, size: Decimal) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            size: Size::new_unchecked(size),
        }
    }
}

impl tickbook::Strategy for Reentrant {
    fn evaluate(
        &mut self,
        tick: &Tick,
        own_positions: &[&Position],
    ) -> Result<Option<Signal>, StrategyError> {
        if tick.instrument != self.symbol || !own_positions.is_empty() {
            return Ok(None);
        }
        Ok(Some(Signal::buy(self.size)))
    }
}

fn engine_with_reentrants(threshold: Decimal) -> Engine {
    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(threshold))).unwrap();
    for symbol in SYMBOLS {
        engine.register_strategy(
            StrategyId::new(format!("hold-{symbol}")),
            Box::new(Reentrant::new(symbol, dec!(1))),
        );
    }
    engine
}

// Strategies for generating test data
fn stream_strategy() -> impl proptest::strategy::Strategy<Value = Vec<TickRecord>> {
    proptest::collection::vec((0usize..3, 1i64..1_000_000i64), 1..120).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (symbol, price))| {
                TickRecord::new(
                    Symbol::new(SYMBOLS[symbol]),
                    Decimal::new(price, 2),
                    Timestamp::from_millis(i as i64 * 1_000),
                )
            })
            .collect()
    })
}

fn threshold_strategy() -> impl proptest::strategy::Strategy<Value = Decimal> {
    (1i64..=100i64).prop_map(|x| Decimal::new(x, 2)) // 0.01 to 1.00
}

proptest! {
    /// The ledger balances: opens minus closes equals the live book, and
    /// sequence numbers and position ids never repeat or go backwards.
    #[test]
    fn audit_trail_balances(
        stream in stream_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut engine = engine_with_reentrants(threshold);
        for record in &stream {
            engine.process_tick(record).unwrap();
        }

        let history = engine.history();
        let opened: Vec<u64> = history
            .iter()
            .filter_map(|r| match &r.entry {
                TradeEntry::Opened { position } => Some(position.id.0),
                TradeEntry::Closed { .. } => None,
            })
            .collect();
        let closed_count = history.len() - opened.len();

        prop_assert_eq!(
            opened.len() - closed_count,
            engine.active_positions().len(),
            "ledger does not balance: {} opened, {} closed, {} active",
            opened.len(),
            closed_count,
            engine.active_positions().len()
        );

        for pair in history.windows(2) {
            prop_assert!(pair[0].seq < pair[1].seq, "sequence went backwards");
        }
        for pair in opened.windows(2) {
            prop_assert!(pair[0] < pair[1], "position id {} reused", pair[1]);
        }

        prop_assert_eq!(engine.ticks_processed(), stream.len() as u64);
        prop_assert_eq!(engine.analytics().sample_count(), stream.len());
    }

    /// A closed position never reappears in the active set.
    #[test]
    fn closed_positions_never_return(
        stream in stream_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut engine = engine_with_reentrants(threshold);
        let mut retired: HashSet<u64> = HashSet::new();

        for record in &stream {
            let report = engine.process_tick(record).unwrap();
            for closed in &report.closed {
                prop_assert!(closed.exit.is_some(), "closed without an exit: {}", closed.id);
                retired.insert(closed.id.0);
            }
            for pos in engine.active_positions() {
                prop_assert!(
                    !retired.contains(&pos.id.0),
                    "position {} came back after closing",
                    pos.id
                );
            }
        }
    }

    /// Two engines fed the same stream agree tick for tick and at the end.
    #[test]
    fn engine_runs_are_deterministic(
        stream in stream_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut first = engine_with_reentrants(threshold);
        let mut second = engine_with_reentrants(threshold);

        let reports_a: Vec<TickReport> = stream
            .iter()
            .map(|record| first.process_tick(record).unwrap())
            .collect();
        let reports_b: Vec<TickReport> = stream
            .iter()
            .map(|record| second.process_tick(record).unwrap())
            .collect();

        prop_assert_eq!(reports_a, reports_b);
        prop_assert_eq!(first.realized_pnl(), second.realized_pnl());
        prop_assert_eq!(first.history(), second.history());
        prop_assert_eq!(first.metrics(), second.metrics());
    }

    /// A position's mark always equals the latest price of its own
    /// instrument; ticks for other instruments never touch it.
    #[test]
    fn instruments_stay_isolated(
        stream in stream_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut engine = engine_with_reentrants(threshold);
        let mut last_price: HashMap<Symbol, Decimal> = HashMap::new();

        for record in &stream {
            engine.process_tick(record).unwrap();
            let tick = record.validate().unwrap();
            last_price.insert(tick.instrument.clone(), tick.price.value());

            for pos in engine.active_positions() {
                if let Some(current) = pos.current_price {
                    prop_assert_eq!(
                        current.value(),
                        last_price[&pos.symbol],
                        "stale or foreign mark on {}",
                        pos.id
                    );
                }
            }
        }
    }

    /// The equity curve always ends at realized plus current unrealized.
    #[test]
    fn equity_curve_tracks_realized_plus_unrealized(
        stream in stream_strategy(),
        threshold in threshold_strategy(),
    ) {
        let mut engine = engine_with_reentrants(threshold);
        for record in &stream {
            engine.process_tick(record).unwrap();
        }

        let curve = engine.analytics().equity_curve();
        prop_assert_eq!(curve.len(), stream.len());
        for (i, point) in curve.iter().enumerate() {
            prop_assert_eq!(point.timestamp.as_millis(), i as i64 * 1_000);
        }

        let unrealized: Decimal = engine
            .active_positions()
            .iter()
            .filter_map(|pos| pos.unrealized_pnl())
            .map(|q| q.value())
            .sum();
        let expected = engine.realized_pnl().value() + unrealized;
        prop_assert_eq!(curve.last().unwrap().equity.value(), expected);
    }
}

/// Non-proptest long-run scenarios.
#[cfg(test)]
mod long_run_tests {
    use super::*;

    // deterministic wave per instrument: 25 steps up, 15 steeper steps down
    fn wave_price(step: i64) -> Decimal {
        let phase = step % 40;
        let offset = if phase < 25 {
            phase * 4
        } else {
            100 - (phase - 25) * 6
        };
        dec!(1000) + Decimal::from(offset)
    }

    #[test]
    fn trailing_stops_fire_over_a_long_oscillating_run() {
        let mut engine = engine_with_reentrants(dec!(0.5));

        let mut closes = 0usize;
        for i in 0i64..3_000 {
            let symbol = SYMBOLS[(i % 3) as usize];
            let record = TickRecord::new(
                Symbol::new(symbol),
                wave_price(i / 3),
                Timestamp::from_millis(i * 1_000),
            );
            let report = engine.process_tick(&record).unwrap();

            closes += report.closed.len();
            for closed in &report.closed {
                assert_eq!(closed.exit.unwrap().reason, ExitReason::MfeTrailingStop);
            }
        }

        assert!(closes > 0, "the wave never tripped the stop");
        // one re-entering long per instrument, so the book stays bounded
        assert_eq!(engine.active_positions().len(), 3);
        assert_eq!(engine.ticks_processed(), 3_000);
        assert_eq!(engine.analytics().sample_count(), 3_000);

        let history = engine.history();
        let opened = history
            .iter()
            .filter(|r| matches!(r.entry, TradeEntry::Opened { .. }))
            .count();
        assert_eq!(opened, closes + 3);

        let metrics = engine.metrics();
        assert_eq!(metrics.total_positions, 3);
        assert!(metrics.max_drawdown.is_some());
    }

    #[test]
    fn a_crowded_group_churns_all_or_nothing() {
        // ten independent strategies all riding the same instrument form one
        // exit group: every close takes all ten, every reopen restores them
        let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
        for n in 0..10 {
            engine.register_strategy(
                StrategyId::new(format!("rider-{n}")),
                Box::new(Reentrant::new("EURUSD", dec!(1))),
            );
        }

        for i in 0i64..1_000 {
            let record = TickRecord::new(
                Symbol::new("EURUSD"),
                wave_price(i),
                Timestamp::from_millis(i * 1_000),
            );
            let report = engine.process_tick(&record).unwrap();
            assert!(
                report.closed.is_empty() || report.closed.len() == 10,
                "partial group close at tick {}: {} positions",
                i,
                report.closed.len()
            );
            if !report.closed.is_empty() {
                assert_eq!(report.opened.len(), 10);
            }
        }

        assert_eq!(engine.active_positions().len(), 10);

        // ids never collide across the churn
        let mut seen = HashSet::new();
        for record in engine.history() {
            if let TradeEntry::Opened { position } = &record.entry {
                assert!(seen.insert(position.id.0), "id {} reused", position.id);
            }
        }
    }
}
