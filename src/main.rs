//! Tick Book Simulation.
//!
//! Demonstrates the full engine lifecycle including tick validation,
//! excursion tracking, grouped trailing-stop exits, strategy dispatch,
//! and portfolio analytics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use tickbook::*;

fn main() {
    println!("Tick Book Engine Simulation");
    println!("Multi-Instrument, Multi-Strategy, Excursion-Based Exits\n");

    scenario_1_tick_pipeline();
    scenario_2_excursion_tracking();
    scenario_3_trailing_stop();
    scenario_4_grouped_exit();
    scenario_5_bad_input_and_failures();
    scenario_6_collector_to_engine();
    scenario_7_portfolio_analytics();

    println!("\nAll simulations completed successfully.");
}

fn record(symbol: &str, price: Decimal, ms: i64) -> TickRecord {
    TickRecord::new(Symbol::new(symbol), price, Timestamp::from_millis(ms))
}

/// Ticks flowing through the fixed pipeline with a momentum strategy attached.
fn scenario_1_tick_pipeline() {
    println!("Scenario 1: Tick Pipeline\n");

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
    engine.register_strategy(
        StrategyId::new("momentum"),
        Box::new(MomentumStrategy::new(
            Symbol::new("EURUSD"),
            3,
            Size::new_unchecked(dec!(1)),
        )),
    );

    let prices = [dec!(1.1000), dec!(1.1010), dec!(1.1025), dec!(1.1018), dec!(1.1030)];
    for (i, price) in prices.iter().enumerate() {
        let report = engine
            .process_tick(&record("EURUSD", *price, (i as i64 + 1) * 1000))
            .unwrap();
        println!(
            "  tick {} @ {}: opened {}, closed {}, book {}, net exposure {}",
            i + 1,
            price,
            report.opened.len(),
            report.closed.len(),
            report.metrics.total_positions,
            report.metrics.net_exposure
        );
    }

    println!("  Ticks processed: {}\n", engine.ticks_processed());
}

/// MFE ratchets up, MAE ratchets down, neither ever retreats.
fn scenario_2_excursion_tracking() {
    println!("Scenario 2: Excursion Tracking\n");

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.8)))).unwrap();
    engine.register_strategy(
        StrategyId::new("entry"),
        Box::new(OpenOnceOn::new(Symbol::new("EURUSD"), dec!(1))),
    );

    engine.process_tick(&record("EURUSD", dec!(100), 1000)).unwrap();
    let pos = &engine.active_positions()[0];
    println!("  Opened {} {} {} @ {}", pos.id, pos.side, pos.symbol, pos.entry_price);

    for (price, ms) in [(dec!(97), 2000), (dec!(103), 3000), (dec!(102), 4000)] {
        engine.process_tick(&record("EURUSD", price, ms)).unwrap();
        let pos = &engine.active_positions()[0];
        println!(
            "  @ {}: pnl {}, MFE {}, MAE {}",
            price,
            pos.unrealized_pnl().unwrap(),
            pos.max_favorable_excursion,
            pos.max_adverse_excursion
        );
    }

    println!();
}

/// A winner gives back too much of its peak and gets stopped out.
fn scenario_3_trailing_stop() {
    println!("Scenario 3: MFE Trailing Stop\n");

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
    engine.register_strategy(
        StrategyId::new("entry"),
        Box::new(OpenOnceOn::new(Symbol::new("EURUSD"), dec!(1))),
    );

    engine.process_tick(&record("EURUSD", dec!(100), 1000)).unwrap();
    engine.process_tick(&record("EURUSD", dec!(110), 2000)).unwrap();
    println!("  Long from 100, peak at 110: MFE 10, exit floor 5");

    let report = engine.process_tick(&record("EURUSD", dec!(104), 3000)).unwrap();
    let closed = &report.closed[0];
    let exit = closed.exit.unwrap();

    println!("  Pullback to 104 keeps only 4 of the peak, stop fires");
    println!("  Closed {} @ {} ({})", closed.id, exit.price, exit.reason);
    println!(
        "  Realized PnL: {}, best seen: {}",
        closed.realized_pnl().unwrap(),
        closed.max_favorable_excursion
    );
    println!(
        "  Trade history: {} opened, {} closed\n",
        engine.history().iter().filter(|r| matches!(r.entry, TradeEntry::Opened { .. })).count(),
        report.closed.len()
    );
}

/// All positions on an instrument share one fate.
fn scenario_4_grouped_exit() {
    println!("Scenario 4: Grouped Exit Across Strategies\n");

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
    engine.register_strategy(
        StrategyId::new("alpha"),
        Box::new(OpenOnceOn::new(Symbol::new("EURUSD"), dec!(1))),
    );
    engine.register_strategy(
        StrategyId::new("beta"),
        Box::new(OpenOnceOn::new(Symbol::new("EURUSD"), dec!(2))),
    );
    engine.register_strategy(
        StrategyId::new("gamma"),
        Box::new(OpenOnceOn::new(Symbol::new("USDJPY"), dec!(1))),
    );

    engine.process_tick(&record("EURUSD", dec!(100), 1000)).unwrap();
    engine.process_tick(&record("USDJPY", dec!(155), 1500)).unwrap();
    println!("  alpha and beta long EURUSD, gamma long USDJPY");

    engine.process_tick(&record("EURUSD", dec!(105), 2000)).unwrap();
    println!("  EURUSD rallies to 105: group MFE 15, floor 7.5");

    let report = engine.process_tick(&record("EURUSD", dec!(101), 3000)).unwrap();
    println!("  Fade to 101 leaves the group only 3, both EURUSD positions close:");
    for position in &report.closed {
        println!(
            "    {} ({}) realized {}",
            position.id,
            position.strategy_id,
            position.realized_pnl().unwrap()
        );
    }

    let survivors = engine.active_positions();
    println!(
        "  Untouched: {} {} position ({})\n",
        survivors.len(),
        survivors[0].symbol,
        survivors[0].strategy_id
    );
}

/// Malformed ticks and broken strategies are contained, never fatal.
fn scenario_5_bad_input_and_failures() {
    println!("Scenario 5: Bad Input and Strategy Failures\n");

    if let Err(error) = Engine::new(EngineConfig::new(RiskConfig::new(dec!(1.5)))) {
        println!("  Threshold 1.5 refused at construction: {error}");
    }

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
    engine.register_strategy(StrategyId::new("faulty"), Box::new(FaultyIndicator));
    engine.register_strategy(
        StrategyId::new("steady"),
        Box::new(OpenOnceOn::new(Symbol::new("EURUSD"), dec!(1))),
    );

    let mut broken = record("EURUSD", dec!(1.10), 1000);
    broken.price = None;
    if let Err(error) = engine.process_tick(&broken) {
        println!("  Tick rejected: {error}");
    }
    println!(
        "  Book untouched: {} positions, {} history records",
        engine.active_positions().len(),
        engine.history().len()
    );

    let report = engine.process_tick(&record("EURUSD", dec!(1.10), 2000)).unwrap();
    for failure in &report.strategy_failures {
        println!("  Strategy '{}' failed: {}", failure.strategy_id, failure.error);
    }
    println!(
        "  Healthy strategy still opened {} position(s)\n",
        report.opened.len()
    );
}

/// Terminal feed to collector to store to engine, end to end.
fn scenario_6_collector_to_engine() {
    println!("Scenario 6: Collector to Store to Engine\n");

    let collector = TickCollector::new(CollectorConfig::default()).unwrap();
    let watched: Vec<&str> = collector.config().symbols.iter().map(Symbol::as_str).collect();
    println!(
        "  Watching {:?}, poll interval {}ms (simulated)",
        watched,
        collector.config().poll_interval_ms
    );

    let mut feed = ScriptedFeed::new();
    // round one: every terminal has a quote
    feed.push(Symbol::new("EURUSD"), record("EURUSD", dec!(1.1000), 1_000));
    feed.push(Symbol::new("GBPUSD"), record("GBPUSD", dec!(1.2700), 1_000));
    feed.push(Symbol::new("USDJPY"), record("USDJPY", dec!(155.00), 1_000));
    // round two: GBPUSD goes silent and the USDJPY record arrives broken
    feed.push(Symbol::new("EURUSD"), record("EURUSD", dec!(1.1008), 61_000));
    let mut broken = record("USDJPY", dec!(155.10), 61_000);
    broken.timestamp = None;
    feed.push(Symbol::new("USDJPY"), broken);
    // round three: everyone is back
    feed.push(Symbol::new("EURUSD"), record("EURUSD", dec!(1.1015), 121_000));
    feed.push(Symbol::new("GBPUSD"), record("GBPUSD", dec!(1.2710), 121_000));
    feed.push(Symbol::new("USDJPY"), record("USDJPY", dec!(155.20), 121_000));

    let mut store = TickStore::new();
    for round in 1..=3 {
        let stats = collector.collect_once(&mut feed, &mut store);
        println!(
            "  Round {}: stored {}, skipped {}",
            round, stats.stored, stats.skipped
        );
    }

    let eurusd_history = store.tick_range(
        &Symbol::new("EURUSD"),
        Timestamp::from_millis(0),
        Timestamp::from_millis(121_000),
    );
    println!(
        "  Store holds {} ticks, {} of them EURUSD",
        store.len(),
        eurusd_history.len()
    );

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
    engine.register_strategy(
        StrategyId::new("momentum"),
        Box::new(MomentumStrategy::new(
            Symbol::new("EURUSD"),
            3,
            Size::new_unchecked(dec!(1)),
        )),
    );

    for stored in store.replay_all() {
        engine.process_tick(&stored).unwrap();
    }

    println!("  Replayed {} ticks into the engine", engine.ticks_processed());
    for position in engine.active_positions() {
        println!(
            "  Open: {} {} {} @ {}\n",
            position.id, position.side, position.symbol, position.entry_price
        );
    }
}

/// Two mirrored strategies plus a carry trade, with full analytics at the end.
fn scenario_7_portfolio_analytics() {
    println!("Scenario 7: Portfolio Analytics\n");

    let mut engine = Engine::new(EngineConfig::new(RiskConfig::new(dec!(0.5)))).unwrap();
    engine.register_strategy(
        StrategyId::new("trend"),
        Box::new(MomentumStrategy::new(
            Symbol::new("EURUSD"),
            3,
            Size::new_unchecked(dec!(1)),
        )),
    );
    engine.register_strategy(
        StrategyId::new("fade"),
        Box::new(FadeStrategy::new(Symbol::new("EURUSD"), 3, dec!(1))),
    );
    engine.register_strategy(
        StrategyId::new("carry"),
        Box::new(OpenOnceOn::new(Symbol::new("USDJPY"), dec!(1))),
    );

    let ticks = [
        ("EURUSD", dec!(100), 1_000),
        ("USDJPY", dec!(155.0), 1_500),
        ("EURUSD", dec!(101), 2_000),
        ("EURUSD", dec!(103), 3_000),
        ("EURUSD", dec!(102), 4_000),
        ("USDJPY", dec!(156.0), 4_500),
        ("EURUSD", dec!(105), 5_000),
        ("EURUSD", dec!(107), 6_000),
        ("EURUSD", dec!(103), 7_000),
        ("EURUSD", dec!(104), 8_000),
        ("USDJPY", dec!(154.0), 8_500),
        ("EURUSD", dec!(106), 9_000),
        ("EURUSD", dec!(109), 10_000),
        ("EURUSD", dec!(105), 11_000),
        ("USDJPY", dec!(155.5), 11_500),
        ("EURUSD", dec!(108), 12_000),
    ];

    let mut closes = 0;
    for (symbol, price, ms) in ticks {
        let report = engine.process_tick(&record(symbol, price, ms)).unwrap();
        closes += report.closed.len();
    }

    println!(
        "  {} ticks, {} trailing-stop closes, {} still open",
        engine.ticks_processed(),
        closes,
        engine.active_positions().len()
    );

    let analytics = engine.analytics();
    for name in ["trend", "fade", "carry"] {
        println!(
            "  {} realized: {}",
            name,
            analytics.realized_for(&StrategyId::new(name))
        );
    }
    println!("  Portfolio realized: {}", engine.realized_pnl());

    let metrics = engine.metrics();
    println!("  Max drawdown: {}", metrics.max_drawdown.unwrap());
    if let Some(matrix) = &metrics.strategy_correlation {
        let corr = matrix[&StrategyId::new("trend")][&StrategyId::new("fade")];
        println!("  Correlation trend vs fade: {corr:.2}");
    }
}

// local strategies for the simulation

/// Opens one long on the first tick of its instrument, then holds.
struct OpenOnceOn {
    symbol: Symbol,
    size: Size,
    fired: bool,
}

impl OpenOnceOn {
    fn new(symbol: Symbol, size: Decimal) -> Self {
        Self {
            symbol,
            size: Size::new_unchecked(size),
            fired: false,
        }
    }
}

impl Strategy for OpenOnceOn {
    fn evaluate(
        &mut self,
        tick: &Tick,
        _own: &[&Position],
    ) -> Result<Option<Signal>, StrategyError> {
        if self.fired || tick.instrument != self.symbol {
            return Ok(None);
        }
        self.fired = true;
        Ok(Some(Signal::buy(self.size)))
    }
}

/// Contrarian counterpart to the momentum reference: buys weakness, sells
/// strength, one position at a time.
struct FadeStrategy {
    symbol: Symbol,
    window_len: usize,
    size: Size,
    window: VecDeque<Decimal>,
}

impl FadeStrategy {
    fn new(symbol: Symbol, window_len: usize, size: Decimal) -> Self {
        Self {
            symbol,
            window_len,
            size: Size::new_unchecked(size),
            window: VecDeque::with_capacity(window_len),
        }
    }
}

impl Strategy for FadeStrategy {
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

        let mean: Decimal =
            self.window.iter().copied().sum::<Decimal>() / Decimal::from(self.window.len() as u64);
        let price = tick.price.value();
        if price < mean {
            Ok(Some(Signal::buy(self.size)))
        } else if price > mean {
            Ok(Some(Signal::sell(self.size)))
        } else {
            Ok(None)
        }
    }
}

/// A strategy whose indicator always blows up, for failure isolation demos.
struct FaultyIndicator;

impl Strategy for FaultyIndicator {
    fn evaluate(
        &mut self,
        _tick: &Tick,
        _own: &[&Position],
    ) -> Result<Option<Signal>, StrategyError> {
        Err(StrategyError::new("lookback buffer underflow"))
    }
}
