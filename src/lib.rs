// tickbook: tick-driven trading book engine.
// risk-first architecture: excursion tracking and the trailing stop take priority.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Symbol, StrategyId, Side, Price, Size, Quote
//   2.x  position.rs: position struct, pnl, excursion ratchets, close
//   3.x  history.rs: append-only trade audit log
//   4.x  registry.rs: active position set: open, mark-to-market, close
//   5.x  risk.rs: grouped MFE trailing stop evaluator
//   6.x  metrics.rs: point-in-time portfolio snapshot
//   7.x  analytics.rs: equity curve, drawdown, strategy correlation
//   8.x  config.rs: collector settings + shared config errors
//   9.x  engine/: core engine: tick pipeline, reports, runtime options
//   10.x tick.rs: raw tick records and validation (ingress)
//   11.x strategy.rs: Strategy trait, router, momentum reference
//   12.x store.rs: tick storage + replay (mocked)
//   13.x collector.rs: terminal polling (mocked)

// core trading modules
pub mod analytics;
pub mod engine;
pub mod history;
pub mod metrics;
pub mod position;
pub mod registry;
pub mod types;

// risk and strategy modules
pub mod risk;
pub mod strategy;

// integration modules
pub mod collector;
pub mod config;
pub mod store;
pub mod tick;

// re exports for convenience
pub use analytics::*;
pub use engine::*;
pub use history::*;
pub use metrics::*;
pub use position::*;
pub use registry::*;
pub use risk::*;
pub use strategy::*;
pub use types::*;
pub use collector::{CollectStats, QuoteFeed, ScriptedFeed, TickCollector};
pub use config::{CollectorConfig, ConfigError};
pub use store::{TickSource, TickStore};
pub use tick::{Tick, TickRecord, TickValidationError};
