// 9.0: core tick engine. coordinates tick validation, position marking,
// exit evaluation, strategy dispatch, and portfolio reporting.
// deterministic and tick-driven with no external I/O.

mod config;
mod core;
mod pipeline;
mod results;

pub use config::EngineConfig;
pub use core::Engine;
pub use results::{EngineError, TickReport};
