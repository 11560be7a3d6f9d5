//! hn-sim: flow resolution and state integration for hydronet.
//!
//! The per-tick control flow is: clock computes dt -> `resolve` rebuilds
//! the flow-edge map in fixed category order -> every enabled component
//! integrates its state from dt and the flows it can read back -> external
//! observers pull snapshots. `Engine` orchestrates all of it.

pub mod engine;
pub mod error;
pub mod resolver;
pub mod runner;

pub use engine::{Engine, Settings};
pub use error::{SimError, SimResult};
pub use resolver::{resolve, EVALUATION_ORDER};
pub use runner::{run, RealtimeDriver, RunOptions, RunRecord};
