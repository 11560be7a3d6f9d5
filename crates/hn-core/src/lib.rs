//! hn-core: stable foundation for hydronet.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (float helpers + tolerances)
//! - clock (wall-clock tick source with dt clamping and pause/stop)

pub mod clock;
pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use clock::{ClockState, SimulationClock};
pub use error::{CoreError, CoreResult};
pub use numeric::*;
