//! hn-components: the closed set of hydraulic component variants.
//!
//! Each variant owns its parameters and per-tick state and implements the
//! small capability contract the engine relies on: an unconstrained supply
//! magnitude, variant-specific integration, a flat diagnostics snapshot,
//! and reset back to the configured initial state. Dispatch is a `match`
//! on the `Component` tag, not a trait-object chain.

pub mod common;
pub mod component;
pub mod drain;
pub mod error;
pub mod feed;
pub mod pipe;
pub mod pump;
pub mod sensor;
pub mod snapshot;
pub mod tank;
pub mod valve;

pub use common::Fluid;
pub use component::Component;
pub use drain::Drain;
pub use error::{ComponentError, ComponentResult};
pub use feed::Feed;
pub use pipe::{FlowRegime, Pipe};
pub use pump::{Cavitation, Pump, SpeedMode};
pub use sensor::Sensor;
pub use snapshot::{Snapshot, Value};
pub use tank::{Tank, TankStatus, ThermalParams};
pub use valve::Valve;
