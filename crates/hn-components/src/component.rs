//! The closed set of component variants.
//!
//! The engine stores every component as this tagged enum and dispatches by
//! matching on the tag. Integration is not part of the shared surface:
//! each variant takes different pre-read scalars, so the engine calls the
//! variant methods directly after destructuring.

use hn_graph::{HasMeta, Meta};

use crate::drain::Drain;
use crate::feed::Feed;
use crate::pipe::Pipe;
use crate::pump::Pump;
use crate::sensor::Sensor;
use crate::snapshot::Snapshot;
use crate::tank::Tank;
use crate::valve::Valve;

#[derive(Debug, Clone)]
pub enum Component {
    Feed(Feed),
    Drain(Drain),
    Tank(Tank),
    Pump(Pump),
    Valve(Valve),
    Pipe(Pipe),
    Sensor(Sensor),
}

impl HasMeta for Component {
    fn meta(&self) -> &Meta {
        match self {
            Component::Feed(c) => &c.meta,
            Component::Drain(c) => &c.meta,
            Component::Tank(c) => &c.meta,
            Component::Pump(c) => &c.meta,
            Component::Valve(c) => &c.meta,
            Component::Pipe(c) => &c.meta,
            Component::Sensor(c) => &c.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Component::Feed(c) => &mut c.meta,
            Component::Drain(c) => &mut c.meta,
            Component::Tank(c) => &mut c.meta,
            Component::Pump(c) => &mut c.meta,
            Component::Valve(c) => &mut c.meta,
            Component::Pipe(c) => &mut c.meta,
            Component::Sensor(c) => &mut c.meta,
        }
    }
}

impl Component {
    /// Unconstrained supply magnitude for this tick.
    ///
    /// Passive conductors and sinks supply nothing. For a pump this is the
    /// nominal flow only; the resolver applies the upstream-tank and
    /// downstream-valve constraints it alone can see.
    pub fn supply_m3s(&self) -> f64 {
        match self {
            Component::Feed(c) => c.supply_m3s(),
            Component::Valve(c) => c.supply_m3s(),
            Component::Pump(c) => c.nominal_flow_m3s(),
            Component::Tank(_)
            | Component::Drain(_)
            | Component::Pipe(_)
            | Component::Sensor(_) => 0.0,
        }
    }

    /// Re-initialize owned state to the configured initial values. The
    /// declared topology is untouched.
    pub fn reset(&mut self) {
        match self {
            Component::Feed(c) => c.reset(),
            Component::Drain(c) => c.reset(),
            Component::Tank(c) => c.reset(),
            Component::Pump(c) => c.reset(),
            Component::Valve(c) => c.reset(),
            Component::Pipe(c) => c.reset(),
            Component::Sensor(c) => c.reset(),
        }
    }

    /// Flat diagnostics record for external observers.
    pub fn snapshot(&self) -> Snapshot {
        match self {
            Component::Feed(c) => c.snapshot(),
            Component::Drain(c) => c.snapshot(),
            Component::Tank(c) => c.snapshot(),
            Component::Pump(c) => c.snapshot(),
            Component::Valve(c) => c.snapshot(),
            Component::Pipe(c) => c.snapshot(),
            Component::Sensor(c) => c.snapshot(),
        }
    }

    /// Temperature this component exposes to downstream thermal tanks.
    pub fn exposed_temperature_c(&self) -> Option<f64> {
        match self {
            Component::Feed(c) => c.temperature_c,
            Component::Tank(c) => c.temperature_c(),
            _ => None,
        }
    }

    pub fn as_tank(&self) -> Option<&Tank> {
        match self {
            Component::Tank(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_valve(&self) -> Option<&Valve> {
        match self {
            Component::Valve(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_pump(&self) -> Option<&Pump> {
        match self {
            Component::Pump(c) => Some(c),
            _ => None,
        }
    }
}
