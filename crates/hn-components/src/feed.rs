//! Feed: boundary supply into the network.

use hn_graph::{Category, Meta};

use crate::snapshot::{put, Snapshot};

/// Unconditional supply boundary. Has no inputs; supplies `max_flow_m3s`
/// to its outputs while available, nothing otherwise. `max_flow_m3s` may
/// be unbounded (`f64::INFINITY`) for feeds that only exist to saturate a
/// downstream valve.
#[derive(Debug, Clone)]
pub struct Feed {
    pub meta: Meta,
    pub max_flow_m3s: f64,
    pub available: bool,
    /// Temperature this feed exposes to downstream thermal tanks, if any.
    pub temperature_c: Option<f64>,
    initial_available: bool,
}

impl Feed {
    pub fn new(id: impl Into<String>, outputs: Vec<String>, max_flow_m3s: f64) -> Self {
        let max_flow_m3s = if max_flow_m3s.is_nan() {
            0.0
        } else {
            max_flow_m3s.max(0.0)
        };
        Self {
            meta: Meta::new(id, Category::Feed, vec![], outputs),
            max_flow_m3s,
            available: true,
            temperature_c: None,
            initial_available: true,
        }
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self.initial_available = available;
        self
    }

    pub fn with_temperature_c(mut self, temperature_c: f64) -> Self {
        self.temperature_c = Some(temperature_c);
        self
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn supply_m3s(&self) -> f64 {
        if self.meta.enabled && self.available {
            self.max_flow_m3s
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.available = self.initial_available;
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "available", self.available);
        put(&mut snap, "max_flow_m3s", self.max_flow_m3s);
        if let Some(t) = self.temperature_c {
            put(&mut snap, "temperature_c", t);
        }
        snap
    }
}
