//! Drain: boundary sink out of the network.

use hn_graph::{Category, Meta};

use crate::snapshot::{put, Snapshot};

/// Absorbs whatever arrives, unconditionally. Has no outputs. Keeps a
/// running total of absorbed volume for diagnostics.
#[derive(Debug, Clone)]
pub struct Drain {
    pub meta: Meta,
    pub total_absorbed_m3: f64,
    last_inflow_m3s: f64,
}

impl Drain {
    pub fn new(id: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            meta: Meta::new(id, Category::Drain, inputs, vec![]),
            total_absorbed_m3: 0.0,
            last_inflow_m3s: 0.0,
        }
    }

    pub fn integrate(&mut self, dt_s: f64, inflow_m3s: f64) {
        self.last_inflow_m3s = inflow_m3s;
        if inflow_m3s.is_finite() {
            self.total_absorbed_m3 += inflow_m3s * dt_s;
        }
    }

    pub fn reset(&mut self) {
        self.total_absorbed_m3 = 0.0;
        self.last_inflow_m3s = 0.0;
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "inflow_m3s", self.last_inflow_m3s);
        put(&mut snap, "total_absorbed_m3", self.total_absorbed_m3);
        snap
    }
}
