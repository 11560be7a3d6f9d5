//! Flow sensor: rolling average, totalizer, and range alarm.

use std::collections::VecDeque;

use hn_graph::{Category, Meta};

use crate::error::{ComponentError, ComponentResult};
use crate::snapshot::{put, Snapshot};

/// Read-only instrument on an edge. Never produces flow; derives a
/// percent-of-range reading, a rolling average over a configurable sample
/// window, a cumulative totalizer, and an out-of-range alarm flag.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub meta: Meta,
    pub range_low_m3s: f64,
    pub range_high_m3s: f64,
    pub window: usize,
    samples: VecDeque<f64>,
    pub last_flow_m3s: f64,
    /// Percent of range; retained on a zero-range configuration rather
    /// than dividing by zero.
    pub reading_pct: f64,
    pub rolling_avg_m3s: f64,
    pub totalizer_m3: f64,
    pub alarm: bool,
}

impl Sensor {
    pub fn new(
        id: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        range_low_m3s: f64,
        range_high_m3s: f64,
        window: usize,
    ) -> ComponentResult<Self> {
        if range_high_m3s < range_low_m3s {
            return Err(ComponentError::InvalidArg {
                what: "sensor range high must not be below range low",
            });
        }
        Ok(Self {
            meta: Meta::new(id, Category::Sensor, inputs, outputs),
            range_low_m3s,
            range_high_m3s,
            window: window.max(1),
            samples: VecDeque::new(),
            last_flow_m3s: 0.0,
            reading_pct: 0.0,
            rolling_avg_m3s: 0.0,
            totalizer_m3: 0.0,
            alarm: false,
        })
    }

    pub fn integrate(&mut self, dt_s: f64, flow_m3s: f64) {
        if !flow_m3s.is_finite() {
            return;
        }
        self.last_flow_m3s = flow_m3s;
        self.totalizer_m3 += flow_m3s * dt_s;

        let span = self.range_high_m3s - self.range_low_m3s;
        if span > 0.0 {
            self.reading_pct = (flow_m3s - self.range_low_m3s) / span * 100.0;
        }

        self.samples.push_back(flow_m3s);
        while self.samples.len() > self.window {
            self.samples.pop_front();
        }
        self.rolling_avg_m3s = self.samples.iter().sum::<f64>() / self.samples.len() as f64;

        self.alarm = flow_m3s < self.range_low_m3s || flow_m3s > self.range_high_m3s;
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_flow_m3s = 0.0;
        self.reading_pct = 0.0;
        self.rolling_avg_m3s = 0.0;
        self.totalizer_m3 = 0.0;
        self.alarm = false;
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "flow_m3s", self.last_flow_m3s);
        put(&mut snap, "reading_pct", self.reading_pct);
        put(&mut snap, "rolling_avg_m3s", self.rolling_avg_m3s);
        put(&mut snap, "totalizer_m3", self.totalizer_m3);
        put(&mut snap, "alarm", self.alarm);
        snap
    }
}
