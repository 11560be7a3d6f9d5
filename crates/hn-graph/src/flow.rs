//! Per-tick flow-edge map.
//!
//! Edges are keyed by the ordered (from, to) id pair and rebuilt from
//! scratch every tick; no edge persists across ticks. A `BTreeMap` keeps
//! both iteration and floating-point summation order deterministic, which
//! is what makes identical runs produce bit-identical trajectories.

use std::collections::BTreeMap;

/// Directed, per-tick scalar flow values between component ids.
#[derive(Debug, Clone, Default)]
pub struct FlowMap {
    edges: BTreeMap<(String, String), f64>,
}

impl FlowMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all edges; called at the start of every resolve pass.
    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Write the flow on (from, to), replacing any value written earlier
    /// this tick.
    pub fn set(&mut self, from: &str, to: &str, flow_m3s: f64) {
        self.edges
            .insert((from.to_owned(), to.to_owned()), flow_m3s);
    }

    /// Instantaneous flow on (from, to); 0 if the edge was not written.
    pub fn between(&self, from: &str, to: &str) -> f64 {
        self.edges
            .get(&(from.to_owned(), to.to_owned()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of all flow arriving at `id`.
    pub fn aggregate_in(&self, id: &str) -> f64 {
        self.edges
            .iter()
            .filter(|((_, to), _)| to == id)
            .map(|(_, q)| q)
            .sum()
    }

    /// Sum of all flow leaving `id`.
    pub fn aggregate_out(&self, id: &str) -> f64 {
        self.edges
            .iter()
            .filter(|((from, _), _)| from == id)
            .map(|(_, q)| q)
            .sum()
    }

    /// Remove every edge that mentions `id` on either end.
    pub fn remove_mentions(&mut self, id: &str) {
        self.edges.retain(|(from, to), _| from != id && to != id);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate edges in deterministic (from, to) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.edges
            .iter()
            .map(|((from, to), q)| (from.as_str(), to.as_str(), *q))
    }
}
