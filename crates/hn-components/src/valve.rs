//! Valve: flow-limiting control element with first-order position
//! smoothing.

use hn_core::{clamp_unit, SNAP_EPSILON};
use hn_graph::{Category, Meta};

use crate::common::check_positive;
use crate::error::ComponentResult;
use crate::snapshot::{put, Snapshot};

/// Control valve. Position moves toward the commanded target at
/// `(target - position) / response_time` per second, snapping to the
/// target within `SNAP_EPSILON` to avoid asymptotic drift.
#[derive(Debug, Clone)]
pub struct Valve {
    pub meta: Meta,
    pub max_flow_m3s: f64,
    pub position: f64,
    pub target_position: f64,
    /// Seconds to traverse the full range.
    pub response_time_s: f64,
    initial_position: f64,
}

impl Valve {
    pub fn new(
        id: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        max_flow_m3s: f64,
        response_time_s: f64,
    ) -> ComponentResult<Self> {
        let max_flow_m3s = check_positive(max_flow_m3s, "valve max flow must be positive")?;
        Ok(Self {
            meta: Meta::new(id, Category::Valve, inputs, outputs),
            max_flow_m3s,
            position: 0.0,
            target_position: 0.0,
            response_time_s: response_time_s.max(0.0),
            initial_position: 0.0,
        })
    }

    pub fn with_position(mut self, position: f64) -> Self {
        let p = clamp_unit(position);
        self.position = p;
        self.target_position = p;
        self.initial_position = p;
        self
    }

    /// Command a new target position, clamped to [0, 1].
    pub fn set_target_position(&mut self, position: f64) {
        self.target_position = clamp_unit(position);
    }

    pub fn supply_m3s(&self) -> f64 {
        if self.meta.enabled {
            self.max_flow_m3s * self.position
        } else {
            0.0
        }
    }

    /// Move position toward the target.
    pub fn integrate(&mut self, dt_s: f64) {
        let error = self.target_position - self.position;
        if error.abs() <= SNAP_EPSILON {
            self.position = self.target_position;
            return;
        }
        if self.response_time_s <= 0.0 {
            // Instant-acting valve.
            self.position = self.target_position;
            return;
        }
        // The Euler step may not cross the target: a response time shorter
        // than dt would otherwise overshoot and oscillate.
        let mut step = (error / self.response_time_s) * dt_s;
        if step.abs() >= error.abs() {
            step = error;
        }
        self.position = clamp_unit(self.position + step);
        if (self.target_position - self.position).abs() <= SNAP_EPSILON {
            self.position = self.target_position;
        }
    }

    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.target_position = self.initial_position;
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "position", self.position);
        put(&mut snap, "target_position", self.target_position);
        put(&mut snap, "max_flow_m3s", self.max_flow_m3s);
        put(&mut snap, "supply_m3s", self.supply_m3s());
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valve() -> Valve {
        Valve::new("valve1", vec!["feed1".into()], vec!["tank1".into()], 0.8, 2.0).unwrap()
    }

    #[test]
    fn supply_scales_with_position() {
        let v = valve().with_position(0.5);
        assert!((v.supply_m3s() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn target_is_clamped() {
        let mut v = valve();
        v.set_target_position(1.2);
        assert_eq!(v.target_position, 1.0);
        v.set_target_position(-0.4);
        assert_eq!(v.target_position, 0.0);
    }

    #[test]
    fn position_approaches_target_and_snaps() {
        let mut v = valve();
        v.set_target_position(1.0);
        // First-order lag with tau = 2 s: clearly below target early on.
        for _ in 0..10 {
            v.integrate(0.1);
        }
        assert!(v.position > 0.3 && v.position < 1.0);
        // Long enough for the snap to engage.
        for _ in 0..300 {
            v.integrate(0.1);
        }
        assert_eq!(v.position, 1.0);
    }

    #[test]
    fn zero_response_time_acts_instantly() {
        let mut v = Valve::new("v", vec![], vec![], 0.8, 0.0).unwrap();
        v.set_target_position(0.7);
        v.integrate(0.01);
        assert_eq!(v.position, 0.7);
    }

    #[test]
    fn short_response_time_settles_without_overshoot() {
        // Response time below dt: the raw Euler step would jump past the
        // target every tick and oscillate between the clamps.
        let mut v = Valve::new("v", vec![], vec![], 0.8, 0.05).unwrap();
        v.set_target_position(0.5);
        v.integrate(0.1);
        assert_eq!(v.position, 0.5);
        v.integrate(0.1);
        assert_eq!(v.position, 0.5);
    }

    #[test]
    fn closing_moves_downward() {
        let mut v = valve().with_position(1.0);
        v.set_target_position(0.0);
        v.integrate(0.5);
        assert!(v.position < 1.0 && v.position > 0.0);
    }

    #[test]
    fn disabled_valve_supplies_nothing() {
        let mut v = valve().with_position(1.0);
        v.meta.enabled = false;
        assert_eq!(v.supply_m3s(), 0.0);
    }

    proptest! {
        #[test]
        fn position_always_in_unit_range(
            target in -2.0f64..3.0,
            start in 0.0f64..1.0,
            steps in 1usize..500,
        ) {
            let mut v = valve().with_position(start);
            v.set_target_position(target);
            for _ in 0..steps {
                v.integrate(0.1);
                prop_assert!((0.0..=1.0).contains(&v.position));
            }
        }
    }
}
