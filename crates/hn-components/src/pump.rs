//! Pump: capacity-limited mover with speed modes and a cavitation state
//! machine.
//!
//! The pump only computes its *nominal* flow here. The actual per-tick
//! output additionally depends on the upstream tank's live volume and the
//! downstream valve's live position, which only the flow resolver can see;
//! that constraint logic lives in `hn-sim`.

use hn_core::clamp_unit;
use hn_graph::{Category, Meta};
use tracing::warn;

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};
use crate::snapshot::{put, Snapshot};

/// Speed-mode sub-variant.
///
/// A fixed-speed pump is the simplest variant and the safe default when a
/// configuration names an unknown kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    #[default]
    FixedSpeed,
    VariableSpeed,
}

/// Cavitation cycle: Normal -> Triggered -> Active -> Normal.
///
/// - Timed trigger: activates once `elapsed_run_s` reaches `trigger_time_s`.
/// - Instant trigger (`trigger_time_s == None`): activates immediately on
///   start, once per start.
/// - Active ends after `duration_s` seconds, unconditionally; the run timer
///   restarts so a timed trigger cycles.
/// - Stopping the pump resets the machine to Normal.
#[derive(Debug, Clone)]
pub struct Cavitation {
    pub enabled: bool,
    pub trigger_time_s: Option<f64>,
    pub duration_s: f64,
    /// Multiplier applied to nominal flow while active.
    pub flow_reduction: f64,
    active: bool,
    elapsed_run_s: f64,
    active_elapsed_s: f64,
}

impl Cavitation {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            trigger_time_s: None,
            duration_s: 0.0,
            flow_reduction: 1.0,
            active: false,
            elapsed_run_s: 0.0,
            active_elapsed_s: 0.0,
        }
    }

    pub fn timed(trigger_time_s: f64, duration_s: f64, flow_reduction: f64) -> Self {
        Self {
            enabled: true,
            trigger_time_s: Some(trigger_time_s.max(0.0)),
            duration_s: duration_s.max(0.0),
            flow_reduction: clamp_unit(flow_reduction),
            active: false,
            elapsed_run_s: 0.0,
            active_elapsed_s: 0.0,
        }
    }

    pub fn instant(duration_s: f64, flow_reduction: f64) -> Self {
        Self {
            trigger_time_s: None,
            ..Self::timed(0.0, duration_s, flow_reduction)
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed_run_s(&self) -> f64 {
        self.elapsed_run_s
    }

    fn on_start(&mut self) {
        if self.enabled && self.trigger_time_s.is_none() {
            self.active = true;
            self.active_elapsed_s = 0.0;
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.elapsed_run_s = 0.0;
        self.active_elapsed_s = 0.0;
    }

    fn advance(&mut self, dt_s: f64) {
        if !self.enabled {
            return;
        }
        self.elapsed_run_s += dt_s;

        if !self.active {
            match self.trigger_time_s {
                Some(trigger) if self.elapsed_run_s >= trigger => {
                    self.active = true;
                    self.active_elapsed_s = 0.0;
                }
                _ => {}
            }
        }

        if self.active {
            self.active_elapsed_s += dt_s;
            if self.active_elapsed_s >= self.duration_s {
                self.active = false;
                self.active_elapsed_s = 0.0;
                // Restart the run timer so a timed trigger cycles instead
                // of re-firing on the next tick.
                self.elapsed_run_s = 0.0;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pump {
    pub meta: Meta,
    pub capacity_m3s: f64,
    pub efficiency: f64,
    pub speed: f64,
    pub running: bool,
    /// Minimum upstream tank level required to operate.
    pub requires_min_level: f64,
    pub mode: SpeedMode,
    pub cavitation: Cavitation,
    pub run_time_s: f64,
}

impl Pump {
    pub fn new(
        id: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        capacity_m3s: f64,
        efficiency: f64,
    ) -> ComponentResult<Self> {
        let capacity_m3s = check_positive(capacity_m3s, "pump capacity must be positive")?;
        if !(efficiency > 0.0 && efficiency <= 1.0) {
            return Err(ComponentError::InvalidArg {
                what: "pump efficiency must be in (0, 1]",
            });
        }
        Ok(Self {
            meta: Meta::new(id, Category::Pump, inputs, outputs),
            capacity_m3s,
            efficiency,
            speed: 1.0,
            running: false,
            requires_min_level: 0.0,
            mode: SpeedMode::default(),
            cavitation: Cavitation::disabled(),
            run_time_s: 0.0,
        })
    }

    pub fn with_mode(mut self, mode: SpeedMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_level(mut self, level: f64) -> Self {
        self.requires_min_level = clamp_unit(level);
        self
    }

    pub fn with_cavitation(mut self, cavitation: Cavitation) -> Self {
        self.cavitation = cavitation;
        self
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.cavitation.on_start();
        }
    }

    /// Stop the pump. Also resets cavitation to Normal.
    pub fn stop(&mut self) {
        self.running = false;
        self.cavitation.reset();
    }

    /// Set the commanded speed fraction. Fixed-speed pumps ignore this.
    pub fn set_speed(&mut self, speed: f64) {
        match self.mode {
            SpeedMode::VariableSpeed => self.speed = clamp_unit(speed),
            SpeedMode::FixedSpeed => {
                warn!(pump = %self.meta.id, "ignoring speed command on fixed-speed pump");
            }
        }
    }

    /// Nominal flow before tank-availability and valve constraints:
    /// `capacity · speed · efficiency`, reduced while cavitation is active.
    pub fn nominal_flow_m3s(&self) -> f64 {
        if !self.running || !self.meta.enabled {
            return 0.0;
        }
        let mut flow = self.capacity_m3s * self.speed * self.efficiency;
        if self.cavitation.is_active() {
            flow *= self.cavitation.flow_reduction;
        }
        flow
    }

    /// Accumulate run time and advance the cavitation machine.
    pub fn integrate(&mut self, dt_s: f64) {
        if self.running && self.meta.enabled {
            self.run_time_s += dt_s;
            self.cavitation.advance(dt_s);
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.run_time_s = 0.0;
        if self.mode == SpeedMode::FixedSpeed {
            self.speed = 1.0;
        }
        self.cavitation.reset();
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "running", self.running);
        put(&mut snap, "speed", self.speed);
        put(&mut snap, "capacity_m3s", self.capacity_m3s);
        put(&mut snap, "efficiency", self.efficiency);
        put(&mut snap, "nominal_flow_m3s", self.nominal_flow_m3s());
        put(&mut snap, "run_time_s", self.run_time_s);
        put(&mut snap, "cavitation_active", self.cavitation.is_active());
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump() -> Pump {
        Pump::new("pump1", vec!["tank1".into()], vec!["valve1".into()], 0.5, 0.95).unwrap()
    }

    #[test]
    fn stopped_pump_has_zero_nominal_flow() {
        let p = pump();
        assert_eq!(p.nominal_flow_m3s(), 0.0);
    }

    #[test]
    fn nominal_flow_is_capacity_speed_efficiency() {
        let mut p = pump();
        p.start();
        assert!((p.nominal_flow_m3s() - 0.475).abs() < 1e-12);
    }

    #[test]
    fn variable_speed_scales_flow_and_clamps() {
        let mut p = pump().with_mode(SpeedMode::VariableSpeed);
        p.start();
        p.set_speed(0.5);
        assert!((p.nominal_flow_m3s() - 0.2375).abs() < 1e-12);
        p.set_speed(1.7);
        assert_eq!(p.speed, 1.0);
        p.set_speed(-0.3);
        assert_eq!(p.speed, 0.0);
    }

    #[test]
    fn fixed_speed_ignores_speed_commands() {
        let mut p = pump();
        p.set_speed(0.2);
        assert_eq!(p.speed, 1.0);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(Pump::new("p", vec![], vec![], 0.0, 0.9).is_err());
        assert!(Pump::new("p", vec![], vec![], f64::NAN, 0.9).is_err());
        assert!(Pump::new("p", vec![], vec![], 0.5, 1.5).is_err());
        assert!(Pump::new("p", vec![], vec![], 0.5, 0.0).is_err());
    }

    #[test]
    fn timed_cavitation_timeline() {
        // trigger 60 s, duration 5 s, reduction 0.3; run from t=0 at dt=0.1.
        let mut p = pump().with_cavitation(Cavitation::timed(60.0, 5.0, 0.3));
        p.start();
        let nominal = 0.5 * 1.0 * 0.95;

        let mut t = 0.0;
        let mut at = |target: f64, p: &mut Pump| {
            while t < target - 1e-9 {
                p.integrate(0.1);
                t += 0.1;
            }
            p.nominal_flow_m3s()
        };

        let q_59_9 = at(59.9, &mut p);
        assert!((q_59_9 - nominal).abs() < 1e-12, "pre-trigger: {q_59_9}");

        let q_61 = at(61.0, &mut p);
        assert!((q_61 - nominal * 0.3).abs() < 1e-12, "active: {q_61}");

        let q_66 = at(66.0, &mut p);
        assert!((q_66 - nominal).abs() < 1e-12, "recovered: {q_66}");
    }

    #[test]
    fn instant_cavitation_fires_on_start_once() {
        let mut p = pump().with_cavitation(Cavitation::instant(2.0, 0.5));
        p.start();
        assert!(p.cavitation.is_active());
        for _ in 0..25 {
            p.integrate(0.1);
        }
        assert!(!p.cavitation.is_active());
        // Still running: the instant trigger does not re-fire.
        for _ in 0..25 {
            p.integrate(0.1);
        }
        assert!(!p.cavitation.is_active());
    }

    #[test]
    fn stop_resets_cavitation() {
        let mut p = pump().with_cavitation(Cavitation::instant(10.0, 0.5));
        p.start();
        assert!(p.cavitation.is_active());
        p.stop();
        assert!(!p.cavitation.is_active());
        assert_eq!(p.cavitation.elapsed_run_s(), 0.0);
    }

    #[test]
    fn stopped_pump_does_not_accumulate_run_time() {
        let mut p = pump();
        p.integrate(1.0);
        assert_eq!(p.run_time_s, 0.0);
        p.start();
        p.integrate(1.0);
        assert_eq!(p.run_time_s, 1.0);
    }
}
