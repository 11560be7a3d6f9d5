//! Wall-clock tick source for the realtime loop.
//!
//! Each call to `tick()` converts the elapsed wall-clock time since the
//! previous tick into a simulation step `dt`, hard-clamped to a maximum so
//! a stalled host (backgrounded tab in the original, suspended process here)
//! cannot produce one destabilizing giant step on resume.

use std::time::Instant;

/// Lifecycle state of the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Running,
    /// Ticks keep arriving but carry dt = 0; simulation state is frozen.
    Paused,
    /// No further ticks should be scheduled.
    Stopped,
}

/// Converts wall-clock deltas into clamped simulation steps.
#[derive(Debug)]
pub struct SimulationClock {
    max_dt_s: f64,
    last: Option<Instant>,
    state: ClockState,
}

impl SimulationClock {
    /// Create a clock with the given dt ceiling (seconds).
    ///
    /// A non-positive or non-finite ceiling falls back to 0.1 s, the
    /// ceiling the shipped configurations use.
    pub fn new(max_dt_s: f64) -> Self {
        let max_dt_s = if max_dt_s.is_finite() && max_dt_s > 0.0 {
            max_dt_s
        } else {
            0.1
        };
        Self {
            max_dt_s,
            last: None,
            state: ClockState::Running,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn max_dt_s(&self) -> f64 {
        self.max_dt_s
    }

    /// Advance the clock and return the step to simulate.
    ///
    /// Returns 0 while paused or stopped. The first tick after creation or
    /// resume also returns 0 (there is no previous instant to diff against).
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        match self.state {
            ClockState::Running => {
                let dt = self
                    .last
                    .map(|last| now.duration_since(last).as_secs_f64())
                    .unwrap_or(0.0);
                self.last = Some(now);
                dt.min(self.max_dt_s)
            }
            ClockState::Paused | ClockState::Stopped => 0.0,
        }
    }

    /// Freeze simulation time; subsequent ticks return 0.
    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    /// Resume from pause. The elapsed pause interval is discarded rather
    /// than simulated.
    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
            self.last = None;
        }
    }

    /// Halt the clock permanently.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = SimulationClock::new(0.1);
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn tick_measures_elapsed_time() {
        let mut clock = SimulationClock::new(1.0);
        clock.tick();
        sleep(Duration::from_millis(20));
        let dt = clock.tick();
        assert!(dt >= 0.015, "dt should reflect the sleep, got {dt}");
        assert!(dt < 1.0);
    }

    #[test]
    fn dt_is_clamped_to_max() {
        let mut clock = SimulationClock::new(0.01);
        clock.tick();
        sleep(Duration::from_millis(30));
        let dt = clock.tick();
        assert!(dt <= 0.01);
    }

    #[test]
    fn paused_ticks_are_zero_and_resume_discards_gap() {
        let mut clock = SimulationClock::new(1.0);
        clock.tick();
        clock.pause();
        sleep(Duration::from_millis(10));
        assert_eq!(clock.tick(), 0.0);
        clock.resume();
        // No previous instant after resume: first tick back is zero.
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.state(), ClockState::Running);
    }

    #[test]
    fn stop_is_terminal() {
        let mut clock = SimulationClock::new(1.0);
        clock.stop();
        clock.resume();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn bad_max_dt_falls_back() {
        assert_eq!(SimulationClock::new(0.0).max_dt_s(), 0.1);
        assert_eq!(SimulationClock::new(f64::NAN).max_dt_s(), 0.1);
    }
}
