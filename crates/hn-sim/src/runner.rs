//! Drivers that advance an [`Engine`] over time.
//!
//! Two modes: a fixed-step batch run that records decimated snapshots,
//! and a wall-clock driver for interactive loops where each call derives
//! its step from real elapsed time.

use hn_components::Snapshot;
use hn_core::{ClockState, SimulationClock};
use hn_graph::HasMeta;
use tracing::info;

use crate::engine::Engine;
use crate::error::{SimError, SimResult};

/// Parameters for a fixed-step batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dt_s: f64,
    pub t_end_s: f64,
    /// Hard cap on iterations regardless of `t_end_s`.
    pub max_steps: usize,
    /// Record a frame every N steps. 0 disables recording entirely.
    pub record_every: usize,
}

impl RunOptions {
    pub fn new(dt_s: f64, t_end_s: f64) -> SimResult<Self> {
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "run step must be positive and finite",
            });
        }
        if !(t_end_s.is_finite() && t_end_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "run end time must be positive and finite",
            });
        }
        Ok(Self {
            dt_s,
            t_end_s,
            max_steps: 10_000_000,
            record_every: 1,
        })
    }

    pub fn with_record_every(mut self, every: usize) -> Self {
        self.record_every = every;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// One recorded frame: simulated time plus a snapshot per component,
/// ordered by component id.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub t_s: f64,
    pub snapshots: Vec<(String, Snapshot)>,
}

fn frame(engine: &Engine) -> RunRecord {
    let mut snapshots = Vec::new();
    for category in crate::resolver::EVALUATION_ORDER {
        for component in engine.components_by_category(category) {
            let id = component.id().to_owned();
            if let Ok(snap) = engine.snapshot(&id) {
                snapshots.push((id, snap));
            }
        }
    }
    snapshots.sort_by(|a, b| a.0.cmp(&b.0));
    RunRecord {
        t_s: engine.time_s(),
        snapshots,
    }
}

/// Step the engine from its current time to `t_end_s` at a fixed step.
///
/// Frames are recorded every `record_every` steps; the final state is
/// always recorded so the last frame reflects the end of the run.
pub fn run(engine: &mut Engine, options: &RunOptions) -> SimResult<Vec<RunRecord>> {
    let mut records = Vec::new();
    let mut steps = 0usize;
    while engine.time_s() < options.t_end_s && steps < options.max_steps {
        engine.step(options.dt_s);
        steps += 1;
        if options.record_every > 0 && steps % options.record_every == 0 {
            records.push(frame(engine));
        }
    }
    // Flush the final state if decimation skipped it.
    let needs_flush = options.record_every > 0
        && records
            .last()
            .map(|r| r.t_s < engine.time_s())
            .unwrap_or(true);
    if needs_flush {
        records.push(frame(engine));
    }
    info!(steps, t_s = engine.time_s(), "batch run complete");
    Ok(records)
}

/// Wall-clock driver: each `tick` derives dt from real elapsed time,
/// clamped by the engine's maximum step. Pausing freezes state; resuming
/// discards the paused gap.
#[derive(Debug)]
pub struct RealtimeDriver {
    clock: SimulationClock,
}

impl RealtimeDriver {
    pub fn new(engine: &Engine) -> Self {
        Self {
            clock: SimulationClock::new(engine.settings().max_time_step_s),
        }
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    /// Advance the engine by the wall-clock time since the previous tick.
    /// Returns the step applied (0 when paused, stopped, or first call).
    pub fn tick(&mut self, engine: &mut Engine) -> f64 {
        let dt_s = self.clock.tick();
        if dt_s > 0.0 {
            engine.step(dt_s);
        }
        dt_s
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Terminal: a stopped driver never advances again.
    pub fn stop(&mut self) {
        self.clock.stop();
    }
}
