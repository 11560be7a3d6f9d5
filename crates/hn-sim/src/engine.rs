//! The simulation engine: owns the component graph and the live edge map,
//! and advances both one tick at a time.
//!
//! A tick is resolve-then-integrate: the flow map is rebuilt from current
//! component state, then every enabled component integrates against the
//! flows just resolved, walking the same category order the resolver uses.
//! All reads needed for integration are taken before any component is
//! mutated, so within a tick every component sees the same flow picture.

use hn_components::{Component, Fluid, Snapshot};
use hn_graph::{Category, ComponentGraph, Finding, FlowMap, HasMeta, validate_references};
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::resolver::{self, EVALUATION_ORDER, observed_flow};

/// Engine-wide physical and stepping parameters.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Fixed step used by batch runs.
    pub time_step_s: f64,
    /// Upper clamp on any single step, wall-clock driven or not.
    pub max_time_step_s: f64,
    pub fluid: Fluid,
    pub gravity_mps2: f64,
    pub ambient_temperature_c: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_step_s: 0.05,
            max_time_step_s: 0.1,
            fluid: Fluid::default(),
            gravity_mps2: 9.81,
            ambient_temperature_c: 20.0,
        }
    }
}

/// Scalars read for one component before the mutation pass.
struct Scratch {
    id: String,
    inflow_m3s: f64,
    outflow_m3s: f64,
    observed_m3s: f64,
    inlet_temperature_c: Option<f64>,
}

#[derive(Debug, Default)]
pub struct Engine {
    graph: ComponentGraph<Component>,
    flows: FlowMap,
    settings: Settings,
    time_s: f64,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self {
            graph: ComponentGraph::new(),
            flows: FlowMap::new(),
            settings,
            time_s: 0.0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Simulated time elapsed since construction or the last reset.
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    pub fn add_component(&mut self, component: Component) -> SimResult<()> {
        self.graph.insert(component)?;
        Ok(())
    }

    /// Remove a component and every flow edge that mentions it.
    pub fn remove_component(&mut self, id: &str) -> SimResult<Component> {
        let removed = self
            .graph
            .remove(id)
            .ok_or_else(|| SimError::UnknownComponent { id: id.to_owned() })?;
        self.flows.remove_mentions(id);
        Ok(removed)
    }

    /// Cross-check declared connections. Problems are reported, never
    /// fatal: a dangling reference degrades to a dead edge at runtime.
    pub fn validate(&self) -> Vec<Finding> {
        validate_references(&self.graph)
    }

    /// Advance the simulation by `dt_s` seconds.
    ///
    /// Non-positive or non-finite steps are ignored with a warning; steps
    /// above the configured maximum are clamped.
    pub fn step(&mut self, dt_s: f64) {
        if !dt_s.is_finite() || dt_s <= 0.0 {
            warn!(dt_s, "ignoring degenerate time step");
            return;
        }
        let dt_s = dt_s.min(self.settings.max_time_step_s);

        resolver::resolve(&self.graph, &mut self.flows);

        // Read everything integration needs while the graph is still
        // immutably borrowed.
        let mut scratch: Vec<Scratch> = Vec::new();
        for category in EVALUATION_ORDER {
            for id in self.graph.ids_by_category(category) {
                let Some(component) = self.graph.get(&id) else {
                    continue;
                };
                if !component.is_enabled() {
                    continue;
                }
                let meta = component.meta();
                scratch.push(Scratch {
                    inflow_m3s: self.flows.aggregate_in(&id),
                    outflow_m3s: self.flows.aggregate_out(&id),
                    observed_m3s: observed_flow(meta, &self.flows),
                    inlet_temperature_c: match component {
                        Component::Tank(_) => {
                            resolver::find_upstream_temperature(&self.graph, meta)
                        }
                        _ => None,
                    },
                    id,
                });
            }
        }

        let fluid = self.settings.fluid;
        let ambient_c = self.settings.ambient_temperature_c;
        for entry in scratch {
            let Some(component) = self.graph.get_mut(&entry.id) else {
                continue;
            };
            match component {
                Component::Feed(_) => {}
                Component::Valve(valve) => valve.integrate(dt_s),
                Component::Pipe(pipe) => pipe.integrate(dt_s, entry.observed_m3s, &fluid),
                Component::Tank(tank) => tank.integrate(
                    dt_s,
                    entry.inflow_m3s,
                    entry.outflow_m3s,
                    entry.inlet_temperature_c,
                    fluid.density_kgm3,
                    ambient_c,
                ),
                Component::Pump(pump) => pump.integrate(dt_s),
                Component::Drain(drain) => drain.integrate(dt_s, entry.inflow_m3s),
                Component::Sensor(sensor) => sensor.integrate(dt_s, entry.observed_m3s),
            }
        }

        self.time_s += dt_s;
    }

    // ---- read surface -------------------------------------------------

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.graph.get(id)
    }

    pub fn components_by_category(&self, category: Category) -> impl Iterator<Item = &Component> {
        self.graph.by_category(category)
    }

    pub fn flow_between(&self, from: &str, to: &str) -> f64 {
        self.flows.between(from, to)
    }

    pub fn aggregate_input_flow(&self, id: &str) -> f64 {
        self.flows.aggregate_in(id)
    }

    pub fn aggregate_output_flow(&self, id: &str) -> f64 {
        self.flows.aggregate_out(id)
    }

    /// Flat key/value state of one component, augmented with its live
    /// aggregate flows and, for tanks, the hydrostatic base pressure.
    pub fn snapshot(&self, id: &str) -> SimResult<Snapshot> {
        let component = self
            .graph
            .get(id)
            .ok_or_else(|| SimError::UnknownComponent { id: id.to_owned() })?;
        let mut snap = component.snapshot();
        snap.insert("flow_in_m3s".into(), self.flows.aggregate_in(id).into());
        snap.insert("flow_out_m3s".into(), self.flows.aggregate_out(id).into());
        if let Component::Tank(tank) = component {
            let head_m = tank.level() * tank.max_height_m;
            let pressure = self.settings.fluid.density_kgm3 * self.settings.gravity_mps2 * head_m;
            snap.insert("base_pressure_pa".into(), pressure.into());
        }
        Ok(snap)
    }

    // ---- write surface ------------------------------------------------

    pub fn set_valve_target_position(&mut self, id: &str, position: f64) -> SimResult<()> {
        match self.graph.get_mut(id) {
            Some(Component::Valve(valve)) => {
                valve.set_target_position(position);
                Ok(())
            }
            Some(_) => Err(SimError::WrongCategory {
                id: id.to_owned(),
                expected: Category::Valve.as_str(),
            }),
            None => Err(SimError::UnknownComponent { id: id.to_owned() }),
        }
    }

    pub fn start_pump(&mut self, id: &str) -> SimResult<()> {
        self.with_pump(id, |pump| pump.start())
    }

    pub fn stop_pump(&mut self, id: &str) -> SimResult<()> {
        self.with_pump(id, |pump| pump.stop())
    }

    pub fn set_pump_speed(&mut self, id: &str, speed: f64) -> SimResult<()> {
        self.with_pump(id, |pump| pump.set_speed(speed))
    }

    fn with_pump(
        &mut self,
        id: &str,
        apply: impl FnOnce(&mut hn_components::Pump),
    ) -> SimResult<()> {
        match self.graph.get_mut(id) {
            Some(Component::Pump(pump)) => {
                apply(pump);
                Ok(())
            }
            Some(_) => Err(SimError::WrongCategory {
                id: id.to_owned(),
                expected: Category::Pump.as_str(),
            }),
            None => Err(SimError::UnknownComponent { id: id.to_owned() }),
        }
    }

    pub fn set_feed_available(&mut self, id: &str, available: bool) -> SimResult<()> {
        match self.graph.get_mut(id) {
            Some(Component::Feed(feed)) => {
                feed.set_available(available);
                Ok(())
            }
            Some(_) => Err(SimError::WrongCategory {
                id: id.to_owned(),
                expected: Category::Feed.as_str(),
            }),
            None => Err(SimError::UnknownComponent { id: id.to_owned() }),
        }
    }

    /// Enable or disable any component. Disabled components neither
    /// produce flow nor integrate.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> SimResult<()> {
        let component = self
            .graph
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownComponent { id: id.to_owned() })?;
        component.meta_mut().enabled = enabled;
        Ok(())
    }

    /// Return every component to its construction-time state, clear all
    /// flows and rewind the clock.
    pub fn reset(&mut self) {
        for component in self.graph.iter_mut() {
            component.reset();
        }
        self.flows.clear();
        self.time_s = 0.0;
        info!("engine reset");
    }
}
