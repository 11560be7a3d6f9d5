//! Build an [`Engine`] from a parsed network definition.
//!
//! Semantic problems never abort the build: any entry that cannot be
//! realized is skipped and reported, and the engine is assembled from the
//! valid subset.

use hn_components::{
    Cavitation, Component, Drain, Feed, Fluid, Pipe, Pump, Sensor, SpeedMode, Tank, ThermalParams,
    Valve,
};
use hn_graph::EdgeSide;
use hn_sim::{Engine, Settings};
use tracing::warn;

use crate::schema::{CommonDef, NetworkDef, PumpDef};

/// One non-fatal problem found while building.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildWarning {
    /// A later entry reused an id; the earlier one wins.
    DuplicateId { id: String },
    /// An input or output names a component that does not exist.
    DanglingReference {
        component: String,
        side: EdgeSide,
        reference: String,
    },
    /// Pump `kind` was not recognized; fixed-speed assumed.
    UnknownPumpKind { id: String, kind: String },
    /// Entry parameters were rejected by the component constructor.
    InvalidComponent { id: String, reason: String },
}

/// What the two-stage gate produced: the engine, plus every warning.
#[derive(Debug)]
pub struct BuildReport {
    pub engine: Engine,
    pub warnings: Vec<BuildWarning>,
}

fn settings_of(def: &NetworkDef) -> Settings {
    let s = &def.settings;
    Settings {
        time_step_s: s.time_step,
        max_time_step_s: s.max_time_step,
        fluid: Fluid {
            density_kgm3: s.fluid_density,
            viscosity_pas: s.fluid_viscosity,
        },
        gravity_mps2: s.gravity,
        ambient_temperature_c: s.ambient_temperature_c,
    }
}

fn speed_mode(def: &PumpDef, warnings: &mut Vec<BuildWarning>) -> SpeedMode {
    match def.kind.as_deref() {
        None | Some("fixed_speed") => SpeedMode::FixedSpeed,
        Some("variable_speed") => SpeedMode::VariableSpeed,
        Some(other) => {
            warn!(pump = %def.common.id, kind = other, "unknown pump kind, assuming fixed-speed");
            warnings.push(BuildWarning::UnknownPumpKind {
                id: def.common.id.clone(),
                kind: other.to_owned(),
            });
            SpeedMode::FixedSpeed
        }
    }
}

fn insert(
    engine: &mut Engine,
    common: &CommonDef,
    component: Component,
    warnings: &mut Vec<BuildWarning>,
) {
    if engine.add_component(component).is_err() {
        warnings.push(BuildWarning::DuplicateId {
            id: common.id.clone(),
        });
    }
}

/// Assemble an engine from the definition, degrading on any semantic
/// problem. Iteration is in config-key order, so on an id collision the
/// first entry by key order wins.
pub fn build_engine(def: &NetworkDef) -> BuildReport {
    let mut warnings = Vec::new();
    let mut engine = Engine::new(settings_of(def));
    let density = def.settings.fluid_density;

    for feed in def.feeds.values() {
        let mut component = Feed::new(
            &feed.common.id,
            feed.common.outputs.clone(),
            feed.max_flow.unwrap_or(f64::INFINITY),
        );
        if let Some(t) = feed.temperature_c {
            component = component.with_temperature_c(t);
        }
        component.meta.inputs = feed.common.inputs.clone();
        component.meta.enabled = feed.common.enabled;
        insert(&mut engine, &feed.common, Component::Feed(component), &mut warnings);
    }

    for drain in def.drains.values() {
        let mut component = Drain::new(&drain.common.id, drain.common.inputs.clone());
        component.meta.outputs = drain.common.outputs.clone();
        component.meta.enabled = drain.common.enabled;
        insert(&mut engine, &drain.common, Component::Drain(component), &mut warnings);
    }

    for tank in def.tanks.values() {
        match Tank::new(
            &tank.common.id,
            tank.common.inputs.clone(),
            tank.common.outputs.clone(),
            tank.area,
            tank.max_height,
        ) {
            Ok(mut component) => {
                component = component.with_initial_volume(tank.initial_volume);
                if tank.low_threshold.is_some() || tank.high_threshold.is_some() {
                    component = component.with_thresholds(
                        tank.low_threshold.unwrap_or(0.1),
                        tank.high_threshold.unwrap_or(0.9),
                    );
                }
                if let Some(thermal) = &tank.thermal {
                    component = component.with_thermal(
                        ThermalParams {
                            specific_heat_j_kgk: thermal.specific_heat,
                            surface_area_m2: thermal.surface_area,
                            heat_coeff_w_m2k: thermal.heat_coeff,
                            initial_temperature_c: thermal.initial_temperature_c,
                        },
                        density,
                    );
                }
                component.meta.enabled = tank.common.enabled;
                insert(&mut engine, &tank.common, Component::Tank(component), &mut warnings);
            }
            Err(err) => warnings.push(BuildWarning::InvalidComponent {
                id: tank.common.id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for pump in def.pumps.values() {
        let mode = speed_mode(pump, &mut warnings);
        match Pump::new(
            &pump.common.id,
            pump.common.inputs.clone(),
            pump.common.outputs.clone(),
            pump.capacity,
            pump.efficiency,
        ) {
            Ok(mut component) => {
                component = component
                    .with_mode(mode)
                    .with_min_level(pump.requires_min_level);
                if let Some(cav) = &pump.cavitation {
                    component = component.with_cavitation(match cav.trigger_time {
                        Some(trigger) => {
                            Cavitation::timed(trigger, cav.duration, cav.flow_reduction)
                        }
                        None => Cavitation::instant(cav.duration, cav.flow_reduction),
                    });
                }
                component.meta.enabled = pump.common.enabled;
                if pump.running {
                    component.start();
                }
                insert(&mut engine, &pump.common, Component::Pump(component), &mut warnings);
            }
            Err(err) => warnings.push(BuildWarning::InvalidComponent {
                id: pump.common.id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for valve in def.valves.values() {
        match Valve::new(
            &valve.common.id,
            valve.common.inputs.clone(),
            valve.common.outputs.clone(),
            valve.max_flow,
            valve.response_time,
        ) {
            Ok(component) => {
                let mut component = component.with_position(valve.position);
                component.meta.enabled = valve.common.enabled;
                insert(&mut engine, &valve.common, Component::Valve(component), &mut warnings);
            }
            Err(err) => warnings.push(BuildWarning::InvalidComponent {
                id: valve.common.id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for pipe in def.pipes.values() {
        match Pipe::new(
            &pipe.common.id,
            pipe.common.inputs.clone(),
            pipe.common.outputs.clone(),
            pipe.diameter,
            pipe.length,
            pipe.roughness,
        ) {
            Ok(mut component) => {
                component.meta.enabled = pipe.common.enabled;
                insert(&mut engine, &pipe.common, Component::Pipe(component), &mut warnings);
            }
            Err(err) => warnings.push(BuildWarning::InvalidComponent {
                id: pipe.common.id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for sensor in def.pressure_sensors.values() {
        match Sensor::new(
            &sensor.common.id,
            sensor.common.inputs.clone(),
            sensor.common.outputs.clone(),
            sensor.range_low,
            sensor.range_high,
            sensor.window,
        ) {
            Ok(mut component) => {
                component.meta.enabled = sensor.common.enabled;
                insert(
                    &mut engine,
                    &sensor.common,
                    Component::Sensor(component),
                    &mut warnings,
                );
            }
            Err(err) => warnings.push(BuildWarning::InvalidComponent {
                id: sensor.common.id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    for finding in engine.validate() {
        if let hn_graph::Finding::DanglingReference {
            component,
            side,
            reference,
        } = finding
        {
            warnings.push(BuildWarning::DanglingReference {
                component,
                side,
                reference,
            });
        }
    }

    BuildReport { engine, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load_json_str, load_yaml_str};

    const SAMPLE: &str = r#"
settings:
  time_step: 0.05
  fluid_density: 998.0
feeds:
  supply:
    id: feed1
    outputs: [valve1]
    temperature_c: 40.0
valves:
  inlet:
    id: valve1
    title: Inlet valve
    inputs: [feed1]
    outputs: [tank1]
    max_flow: 0.8
    position: 0.5
tanks:
  buffer:
    id: tank1
    inputs: [valve1]
    outputs: [pump1]
    area: 1.2
    max_height: 1.0
    initial_volume: 0.6
pumps:
  transfer:
    id: pump1
    kind: variable_speed
    inputs: [tank1]
    outputs: [sink]
    capacity: 0.5
    efficiency: 0.95
    running: true
drains:
  sink:
    id: sink
    inputs: [pump1]
"#;

    #[test]
    fn sample_builds_without_warnings() {
        let def = load_yaml_str(SAMPLE).unwrap();
        let report = build_engine(&def);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert!(report.engine.component("tank1").is_some());
        let pump = match report.engine.component("pump1").unwrap() {
            Component::Pump(p) => p,
            _ => unreachable!(),
        };
        assert!(pump.running);
        assert_eq!(pump.mode, SpeedMode::VariableSpeed);
    }

    #[test]
    fn built_engine_steps() {
        let def = load_yaml_str(SAMPLE).unwrap();
        let mut engine = build_engine(&def).engine;
        engine.step(0.05);
        // Tank at 0.6 m³ feeding a 0.475 nominal pump: availability binds.
        assert!((engine.flow_between("tank1", "pump1") - 0.3).abs() < 1e-12);
    }

    #[test]
    fn json_documents_build_the_same_engine() {
        let json = r#"{
            "tanks": {
                "a": { "id": "tank1", "area": 1.2, "max_height": 1.0, "initial_volume": 0.6 }
            }
        }"#;
        let def = load_json_str(json).unwrap();
        let report = build_engine(&def);
        let tank = report.engine.component("tank1").unwrap().as_tank().unwrap();
        assert!((tank.volume_m3 - 0.6).abs() < 1e-12);
    }

    #[test]
    fn unknown_pump_kind_degrades_to_fixed_speed() {
        let yaml = r#"
pumps:
  p:
    id: pump1
    kind: warp_drive
    capacity: 0.5
"#;
        let def = load_yaml_str(yaml).unwrap();
        let report = build_engine(&def);
        assert!(matches!(
            report.warnings.as_slice(),
            [BuildWarning::UnknownPumpKind { .. }]
        ));
        let pump = match report.engine.component("pump1").unwrap() {
            Component::Pump(p) => p,
            _ => unreachable!(),
        };
        assert_eq!(pump.mode, SpeedMode::FixedSpeed);
    }

    #[test]
    fn duplicate_id_keeps_first_entry() {
        let yaml = r#"
tanks:
  a:
    id: tank1
    area: 1.0
    max_height: 1.0
    initial_volume: 0.25
  b:
    id: tank1
    area: 2.0
    max_height: 2.0
"#;
        let def = load_yaml_str(yaml).unwrap();
        let report = build_engine(&def);
        assert!(matches!(
            report.warnings.as_slice(),
            [BuildWarning::DuplicateId { .. }]
        ));
        let tank = report.engine.component("tank1").unwrap().as_tank().unwrap();
        assert!((tank.volume_m3 - 0.25).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_skip_the_entry() {
        let yaml = r#"
tanks:
  bad:
    id: tank1
    area: -1.0
    max_height: 1.0
"#;
        let def = load_yaml_str(yaml).unwrap();
        let report = build_engine(&def);
        assert!(report.engine.component("tank1").is_none());
        assert!(matches!(
            report.warnings.as_slice(),
            [BuildWarning::InvalidComponent { .. }]
        ));
    }

    #[test]
    fn dangling_reference_is_reported_not_fatal() {
        let yaml = r#"
feeds:
  f:
    id: feed1
    outputs: [nowhere]
    max_flow: 0.2
"#;
        let def = load_yaml_str(yaml).unwrap();
        let report = build_engine(&def);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::DanglingReference { .. })));
        assert!(report.engine.component("feed1").is_some());
    }
}
