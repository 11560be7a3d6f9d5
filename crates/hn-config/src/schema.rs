//! Network definition schema.
//!
//! Components are grouped by category under per-category maps keyed by an
//! arbitrary config key; the authoritative identifier is each entry's `id`
//! field. Presentation-only fields (`title`, `anchor`) are accepted so
//! documents authored for display tooling load unchanged, but nothing here
//! reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NetworkDef {
    #[serde(default)]
    pub settings: SettingsDef,
    #[serde(default)]
    pub feeds: BTreeMap<String, FeedDef>,
    #[serde(default)]
    pub drains: BTreeMap<String, DrainDef>,
    #[serde(default)]
    pub tanks: BTreeMap<String, TankDef>,
    #[serde(default)]
    pub pumps: BTreeMap<String, PumpDef>,
    #[serde(default)]
    pub valves: BTreeMap<String, ValveDef>,
    #[serde(default)]
    pub pipes: BTreeMap<String, PipeDef>,
    #[serde(default)]
    pub pressure_sensors: BTreeMap<String, SensorDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsDef {
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_max_time_step")]
    pub max_time_step: f64,
    #[serde(default = "default_fluid_density")]
    pub fluid_density: f64,
    #[serde(default = "default_fluid_viscosity")]
    pub fluid_viscosity: f64,
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default = "default_ambient_temperature")]
    pub ambient_temperature_c: f64,
}

impl Default for SettingsDef {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            max_time_step: default_max_time_step(),
            fluid_density: default_fluid_density(),
            fluid_viscosity: default_fluid_viscosity(),
            gravity: default_gravity(),
            ambient_temperature_c: default_ambient_temperature(),
        }
    }
}

fn default_time_step() -> f64 {
    0.05
}

fn default_max_time_step() -> f64 {
    0.1
}

fn default_fluid_density() -> f64 {
    998.0
}

fn default_fluid_viscosity() -> f64 {
    1.0e-3
}

fn default_gravity() -> f64 {
    9.81
}

fn default_ambient_temperature() -> f64 {
    20.0
}

/// Fields shared by every component definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CommonDef {
    pub id: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Presentation only, ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Presentation only, ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedDef {
    #[serde(flatten)]
    pub common: CommonDef,
    /// Omitted means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrainDef {
    #[serde(flatten)]
    pub common: CommonDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TankDef {
    #[serde(flatten)]
    pub common: CommonDef,
    pub area: f64,
    pub max_height: f64,
    #[serde(default)]
    pub initial_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermalDef {
    #[serde(default = "default_specific_heat")]
    pub specific_heat: f64,
    #[serde(default)]
    pub surface_area: f64,
    #[serde(default)]
    pub heat_coeff: f64,
    #[serde(default = "default_ambient_temperature")]
    pub initial_temperature_c: f64,
}

fn default_specific_heat() -> f64 {
    4186.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PumpDef {
    #[serde(flatten)]
    pub common: CommonDef,
    /// `fixed_speed` or `variable_speed`; anything else degrades to
    /// `fixed_speed` with a warning.
    #[serde(default)]
    pub kind: Option<String>,
    pub capacity: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default)]
    pub requires_min_level: f64,
    #[serde(default)]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cavitation: Option<CavitationDef>,
}

fn default_efficiency() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CavitationDef {
    /// Omitted means the instant variant: triggers on every start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_time: Option<f64>,
    pub duration: f64,
    pub flow_reduction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValveDef {
    #[serde(flatten)]
    pub common: CommonDef,
    pub max_flow: f64,
    #[serde(default)]
    pub position: f64,
    #[serde(default = "default_response_time")]
    pub response_time: f64,
}

fn default_response_time() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    #[serde(flatten)]
    pub common: CommonDef,
    pub diameter: f64,
    pub length: f64,
    #[serde(default)]
    pub roughness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorDef {
    #[serde(flatten)]
    pub common: CommonDef,
    #[serde(default)]
    pub range_low: f64,
    pub range_high: f64,
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    10
}
