//! Tank: lumped vessel with explicit-Euler mass (and optional energy)
//! balance.

use hn_core::VOLUME_EPSILON;
use hn_graph::{Category, Meta};

use crate::common::check_positive;
use crate::error::ComponentResult;
use crate::snapshot::{put, Snapshot};

/// Level classification, a pure read of thresholds against `level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankStatus {
    Empty,
    Low,
    Normal,
    High,
    Full,
}

impl TankStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TankStatus::Empty => "EMPTY",
            TankStatus::Low => "LOW",
            TankStatus::Normal => "NORMAL",
            TankStatus::High => "HIGH",
            TankStatus::Full => "FULL",
        }
    }
}

/// Parameters for the optional energy balance.
#[derive(Debug, Clone, Copy)]
pub struct ThermalParams {
    /// Specific heat of the stored fluid, J/(kg·K).
    pub specific_heat_j_kgk: f64,
    /// Heat-exchange surface area, m².
    pub surface_area_m2: f64,
    /// Surface heat-transfer coefficient, W/(m²·K). Zero disables ambient
    /// exchange (an uninsulated coefficient of zero means no exchange).
    pub heat_coeff_w_m2k: f64,
    pub initial_temperature_c: f64,
}

impl Default for ThermalParams {
    fn default() -> Self {
        Self {
            specific_heat_j_kgk: 4186.0,
            surface_area_m2: 0.0,
            heat_coeff_w_m2k: 0.0,
            initial_temperature_c: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
struct ThermalState {
    params: ThermalParams,
    temperature_c: f64,
    enthalpy_j: f64,
    initial_enthalpy_j: f64,
}

/// Open vessel with fixed geometry. `max_volume = area · max_height` is an
/// invariant fixed at construction; volume is clamped into `[0, max]` on
/// every integration step.
#[derive(Debug, Clone)]
pub struct Tank {
    pub meta: Meta,
    pub area_m2: f64,
    pub max_height_m: f64,
    max_volume_m3: f64,
    pub volume_m3: f64,
    initial_volume_m3: f64,
    /// Level fraction below which the tank reads LOW.
    pub low_threshold: f64,
    /// Level fraction above which the tank reads HIGH.
    pub high_threshold: f64,
    thermal: Option<ThermalState>,
}

impl Tank {
    pub fn new(
        id: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        area_m2: f64,
        max_height_m: f64,
    ) -> ComponentResult<Self> {
        let area_m2 = check_positive(area_m2, "tank area must be positive")?;
        let max_height_m = check_positive(max_height_m, "tank height must be positive")?;
        Ok(Self {
            meta: Meta::new(id, Category::Tank, inputs, outputs),
            area_m2,
            max_height_m,
            max_volume_m3: area_m2 * max_height_m,
            volume_m3: 0.0,
            initial_volume_m3: 0.0,
            low_threshold: 0.1,
            high_threshold: 0.9,
            thermal: None,
        })
    }

    pub fn with_initial_volume(mut self, volume_m3: f64) -> Self {
        let v = volume_m3.clamp(0.0, self.max_volume_m3);
        self.volume_m3 = v;
        self.initial_volume_m3 = v;
        self
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.low_threshold = low.clamp(0.0, 1.0);
        self.high_threshold = high.clamp(self.low_threshold, 1.0);
        self
    }

    /// Enable the energy balance. The fluid density is needed up front to
    /// convert the initial temperature into stored enthalpy.
    pub fn with_thermal(mut self, params: ThermalParams, fluid_density_kgm3: f64) -> Self {
        let mass_kg = self.volume_m3 * fluid_density_kgm3;
        let enthalpy_j =
            (mass_kg * params.specific_heat_j_kgk * params.initial_temperature_c).max(0.0);
        self.thermal = Some(ThermalState {
            temperature_c: params.initial_temperature_c,
            enthalpy_j,
            initial_enthalpy_j: enthalpy_j,
            params,
        });
        self
    }

    pub fn max_volume_m3(&self) -> f64 {
        self.max_volume_m3
    }

    pub fn level(&self) -> f64 {
        (self.volume_m3 / self.max_volume_m3).clamp(0.0, 1.0)
    }

    pub fn is_overflow(&self) -> bool {
        self.volume_m3 >= self.max_volume_m3 - 1e-6
    }

    pub fn status(&self) -> TankStatus {
        if self.volume_m3 <= VOLUME_EPSILON {
            TankStatus::Empty
        } else if self.is_overflow() {
            TankStatus::Full
        } else {
            let level = self.level();
            if level < self.low_threshold {
                TankStatus::Low
            } else if level > self.high_threshold {
                TankStatus::High
            } else {
                TankStatus::Normal
            }
        }
    }

    pub fn temperature_c(&self) -> Option<f64> {
        self.thermal.as_ref().map(|t| t.temperature_c)
    }

    /// Advance the mass balance (and energy balance when configured) by one
    /// explicit-Euler step.
    ///
    /// `inlet_temp_c` is the temperature of the nearest upstream component
    /// exposing one; when absent the inflow is assumed to arrive at tank
    /// temperature (no thermal forcing from inflow).
    pub fn integrate(
        &mut self,
        dt_s: f64,
        q_in_m3s: f64,
        q_out_m3s: f64,
        inlet_temp_c: Option<f64>,
        fluid_density_kgm3: f64,
        ambient_temp_c: f64,
    ) {
        let dv = (q_in_m3s - q_out_m3s) * dt_s;
        // A non-finite delta (unbounded feed plumbed straight into the
        // tank) retains the previous volume rather than corrupting it.
        if dv.is_finite() {
            self.volume_m3 = (self.volume_m3 + dv).clamp(0.0, self.max_volume_m3);
        }

        let Some(thermal) = self.thermal.as_mut() else {
            return;
        };
        if !q_in_m3s.is_finite() || !q_out_m3s.is_finite() {
            return;
        }

        let cp = thermal.params.specific_heat_j_kgk;
        let t_inlet = inlet_temp_c.unwrap_or(thermal.temperature_c);
        let h_in = q_in_m3s * fluid_density_kgm3 * cp * t_inlet;
        let h_out = q_out_m3s * fluid_density_kgm3 * cp * thermal.temperature_c;
        let q_heat = thermal.params.heat_coeff_w_m2k
            * thermal.params.surface_area_m2
            * (ambient_temp_c - thermal.temperature_c);

        thermal.enthalpy_j = (thermal.enthalpy_j + (h_in - h_out + q_heat) * dt_s).max(0.0);

        let mass_kg = self.volume_m3 * fluid_density_kgm3;
        if mass_kg > VOLUME_EPSILON {
            // Hold the previous temperature when effectively empty.
            thermal.temperature_c = thermal.enthalpy_j / (mass_kg * cp);
        }
    }

    pub fn reset(&mut self) {
        self.volume_m3 = self.initial_volume_m3;
        if let Some(thermal) = self.thermal.as_mut() {
            thermal.temperature_c = thermal.params.initial_temperature_c;
            thermal.enthalpy_j = thermal.initial_enthalpy_j;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "volume_m3", self.volume_m3);
        put(&mut snap, "max_volume_m3", self.max_volume_m3);
        put(&mut snap, "level", self.level());
        put(&mut snap, "status", self.status().as_str());
        put(&mut snap, "overflow", self.is_overflow());
        if let Some(thermal) = &self.thermal {
            put(&mut snap, "temperature_c", thermal.temperature_c);
            put(&mut snap, "enthalpy_j", thermal.enthalpy_j);
        }
        snap
    }
}
