//! Pipe: passive conductor with presentation-adjacent derived quantities.
//!
//! A pipe never produces flow. Each tick it reads the resolved flow passing
//! through it and derives velocity, Reynolds number, regime, and a cosmetic
//! Darcy-Weisbach pressure drop for display.

use hn_graph::{Category, Meta};

use crate::common::{check_positive, Fluid};
use crate::error::ComponentResult;
use crate::snapshot::{put, Snapshot};

const RE_LAMINAR_MAX: f64 = 2300.0;
const RE_TURBULENT_MIN: f64 = 4000.0;

/// Flow regime classification from Reynolds number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRegime {
    Stagnant,
    Laminar,
    Transitional,
    Turbulent,
}

impl FlowRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowRegime::Stagnant => "stagnant",
            FlowRegime::Laminar => "laminar",
            FlowRegime::Transitional => "transitional",
            FlowRegime::Turbulent => "turbulent",
        }
    }

    fn classify(reynolds: f64) -> Self {
        if reynolds <= 0.0 {
            FlowRegime::Stagnant
        } else if reynolds < RE_LAMINAR_MAX {
            FlowRegime::Laminar
        } else if reynolds < RE_TURBULENT_MIN {
            FlowRegime::Transitional
        } else {
            FlowRegime::Turbulent
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipe {
    pub meta: Meta,
    pub diameter_m: f64,
    pub length_m: f64,
    pub roughness_m: f64,
    // Derived each tick, read-only outputs of the core.
    pub observed_flow_m3s: f64,
    pub velocity_mps: f64,
    pub reynolds: f64,
    pub regime: FlowRegime,
    pub pressure_drop_pa: f64,
}

impl Pipe {
    pub fn new(
        id: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        diameter_m: f64,
        length_m: f64,
        roughness_m: f64,
    ) -> ComponentResult<Self> {
        let diameter_m = check_positive(diameter_m, "pipe diameter must be positive")?;
        let length_m = check_positive(length_m, "pipe length must be positive")?;
        Ok(Self {
            meta: Meta::new(id, Category::Pipe, inputs, outputs),
            diameter_m,
            length_m,
            roughness_m: roughness_m.max(0.0),
            observed_flow_m3s: 0.0,
            velocity_mps: 0.0,
            reynolds: 0.0,
            regime: FlowRegime::Stagnant,
            pressure_drop_pa: 0.0,
        })
    }

    pub fn cross_section_m2(&self) -> f64 {
        std::f64::consts::PI * self.diameter_m * self.diameter_m / 4.0
    }

    /// Friction factor: laminar 64/Re, turbulent Swamee-Jain.
    fn friction_factor(&self, reynolds: f64) -> f64 {
        if reynolds < RE_LAMINAR_MAX {
            64.0 / reynolds
        } else {
            let e_d = self.roughness_m / self.diameter_m;
            let a = e_d / 3.7;
            let b = 5.74 / reynolds.powf(0.9);
            let f = 0.25 / (a + b).log10().powi(2);
            f.max(1e-4)
        }
    }

    /// Derive display quantities from the flow the resolver attributed to
    /// this pipe.
    pub fn integrate(&mut self, _dt_s: f64, flow_m3s: f64, fluid: &Fluid) {
        if !flow_m3s.is_finite() {
            // Retain the previous derived values.
            return;
        }
        self.observed_flow_m3s = flow_m3s;
        self.velocity_mps = flow_m3s / self.cross_section_m2();
        self.reynolds =
            fluid.density_kgm3 * self.velocity_mps.abs() * self.diameter_m / fluid.viscosity_pas;
        self.regime = FlowRegime::classify(self.reynolds);

        self.pressure_drop_pa = if self.reynolds > 0.0 {
            let f = self.friction_factor(self.reynolds);
            f * (self.length_m / self.diameter_m)
                * 0.5
                * fluid.density_kgm3
                * self.velocity_mps.powi(2)
        } else {
            0.0
        };
    }

    pub fn reset(&mut self) {
        self.observed_flow_m3s = 0.0;
        self.velocity_mps = 0.0;
        self.reynolds = 0.0;
        self.regime = FlowRegime::Stagnant;
        self.pressure_drop_pa = 0.0;
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        put(&mut snap, "flow_m3s", self.observed_flow_m3s);
        put(&mut snap, "velocity_mps", self.velocity_mps);
        put(&mut snap, "reynolds", self.reynolds);
        put(&mut snap, "regime", self.regime.as_str());
        put(&mut snap, "pressure_drop_pa", self.pressure_drop_pa);
        snap
    }
}
