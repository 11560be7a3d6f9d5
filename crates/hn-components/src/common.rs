//! Shared fluid constants and small helpers for component calculations.

use crate::error::{ComponentError, ComponentResult};
use hn_core::ensure_finite;

/// Bulk fluid properties, fixed for a simulation run. Plain constants, not
/// a property backend.
#[derive(Clone, Copy, Debug)]
pub struct Fluid {
    /// Density in kg/m³.
    pub density_kgm3: f64,
    /// Dynamic viscosity in Pa·s.
    pub viscosity_pas: f64,
}

impl Default for Fluid {
    fn default() -> Self {
        // Water at roughly 20 °C.
        Self {
            density_kgm3: 998.0,
            viscosity_pas: 1.0e-3,
        }
    }
}

/// Require a strictly positive, finite parameter.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    let value = ensure_finite(value, what).map_err(|_| ComponentError::InvalidArg { what })?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_positive_rejects_zero() {
        assert!(check_positive(0.5, "x").is_ok());
        assert!(check_positive(0.0, "x").is_err());
        assert!(check_positive(-1.0, "x").is_err());
    }

    #[test]
    fn check_positive_rejects_non_finite() {
        assert!(check_positive(f64::NAN, "x").is_err());
        assert!(check_positive(f64::INFINITY, "x").is_err());
    }
}
