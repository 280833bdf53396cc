//! ============================================================
//!  Hottel clear-sky beam transmittance model
//!
//!   1. Altitude baseline  – quadratic fits in altitude (km) for
//!                           a0*, a1*, k*
//!   2. Climate correction – fixed (r0, r1, rk) per climate type
//!   3. Components         – a0 = r0·a0*, a1 = r1·a1*, k = rk·k*
//! ============================================================

use crate::error::Result;
use crate::models::solar::{ClimateType, TransmittanceComponents};

fn to_km(altitude_m: f64) -> f64 {
    altitude_m / 1000.0
}

/// `a0* = 0.4237 − 0.00821·(6 − A)²`
fn a0_star(altitude_km: f64) -> f64 {
    0.4237 - 0.00821 * (6.0 - altitude_km).powi(2)
}

/// `a1* = 0.5055 + 0.00595·(6.5 − A)²`
fn a1_star(altitude_km: f64) -> f64 {
    0.5055 + 0.00595 * (6.5 - altitude_km).powi(2)
}

/// `k* = 0.2711 + 0.01858·(2.5 − A)²`
fn k_star(altitude_km: f64) -> f64 {
    0.2711 + 0.01858 * (2.5 - altitude_km).powi(2)
}

impl ClimateType {
    /// Transmittance components for an observer at `altitude_m` meters.
    ///
    /// No range check on the altitude: values outside the model's calibrated
    /// band (0–2.5 km) are evaluated as given.
    pub fn transmittance_components(self, altitude_m: f64) -> TransmittanceComponents {
        let altitude_km = to_km(altitude_m);
        let ratios = self.correction_ratios();
        TransmittanceComponents {
            a0: ratios.r0 * a0_star(altitude_km),
            a1: ratios.r1 * a1_star(altitude_km),
            k: ratios.rk * k_star(altitude_km),
        }
    }
}

/// Parse `climate` and compute its components.
///
/// Fails with [`crate::SolarError::InvalidClimateType`] for unknown names.
pub fn transmittance_components(climate: &str, altitude_m: f64) -> Result<TransmittanceComponents> {
    let climate: ClimateType = climate.parse()?;
    Ok(climate.transmittance_components(altitude_m))
}
