//! Solar panel orientation engine.
//!
//! Sun geometry, a Hottel clear-sky transmittance model and a daily
//! irradiation integral, combined into a search for the fixed panel tilt
//! that collects the most direct-beam energy on a given day of year.
//! The `services` module holds the engine; the HTTP layer (`controllers`,
//! `routes`, `api_docs`) and the report/plot writers sit on top of it.

#[cfg(test)]
macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l,
            r,
            (l - r).abs(),
            $tol
        );
    };
}

pub mod api_docs;
pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod shared_state;

pub use error::{Result, SolarError};
pub use models::solar::{
    ClimateType, GeoLocation, OptimizationResult, SunriseSunset, TransmittanceComponents,
};
pub use services::atmospheric_transmission::AtmosphericTransmission;
pub use services::hottel_model::transmittance_components;
pub use services::irradiance::extraterrestrial_irradiance;
pub use services::irradiation::IrradiationCalculator;
pub use services::observer::Observer;
pub use services::sun_position::{hour_angle, solar_declination, solar_time};
