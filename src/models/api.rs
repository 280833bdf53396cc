use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::solar::{ClimateType, SunriseSunset, TransmittanceComponents};

// ─── Health ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub sites: usize,
    /// Sites whose yearly report has been precomputed
    pub reports_ready: usize,
}

// ─── Per-site responses ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransmittanceResponse {
    pub site_id: String,
    #[schema(value_type = String)]
    pub climate: ClimateType,
    pub altitude_m: f64,
    pub components: TransmittanceComponents,
}

/// Sun geometry and attenuation at one instant.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeometryResponse {
    pub site_id: String,
    pub day_of_year: i32,
    /// Seconds since local solar midnight
    pub solar_time: f64,
    /// Radians
    pub declination: f64,
    /// Radians, negative before noon
    pub hour_angle: f64,
    /// Radians
    pub zenith_angle: f64,
    pub sunrise_sunset: SunriseSunset,
    /// MW/m²
    pub extraterrestrial_irradiance: f64,
    pub transmittance: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IrradiationResponse {
    pub site_id: String,
    pub day_of_year: i32,
    pub tilt_degrees: f64,
    /// MJ/m²
    pub total_irradiation: f64,
}

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GeometryQuery {
    /// Seconds since solar midnight, defaults to solar noon
    pub solar_time: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IrradiationQuery {
    /// Panel tilt in degrees
    pub tilt: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// csv, json or xml; defaults to json
    pub format: Option<String>,
    pub from_day: Option<i32>,
    /// Exclusive
    pub to_day: Option<i32>,
}

impl ReportQuery {
    pub fn has_range(&self) -> bool {
        self.from_day.is_some() || self.to_day.is_some()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

