use thiserror::Error;

use crate::models::solar::ClimateType;

/// Errors raised by the irradiation engine.
///
/// Configuration problems only: numeric edge cases (sun on the horizon,
/// polar day/night, odd Simpson interval counts) are handled in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolarError {
    #[error("Invalid climate type: {0}. Valid climate types are {valid}", valid = ClimateType::valid_names())]
    InvalidClimateType(String),

    #[error(
        "Missing required data: Observer latitude. Please ensure to provide the latitude of the observer."
    )]
    MissingLatitude,

    #[error(
        "Invalid data: Observer latitude {latitude}. Please ensure to provide a latitude between -{limit} and {limit} degrees."
    )]
    InvalidLatitude { latitude: f64, limit: f64 },
}

pub type Result<T> = std::result::Result<T, SolarError>;
