use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, SolarError};

// ─── Climate classification ──────────────────────────────────────────────────

/// Hottel climate categories. Each one scales the altitude baseline of the
/// clear-sky transmittance components by a fixed `(r0, r1, rk)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClimateType {
    Tropical,
    MidlatitudeSummer,
    SubarcticSummer,
    MidlatitudeWinter,
}

/// Correction ratios applied to `(a0*, a1*, k*)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionRatios {
    pub r0: f64,
    pub r1: f64,
    pub rk: f64,
}

// Indexed by `ClimateType as usize`.
static CORRECTION_RATIOS: [CorrectionRatios; 4] = [
    CorrectionRatios { r0: 0.95, r1: 0.98, rk: 1.02 },
    CorrectionRatios { r0: 0.97, r1: 0.99, rk: 1.02 },
    CorrectionRatios { r0: 0.99, r1: 0.99, rk: 1.01 },
    CorrectionRatios { r0: 1.03, r1: 1.01, rk: 1.00 },
];

impl ClimateType {
    pub const ALL: [ClimateType; 4] = [
        ClimateType::Tropical,
        ClimateType::MidlatitudeSummer,
        ClimateType::SubarcticSummer,
        ClimateType::MidlatitudeWinter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClimateType::Tropical => "TROPICAL",
            ClimateType::MidlatitudeSummer => "MIDLATITUDE SUMMER",
            ClimateType::SubarcticSummer => "SUBARCTIC SUMMER",
            ClimateType::MidlatitudeWinter => "MIDLATITUDE WINTER",
        }
    }

    pub fn correction_ratios(self) -> CorrectionRatios {
        CORRECTION_RATIOS[self as usize]
    }

    /// Comma separated list of accepted names, used in error messages.
    pub fn valid_names() -> String {
        Self::ALL.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ClimateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClimateType {
    type Err = SolarError;

    /// Case-insensitive; `MIDLATITUDE_SUMMER` and `midlatitude summer` are the same.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace('_', " ").to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| SolarError::InvalidClimateType(s.to_string()))
    }
}

impl TryFrom<String> for ClimateType {
    type Error = SolarError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClimateType> for String {
    fn from(value: ClimateType) -> Self {
        value.name().to_string()
    }
}

// ─── Observer location ───────────────────────────────────────────────────────

/// Latitude bound applied when no explicit policy is configured (degrees).
pub const DEFAULT_LATITUDE_LIMIT: f64 = 88.0;

/// Hard ceiling for any configured bound; `tan(φ)` diverges at the poles.
pub const MAX_LATITUDE_LIMIT: f64 = 89.9;

/// A validated observer position. Angles are stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoLocation {
    /// Latitude in radians
    latitude: f64,
    /// Longitude in radians; informational only, solar time is local
    longitude: Option<f64>,
}

impl GeoLocation {
    /// Build from degrees, rejecting latitudes beyond ±88°.
    pub fn new(latitude_deg: f64, longitude_deg: Option<f64>) -> Result<Self> {
        Self::with_limit(latitude_deg, longitude_deg, DEFAULT_LATITUDE_LIMIT)
    }

    /// Build from degrees with a caller supplied latitude bound.
    ///
    /// The bound itself is capped at [`MAX_LATITUDE_LIMIT`].
    pub fn with_limit(
        latitude_deg: f64,
        longitude_deg: Option<f64>,
        limit_deg: f64,
    ) -> Result<Self> {
        let limit = limit_deg.abs().min(MAX_LATITUDE_LIMIT);
        if !latitude_deg.is_finite() || latitude_deg.abs() > limit {
            return Err(SolarError::InvalidLatitude {
                latitude: latitude_deg,
                limit,
            });
        }
        Ok(Self {
            latitude: latitude_deg.to_radians(),
            longitude: longitude_deg.map(f64::to_radians),
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}

// ─── Derived values ──────────────────────────────────────────────────────────

/// Clear-sky beam transmittance components `(a0, a1, k)`.
///
/// Depends only on climate and altitude, so it is computed once and reused
/// for every instant of every day at that site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransmittanceComponents {
    pub a0: f64,
    pub a1: f64,
    pub k: f64,
}

impl TransmittanceComponents {
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.a0, self.a1, self.k)
    }
}

/// Sunrise and sunset hour angles in radians (sunrise = -sunset).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SunriseSunset {
    pub sunrise: f64,
    pub sunset: f64,
}

impl SunriseSunset {
    /// Width of the sunlit window in radians of hour angle.
    pub fn span(&self) -> f64 {
        self.sunset - self.sunrise
    }

    pub fn is_polar_night(&self) -> bool {
        self.span() <= 0.0
    }
}

/// Best fixed tilt for one day and the energy it collects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OptimizationResult {
    pub day_of_year: i32,
    /// Signed panel tilt in degrees
    pub optimal_tilt_degrees: f64,
    /// Direct irradiation in MJ/m² at that tilt
    pub total_irradiation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climate_parse_is_case_insensitive() {
        assert_eq!("tropical".parse::<ClimateType>().unwrap(), ClimateType::Tropical);
        assert_eq!(
            "Midlatitude Summer".parse::<ClimateType>().unwrap(),
            ClimateType::MidlatitudeSummer
        );
        assert_eq!(
            "SUBARCTIC_SUMMER".parse::<ClimateType>().unwrap(),
            ClimateType::SubarcticSummer
        );
        assert_eq!(
            " midlatitude winter ".parse::<ClimateType>().unwrap(),
            ClimateType::MidlatitudeWinter
        );
    }

    #[test]
    fn test_climate_parse_rejects_unknown() {
        let err = "INVALID".parse::<ClimateType>().unwrap_err();
        assert_eq!(err, SolarError::InvalidClimateType("INVALID".to_string()));
    }

    #[test]
    fn test_climate_serde_uses_display_names() {
        let json = serde_json::to_string(&ClimateType::MidlatitudeWinter).unwrap();
        assert_eq!(json, "\"MIDLATITUDE WINTER\"");
        let back: ClimateType = serde_json::from_str("\"midlatitude_winter\"").unwrap();
        assert_eq!(back, ClimateType::MidlatitudeWinter);
        assert!(serde_json::from_str::<ClimateType>("\"ARCTIC\"").is_err());
    }

    #[test]
    fn test_correction_table_matches_names() {
        let tropical = ClimateType::Tropical.correction_ratios();
        assert_eq!((tropical.r0, tropical.r1, tropical.rk), (0.95, 0.98, 1.02));
        let winter = ClimateType::MidlatitudeWinter.correction_ratios();
        assert_eq!((winter.r0, winter.r1, winter.rk), (1.03, 1.01, 1.00));
    }

    #[test]
    fn test_geolocation_converts_to_radians() {
        let loc = GeoLocation::new(35.69, Some(51.39)).unwrap();
        assert_approx!(loc.latitude(), 35.69_f64.to_radians(), 1e-12);
        assert_approx!(loc.longitude().unwrap(), 51.39_f64.to_radians(), 1e-12);
        assert_approx!(loc.latitude_degrees(), 35.69, 1e-9);
    }

    #[test]
    fn test_geolocation_rejects_out_of_domain_latitude() {
        for lat in [89.0, -89.0, 90.0, f64::NAN, f64::INFINITY] {
            assert!(GeoLocation::new(lat, None).is_err(), "latitude {lat} accepted");
        }
        assert!(GeoLocation::new(88.0, None).is_ok());
        assert!(GeoLocation::new(-88.0, None).is_ok());
    }

    #[test]
    fn test_geolocation_limit_is_configurable_but_capped() {
        assert!(GeoLocation::with_limit(70.0, None, 60.0).is_err());
        assert!(GeoLocation::with_limit(89.5, None, 89.8).is_ok());
        match GeoLocation::with_limit(90.0, None, 120.0) {
            Err(SolarError::InvalidLatitude { limit, .. }) => assert_eq!(limit, MAX_LATITUDE_LIMIT),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sunrise_sunset_span() {
        let window = SunriseSunset { sunrise: -1.2, sunset: 1.2 };
        assert_approx!(window.span(), 2.4, 1e-12);
        assert!(!window.is_polar_night());
        assert!(SunriseSunset { sunrise: 0.0, sunset: 0.0 }.is_polar_night());
    }
}
