use crate::error::{Result, SolarError};
use crate::models::solar::{GeoLocation, SunriseSunset};
use crate::services::sun_position::{hour_angle, solar_declination};

/// Horizontal-frame geometry for an observer.
///
/// An observer may be created without a position; every angle that needs
/// the latitude then fails with [`SolarError::MissingLatitude`] instead of
/// falling back to a default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    location: Option<GeoLocation>,
}

impl Observer {
    pub fn new(location: GeoLocation) -> Self {
        Self {
            location: Some(location),
        }
    }

    /// Build from optional degrees. A supplied latitude is validated here.
    pub fn from_degrees(latitude_deg: Option<f64>, longitude_deg: Option<f64>) -> Result<Self> {
        let location = latitude_deg
            .map(|lat| GeoLocation::new(lat, longitude_deg))
            .transpose()?;
        Ok(Self { location })
    }

    pub fn location(&self) -> Option<&GeoLocation> {
        self.location.as_ref()
    }

    fn latitude(&self) -> Result<f64> {
        self.location
            .map(|loc| loc.latitude())
            .ok_or(SolarError::MissingLatitude)
    }

    /// Solar zenith angle in radians at a solar time given in seconds.
    pub fn zenith_angle(&self, day_of_year: i32, solar_time: f64) -> Result<f64> {
        Ok(zenith_angle_at(self.latitude()?, day_of_year, solar_time))
    }

    /// Hour angles of sunrise and sunset.
    ///
    /// Polar day gives `(-π, π)` and polar night `(0, 0)`.
    pub fn sunrise_sunset(&self, day_of_year: i32) -> Result<SunriseSunset> {
        Ok(sunrise_sunset_at(self.latitude()?, day_of_year))
    }
}

/// `cos θz = sin φ·sin δ + cos φ·cos δ·cos ω`, latitude in radians.
pub(crate) fn zenith_angle_at(latitude: f64, day_of_year: i32, solar_time: f64) -> f64 {
    let declination = solar_declination(day_of_year);
    let omega = hour_angle(solar_time);
    let cos_zenith = latitude.sin() * declination.sin()
        + latitude.cos() * declination.cos() * omega.cos();
    cos_zenith.clamp(-1.0, 1.0).acos()
}

/// `cos ω = -tan φ·tan δ`, clamped so polar day and night stay defined.
pub(crate) fn sunrise_sunset_at(latitude: f64, day_of_year: i32) -> SunriseSunset {
    let declination = solar_declination(day_of_year);
    let cos_omega = -latitude.tan() * declination.tan();
    let omega = cos_omega.clamp(-1.0, 1.0).acos();
    SunriseSunset {
        sunrise: -omega,
        sunset: omega,
    }
}
