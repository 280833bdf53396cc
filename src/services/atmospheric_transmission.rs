use crate::error::Result;
use crate::models::solar::{ClimateType, GeoLocation, TransmittanceComponents};
use crate::services::observer::{Observer, zenith_angle_at};

/// Below this `|cos θz|` the sun is treated as sitting on the horizon.
const HORIZON_EPSILON: f64 = 1e-8;

/// Beam transmittance for one site.
///
/// The Hottel components are computed once here and reused for every
/// `(day, solar_time)` query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericTransmission {
    components: TransmittanceComponents,
    location: GeoLocation,
}

impl AtmosphericTransmission {
    pub fn new(climate: ClimateType, altitude_m: f64, location: GeoLocation) -> Self {
        Self {
            components: climate.transmittance_components(altitude_m),
            location,
        }
    }

    /// Parse the climate name and validate the latitude (degrees).
    pub fn from_parts(climate: &str, altitude_m: f64, latitude_deg: f64) -> Result<Self> {
        let climate: ClimateType = climate.parse()?;
        let location = GeoLocation::new(latitude_deg, None)?;
        Ok(Self::new(climate, altitude_m, location))
    }

    pub fn components(&self) -> TransmittanceComponents {
        self.components
    }

    pub fn observer(&self) -> Observer {
        Observer::new(self.location)
    }

    /// `τb = a0 + a1·exp(−k / cos θz)`.
    ///
    /// With the sun on the horizon the exponential term vanishes and `a0` is
    /// returned. The result is not clamped to `[0, 1]`.
    pub fn transmittance(&self, day_of_year: i32, solar_time: f64) -> f64 {
        let zenith = zenith_angle_at(self.location.latitude(), day_of_year, solar_time);
        let cos_zenith = zenith.cos();
        let TransmittanceComponents { a0, a1, k } = self.components;
        if cos_zenith.abs() < HORIZON_EPSILON {
            a0
        } else {
            a0 + a1 * (-k / cos_zenith).exp()
        }
    }
}
