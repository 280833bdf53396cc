//! ============================================================
//!  Daily direct irradiation and optimal fixed tilt
//!
//!   E(n, β) = I(n)/Ω · ∫ cos θ · H(cos θ) · τb dω   over [ωs, ωt)
//!
//!   cos θ = sin δ · sin(φ − β) + cos δ · cos ω · cos(φ − β)
//!
//!   The integral is sampled every 0.01 rad of hour angle and summed with
//!   composite Simpson; the tilt search maximises E over β ∈ [−90°, 90°].
//! ============================================================

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::models::solar::{ClimateType, GeoLocation, OptimizationResult, SunriseSunset};
use crate::services::atmospheric_transmission::AtmosphericTransmission;
use crate::services::irradiance::extraterrestrial_irradiance;
use crate::services::numeric::{BoundedOptions, minimize_bounded, simpson};
use crate::services::observer::sunrise_sunset_at;
use crate::services::sun_position::{solar_declination, solar_time};

// ─── Constants ───────────────────────────────────────────────
/// Angular rate (rad/s) converting the hour-angle integral to seconds
pub const OMEGA: f64 = 7.15e-5;
/// Hour-angle sampling step (rad)
pub const INTEGRATION_STEP: f64 = 0.01;

/// Day-level quantities shared by every sample of one integral.
#[derive(Debug, Clone, Copy)]
struct DayGeometry {
    day_of_year: i32,
    declination: f64,
    irradiance: f64,
}

impl DayGeometry {
    fn new(day_of_year: i32) -> Self {
        Self {
            day_of_year,
            declination: solar_declination(day_of_year),
            irradiance: extraterrestrial_irradiance(day_of_year),
        }
    }
}

/// Finds the optimal orientation and computes daily direct irradiation for
/// a flat panel at one site.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradiationCalculator {
    climate: ClimateType,
    altitude_m: f64,
    location: GeoLocation,
    transmission: AtmosphericTransmission,
}

impl IrradiationCalculator {
    pub fn new(climate: ClimateType, altitude_m: f64, location: GeoLocation) -> Self {
        Self {
            climate,
            altitude_m,
            location,
            transmission: AtmosphericTransmission::new(climate, altitude_m, location),
        }
    }

    /// Parse the climate name and validate the latitude (degrees).
    pub fn from_parts(climate: &str, altitude_m: f64, latitude_deg: f64) -> Result<Self> {
        let climate: ClimateType = climate.parse()?;
        Ok(Self::new(climate, altitude_m, GeoLocation::new(latitude_deg, None)?))
    }

    /// Build for a configured site, applying the configured latitude bound.
    pub fn for_site(site: &SiteConfig, latitude_limit: f64) -> Result<Self> {
        let location = GeoLocation::with_limit(site.latitude, site.longitude, latitude_limit)?;
        Ok(Self::new(site.climate, site.altitude_m, location))
    }

    pub fn climate(&self) -> ClimateType {
        self.climate
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }

    pub fn location(&self) -> &GeoLocation {
        &self.location
    }

    pub fn transmission(&self) -> &AtmosphericTransmission {
        &self.transmission
    }

    pub fn sunrise_sunset(&self, day_of_year: i32) -> SunriseSunset {
        sunrise_sunset_at(self.location.latitude(), day_of_year)
    }

    /// Instantaneous integrand at hour angle `hour_angle` for a panel tilted
    /// `tilt` radians. Zero whenever the sun is behind the panel.
    pub fn direct_irradiation_component(
        &self,
        hour_angle: f64,
        tilt: f64,
        day_of_year: i32,
    ) -> f64 {
        self.component(&DayGeometry::new(day_of_year), hour_angle, tilt)
    }

    fn component(&self, day: &DayGeometry, hour_angle: f64, tilt: f64) -> f64 {
        let relative = self.location.latitude() - tilt;
        let cos_theta = day.declination.sin() * relative.sin()
            + day.declination.cos() * hour_angle.cos() * relative.cos();
        // Heaviside cut-off before multiplying
        if cos_theta < 0.0 {
            return 0.0;
        }
        let transmittance = self
            .transmission
            .transmittance(day.day_of_year, solar_time(hour_angle));
        day.irradiance * transmittance * cos_theta / OMEGA
    }

    /// Total direct irradiation (MJ/m²) collected over one day by a panel
    /// fixed at `tilt_degrees`.
    pub fn total_direct_irradiation(&self, tilt_degrees: f64, day_of_year: i32) -> f64 {
        let tilt = tilt_degrees.to_radians();
        let day = DayGeometry::new(day_of_year);
        let window = self.sunrise_sunset(day_of_year);
        let samples: Vec<f64> = sample_hour_angles(window)
            .map(|omega| self.component(&day, omega, tilt))
            .collect();
        simpson(&samples, INTEGRATION_STEP)
    }

    /// Tilt in degrees maximising [`Self::total_direct_irradiation`] over
    /// `[-90°, 90°]`, found with a bounded Brent search.
    ///
    /// When no tilt collects anything (polar night) the search ends at +90°.
    pub fn find_optimal_tilt(&self, day_of_year: i32) -> f64 {
        let objective = |beta: f64| {
            let energy = self.total_direct_irradiation(beta.to_degrees(), day_of_year);
            #[cfg(feature = "verbose_log")]
            debug!(day_of_year, tilt_degrees = beta.to_degrees(), energy, "tilt evaluated");
            -energy
        };
        let best = minimize_bounded(objective, -FRAC_PI_2, FRAC_PI_2, BoundedOptions::default());
        if !best.converged {
            debug!(
                day_of_year,
                evaluations = best.evaluations,
                "tilt search stopped on evaluation budget"
            );
        }
        best.x.to_degrees()
    }

    /// Optimal tilt together with the irradiation it collects.
    pub fn optimize_day(&self, day_of_year: i32) -> OptimizationResult {
        let optimal_tilt_degrees = self.find_optimal_tilt(day_of_year);
        OptimizationResult {
            day_of_year,
            optimal_tilt_degrees,
            total_irradiation: self.total_direct_irradiation(optimal_tilt_degrees, day_of_year),
        }
    }
}

/// Hour angles `sunrise + i·step` strictly below sunset, in order.
fn sample_hour_angles(window: SunriseSunset) -> impl Iterator<Item = f64> {
    let count = (window.span() / INTEGRATION_STEP).ceil().max(0.0) as usize;
    let sunrise = window.sunrise;
    (0..count).map(move |i| sunrise + i as f64 * INTEGRATION_STEP)
}
