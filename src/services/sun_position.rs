use std::f64::consts::PI;

// ─── Constants ───────────────────────────────────────────────────────────────
/// Maximum tilt of the Earth's axis (degrees)
pub const EARTH_AXIAL_TILT: f64 = 23.45;
/// Offset that puts zero declination on the March equinox
pub const EQUINOX_OFFSET_DAYS: i32 = 284;
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Solar time of solar noon, where the hour angle is zero (seconds)
pub const SOLAR_NOON: f64 = 43_200.0;

/// Solar declination in radians: `δ = 23.45°·sin(2π(284 + n)/365)`.
///
/// Defined for any integer day; periodic with period 365.
pub fn solar_declination(day_of_year: i32) -> f64 {
    let phase = 2.0 * PI * f64::from(EQUINOX_OFFSET_DAYS + day_of_year) / DAYS_PER_YEAR;
    EARTH_AXIAL_TILT.to_radians() * phase.sin()
}

/// Hour angle in radians for a solar time in seconds since midnight.
/// Negative before solar noon, positive after.
pub fn hour_angle(solar_time: f64) -> f64 {
    (solar_time - SOLAR_NOON) * (PI / SOLAR_NOON)
}

/// Inverse of [`hour_angle`]: seconds since midnight.
pub fn solar_time(hour_angle: f64) -> f64 {
    hour_angle * (SOLAR_NOON / PI) + SOLAR_NOON
}
