use std::f64::consts::PI;

use crate::services::sun_position::DAYS_PER_YEAR;

// ─── Physical constants ──────────────────────────────────────
/// Solar constant in MW/m². Must stay in step with
/// [`crate::services::irradiation::OMEGA`] so daily totals come out in MJ/m².
pub const SOLAR_CONSTANT: f64 = 1.367e-3;
/// Amplitude of the Earth–Sun distance correction
const ORBITAL_ECCENTRICITY_FACTOR: f64 = 0.033;

/// Extraterrestrial irradiance in MW/m²:
/// `I(n) = SC·(1 + 0.033·cos(2πn/365))`.
pub fn extraterrestrial_irradiance(day_of_year: i32) -> f64 {
    let phase = 2.0 * PI * f64::from(day_of_year) / DAYS_PER_YEAR;
    SOLAR_CONSTANT * (1.0 + ORBITAL_ECCENTRICITY_FACTOR * phase.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_days() {
        let cases: &[(i32, f64)] = &[
            (1, 0.001411444),
            (81, 0.001374918),
            (172, 0.00132262),
            (264, 0.001359464),
            (355, 0.001412104),
        ];
        for &(day, expected) in cases {
            assert_approx!(extraterrestrial_irradiance(day), expected, 1e-5);
        }
    }

    #[test]
    fn test_extremes_near_perihelion_and_aphelion() {
        let values: Vec<(i32, f64)> =
            (1..=365).map(|n| (n, extraterrestrial_irradiance(n))).collect();
        let (max_day, _) = values
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        let (min_day, _) = values
            .iter()
            .copied()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!(max_day <= 2 || max_day >= 355, "max at day {max_day}");
        assert!((170..=190).contains(&min_day), "min at day {min_day}");
    }

    #[test]
    fn test_bounded_by_eccentricity() {
        for n in 1..=365 {
            let v = extraterrestrial_irradiance(n);
            assert!(v <= SOLAR_CONSTANT * 1.033 + 1e-15);
            assert!(v >= SOLAR_CONSTANT * 0.967 - 1e-15);
        }
    }
}
