//! Fixed-step quadrature and bounded scalar minimisation.

/// Composite Simpson rule over equally spaced samples `y` with spacing `dx`.
///
/// * fewer than 2 samples: `0.0`
/// * 2 samples: trapezoid
/// * odd sample count (even interval count): plain composite Simpson
/// * even sample count: Simpson over the first `n - 1` samples, then the last
///   interval from the quadratic through the final three samples
///   (`dx/12·(5y[n-1] + 8y[n-2] − y[n-3])`)
///
/// Samples are summed in index order so the result is reproducible.
pub fn simpson(y: &[f64], dx: f64) -> f64 {
    let n = y.len();
    match n {
        0 | 1 => 0.0,
        2 => 0.5 * dx * (y[0] + y[1]),
        _ if n % 2 == 1 => basic_simpson(y, dx),
        _ => {
            let head = basic_simpson(&y[..n - 1], dx);
            let tail = dx / 12.0 * (5.0 * y[n - 1] + 8.0 * y[n - 2] - y[n - 3]);
            head + tail
        }
    }
}

// Requires an odd number of samples.
fn basic_simpson(y: &[f64], dx: f64) -> f64 {
    let mut sum = 0.0;
    let mut i = 0;
    while i + 2 < y.len() {
        sum += y[i] + 4.0 * y[i + 1] + y[i + 2];
        i += 2;
    }
    sum * dx / 3.0
}

/// Settings for [`minimize_bounded`].
#[derive(Debug, Clone, Copy)]
pub struct BoundedOptions {
    /// Absolute tolerance on the abscissa
    pub xatol: f64,
    /// Maximum number of function evaluations
    pub max_evaluations: usize,
}

impl Default for BoundedOptions {
    fn default() -> Self {
        Self {
            xatol: 1e-5,
            max_evaluations: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedMinimum {
    pub x: f64,
    pub fun: f64,
    pub evaluations: usize,
    /// False when the evaluation budget ran out first
    pub converged: bool,
}

/// Brent's bounded minimisation on `[lower, upper]`: golden-section steps,
/// with parabolic interpolation whenever the parabola is well behaved.
///
/// Finds a local minimum; for a flat objective the iterate drifts to the
/// upper bound.
pub fn minimize_bounded<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    options: BoundedOptions,
) -> BoundedMinimum
where
    F: FnMut(f64) -> f64,
{
    let sqrt_eps = f64::EPSILON.sqrt();
    let golden_mean = 0.5 * (3.0 - 5.0_f64.sqrt());

    let (mut a, mut b) = (lower, upper);
    let mut fulc = a + golden_mean * (b - a);
    let (mut nfc, mut xf) = (fulc, fulc);
    let (mut rat, mut e) = (0.0_f64, 0.0_f64);
    let mut fx = f(xf);
    let mut evaluations = 1;
    let (mut ffulc, mut fnfc) = (fx, fx);

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + options.xatol / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut golden = true;

        if e.abs() > tol1 {
            golden = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = if xm >= xf { tol1 } else { -tol1 };
                }
            } else {
                golden = true;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden_mean * e;
        }

        let step = if rat >= 0.0 { 1.0 } else { -1.0 };
        let x = xf + step * rat.abs().max(tol1);
        let fu = f(x);
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            (fulc, ffulc) = (nfc, fnfc);
            (nfc, fnfc) = (xf, fx);
            (xf, fx) = (x, fu);
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                (fulc, ffulc) = (nfc, fnfc);
                (nfc, fnfc) = (x, fu);
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                (fulc, ffulc) = (x, fu);
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + options.xatol / 3.0;
        tol2 = 2.0 * tol1;

        if evaluations >= options.max_evaluations {
            converged = false;
            break;
        }
    }

    BoundedMinimum {
        x: xf,
        fun: fx,
        evaluations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_simpson_is_exact_for_quadratics() {
        // odd sample count
        let y: Vec<f64> = (0..5).map(|x| (x * x) as f64).collect();
        assert_approx!(simpson(&y, 1.0), 64.0 / 3.0, 1e-12);
        // even sample count uses the quadratic tail, still exact
        let y: Vec<f64> = (0..4).map(|x| (x * x) as f64).collect();
        assert_approx!(simpson(&y, 1.0), 9.0, 1e-12);
    }

    #[test]
    fn test_simpson_small_inputs() {
        assert_eq!(simpson(&[], 0.01), 0.0);
        assert_eq!(simpson(&[3.0], 0.01), 0.0);
        assert_approx!(simpson(&[1.0, 3.0], 0.5), 1.0, 1e-12);
    }

    #[test]
    fn test_simpson_even_count_cubic_tail() {
        // x^3 on 0..=3: the quadratic tail is not exact for a cubic
        let y = [0.0, 1.0, 8.0, 27.0];
        assert_approx!(simpson(&y, 1.0), 20.5, 1e-12);
    }

    #[test]
    fn test_simpson_converges_on_sine() {
        let dx = 0.01;
        let n = (PI / dx).ceil() as usize;
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * dx).sin()).collect();
        // last sample sits just below π, so the integral is ~2
        assert_approx!(simpson(&y, dx), 2.0, 1e-4);
    }

    #[test]
    fn test_minimize_parabola() {
        let res = minimize_bounded(|x| (x - 1.5).powi(2), 0.0, 4.0, BoundedOptions::default());
        assert!(res.converged);
        assert_approx!(res.x, 1.5, 1e-5);
        assert_approx!(res.fun, 0.0, 1e-9);
    }

    #[test]
    fn test_minimize_boundary_optimum() {
        let res = minimize_bounded(|x| (x + 5.0).powi(2), -2.0, 3.0, BoundedOptions::default());
        assert_approx!(res.x, -2.0, 1e-4);
    }

    #[test]
    fn test_minimize_cosine() {
        let res = minimize_bounded(f64::cos, 0.0, 2.0 * PI, BoundedOptions::default());
        assert_approx!(res.x, PI, 1e-5);
    }

    #[test]
    fn test_flat_objective_drifts_to_upper_bound() {
        let res = minimize_bounded(|_| 0.0, -PI / 2.0, PI / 2.0, BoundedOptions::default());
        assert_approx!(res.x, PI / 2.0, 1e-4);
    }

    #[test]
    fn test_evaluation_budget() {
        let options = BoundedOptions {
            xatol: 1e-12,
            max_evaluations: 5,
        };
        let mut calls = 0;
        let res = minimize_bounded(
            |x| {
                calls += 1;
                (x - 0.3).abs()
            },
            0.0,
            1.0,
            options,
        );
        assert_eq!(res.evaluations, 5);
        assert_eq!(calls, 5);
        assert!(!res.converged);
    }

    #[test]
    fn test_maximize_like_golden_section() {
        let objective = |x: f64| -(-(x - 3.0).powi(2) + 10.0);
        let res = minimize_bounded(objective, 0.0, 6.0, BoundedOptions::default());
        assert_approx!(res.x, 3.0, 1e-5);
        assert_approx!(-res.fun, 10.0, 1e-9);
    }
}
