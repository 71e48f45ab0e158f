//! Closed-form Gaussian CDF and inverse CDF.
//!
//! Both directions go through polynomial approximations of the error
//! function, so `inv_cdf(cdf(x))` is close to, but not exactly, `x`.

#![allow(clippy::excessive_precision)]

use crate::params::{GAUSSIAN_AVERAGE, GAUSSIAN_STD};

/// Error function, Abramowitz & Stegun formula 7.1.26.
///
/// Maximum absolute error is about `1.5e-7`.
#[inline]
pub fn erf(x: f32) -> f32 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = ((((1.061405429 * t - 1.453152027) * t + 1.421413741) * t - 0.284496736) * t
        + 0.254829592)
        * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Inverse error function for `x` in `(-1, 1)`.
///
/// Single-precision rational approximation with a central and a tail branch.
/// The endpoints map to infinities; callers keep `x` strictly inside.
#[inline]
pub fn erf_inv(x: f32) -> f32 {
    let w = -((1.0 - x) * (1.0 + x)).ln();
    let p = if w < 5.0 {
        let w = w - 2.5;
        let mut p = 2.81022636e-08;
        p = 3.43273939e-07 + p * w;
        p = -3.5233877e-06 + p * w;
        p = -4.39150654e-06 + p * w;
        p = 0.00021858087 + p * w;
        p = -0.00125372503 + p * w;
        p = -0.00417768164 + p * w;
        p = 0.246640727 + p * w;
        1.50140941 + p * w
    } else {
        let w = w.sqrt() - 3.0;
        let mut p = -0.000200214257;
        p = 0.000100950558 + p * w;
        p = 0.00134934322 + p * w;
        p = -0.00367342844 + p * w;
        p = 0.00573950773 + p * w;
        p = -0.0076224613 + p * w;
        p = 0.00943887047 + p * w;
        p = 1.00167406 + p * w;
        2.83297682 + p * w
    };
    p * x
}

/// Cumulative distribution function of `N(mu, sigma²)`.
#[inline]
pub fn cdf(x: f32, mu: f32, sigma: f32) -> f32 {
    0.5 * (1.0 + erf((x - mu) / (sigma * core::f32::consts::SQRT_2)))
}

/// Inverse CDF (quantile function) of `N(mu, sigma²)` for `u` in `(0, 1)`.
#[inline]
pub fn inv_cdf(u: f32, mu: f32, sigma: f32) -> f32 {
    sigma * core::f32::consts::SQRT_2 * erf_inv(2.0 * u - 1.0) + mu
}

/// Map a quantile onto the target Gaussian.
#[inline]
pub fn gaussianize(u: f32) -> f32 {
    inv_cdf(u, GAUSSIAN_AVERAGE, GAUSSIAN_STD)
}

/// Quantile of a value under the target Gaussian.
#[inline]
pub fn target_cdf(g: f32) -> f32 {
    cdf(g, GAUSSIAN_AVERAGE, GAUSSIAN_STD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_known_values() {
        assert!(erf(0.0).abs() < 1e-6);
        assert!((erf(0.5) - 0.5204999).abs() < 1e-5);
        assert!((erf(1.0) - 0.8427008).abs() < 1e-5);
        assert!((erf(2.0) - 0.9953223).abs() < 1e-5);
    }

    #[test]
    fn test_erf_is_odd() {
        for &x in &[0.1f32, 0.7, 1.3, 2.9] {
            assert_eq!(erf(-x), -erf(x));
        }
    }

    #[test]
    fn test_erf_inv_inverts_erf() {
        // Covers both polynomial branches (w >= 5 once |x| > ~0.9966).
        for &x in &[-0.999f32, -0.9, -0.5, -0.1, 0.0, 0.2, 0.6, 0.95, 0.998] {
            let y = erf_inv(x);
            assert!((erf(y) - x).abs() < 1e-5, "erf(erf_inv({x})) = {}", erf(y));
        }
    }

    #[test]
    fn test_cdf_and_inverse() {
        assert!((cdf(0.5, 0.5, 0.2) - 0.5).abs() < 1e-6);
        assert!((cdf(0.7, 0.5, 0.2) - 0.8413447).abs() < 1e-5);
        assert_eq!(inv_cdf(0.5, 0.5, 0.16666), 0.5);
        for &u in &[0.01f32, 0.25, 0.469, 0.75, 0.99] {
            let x = inv_cdf(u, 0.5, 0.16666);
            assert!((cdf(x, 0.5, 0.16666) - u).abs() < 1e-5);
        }
    }

    #[test]
    fn test_inv_cdf_monotonic() {
        let mut prev = f32::NEG_INFINITY;
        for i in 0..4096 {
            let u = (i as f32 + 0.5) / 4096.0;
            let g = gaussianize(u);
            assert!(g > prev, "not increasing at quantile {u}");
            prev = g;
        }
    }

    #[test]
    fn test_inv_cdf_zero_sigma_is_mean() {
        assert_eq!(inv_cdf(0.1, 0.3, 0.0), 0.3);
        assert_eq!(inv_cdf(0.9, 0.3, 0.0), 0.3);
    }

    #[test]
    fn test_target_mass_mostly_in_unit_interval() {
        let inside = target_cdf(1.0) - target_cdf(0.0);
        assert!(inside > 0.997);
    }
}
