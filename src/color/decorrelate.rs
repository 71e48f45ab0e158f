//! Principal-component decorrelation of RGB channels.
//!
//! Gaussianizing R, G and B independently breaks their correlation and
//! produces off-palette colors after blending. Rotating into the eigenbasis
//! of the RGB covariance first makes the three channels uncorrelated, so the
//! per-channel transforms stay independent.

use log::{debug, warn};

use crate::color::eigen::{diagonalize, SymmetricEigen};
use crate::types::{ColorBasis, PixelBuffer, Result};

/// Order in which principal axes are assigned to output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    /// Keep the order the eigen solver produced.
    #[default]
    Solver,
    /// Highest-variance axis in channel 0.
    DescendingVariance,
}

/// Output of [`decorrelate`].
#[derive(Debug, Clone)]
pub struct Decorrelation {
    /// RGB projected onto the principal axes and normalized to `[0, 1]`;
    /// alpha is copied unchanged.
    pub buffer: PixelBuffer,
    /// Affine map from the normalized axes back to RGB.
    pub basis: ColorBasis,
    /// Variance along each axis (eigenvalues of the covariance).
    pub variances: [f64; 3],
}

/// RGB covariance matrix of a buffer.
///
/// Moments are accumulated in double precision.
pub fn rgb_covariance(input: &PixelBuffer) -> [[f64; 3]; 3] {
    let mut mean = [0.0f64; 3];
    let mut second = [[0.0f64; 3]; 3];

    for px in &input.data {
        let rgb = [px[0] as f64, px[1] as f64, px[2] as f64];
        for i in 0..3 {
            mean[i] += rgb[i];
            for j in i..3 {
                second[i][j] += rgb[i] * rgb[j];
            }
        }
    }

    let n = input.data.len().max(1) as f64;
    let mut covariance = [[0.0f64; 3]; 3];
    for i in 0..3 {
        mean[i] /= n;
    }
    for i in 0..3 {
        for j in i..3 {
            let c = second[i][j] / n - mean[i] * mean[j];
            covariance[i][j] = c;
            covariance[j][i] = c;
        }
    }
    covariance
}

/// Principal axes of the RGB distribution.
pub fn principal_axes(input: &PixelBuffer, order: AxisOrder) -> Result<SymmetricEigen> {
    let eigen = diagonalize(&rgb_covariance(input))?;
    Ok(match order {
        AxisOrder::Solver => eigen,
        AxisOrder::DescendingVariance => eigen.sorted_descending(),
    })
}

/// Project RGB onto its principal axes and normalize each axis to `[0, 1]`.
///
/// The returned basis satisfies
/// `rgb ≈ basis.origin + Σ buffer[k] * basis.vectors[k]` for every pixel.
/// An axis along which every pixel projects to the same value has zero range;
/// its normalized channel is 0 and its basis vector is zero.
pub fn decorrelate(input: &PixelBuffer, order: AxisOrder) -> Result<Decorrelation> {
    input.validate()?;

    let eigen = principal_axes(input, order)?;
    let axes: [[f32; 3]; 3] = core::array::from_fn(|k| eigen.vector(k).map(|c| c as f32));

    // Rotate to eigenvector space.
    let mut buffer = input.clone();
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for px in buffer.data.iter_mut() {
        let rgb = [px[0], px[1], px[2]];
        for (k, axis) in axes.iter().enumerate() {
            let v = dot(rgb, *axis);
            px[k] = v;
            min[k] = min[k].min(v);
            max[k] = max[k].max(v);
        }
    }

    // Remap each axis to [0, 1].
    let range: [f32; 3] = core::array::from_fn(|k| max[k] - min[k]);
    for (k, &r) in range.iter().enumerate() {
        if r <= 0.0 {
            warn!("decorrelated axis {} has zero range; normalizing to 0", k);
        }
    }
    for px in buffer.data.iter_mut() {
        for k in 0..3 {
            px[k] = if range[k] > 0.0 {
                (px[k] - min[k]) / range[k]
            } else {
                0.0
            };
        }
    }

    let mut origin = [0.0f32; 3];
    for k in 0..3 {
        for c in 0..3 {
            origin[c] += min[k] * axes[k][c];
        }
    }
    let vectors: [[f32; 3]; 3] = core::array::from_fn(|k| axes[k].map(|c| c * range[k]));

    debug!(
        "decorrelated {}x{} buffer: variances {:?}",
        input.width, input.height, eigen.values
    );

    Ok(Decorrelation {
        buffer,
        basis: ColorBasis { origin, vectors },
        variances: eigen.values,
    })
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
