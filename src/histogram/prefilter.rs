//! Mip prefiltering of the inverse lookup table.
//!
//! Sampling a coarse mip of the Gaussianized texture averages a window of
//! texels, which narrows the Gaussian the run-time blend sees. Row `L` of the
//! table is row 0 convolved with a Gaussian whose width is the average
//! variance inside `2^L`-sided windows of the forward buffer.

use log::{trace, warn};

use crate::gaussian::inv_cdf;
use crate::params::{LUT_WIDTH, PREFILTER_SAMPLES};
use crate::types::{check_channel, PixelBuffer, Result};

/// Average per-window variance of `channel` over windows of side `2^level`.
///
/// Windows tile the buffer from the origin; those overhanging the right or
/// bottom edge are clipped. Each window contributes `max(0, E[x²] - E[x]²)`
/// and the result is the mean over windows.
pub fn average_subpixel_variance(forward: &PixelBuffer, level: u32, channel: usize) -> Result<f32> {
    check_channel(channel)?;
    forward.validate()?;

    let side = 1usize << level.min(31);
    let (width, height) = (forward.width as usize, forward.height as usize);

    let mut total = 0.0f64;
    let mut windows = 0usize;
    for wy in (0..height).step_by(side) {
        for wx in (0..width).step_by(side) {
            let mut sum = 0.0f64;
            let mut sum_sq = 0.0f64;
            let mut count = 0usize;
            for y in wy..(wy + side).min(height) {
                let row = &forward.data[y * width..(y + 1) * width];
                for px in &row[wx..(wx + side).min(width)] {
                    let v = px[channel] as f64;
                    sum += v;
                    sum_sq += v * v;
                    count += 1;
                }
            }
            let mean = sum / count as f64;
            total += (sum_sq / count as f64 - mean * mean).max(0.0);
            windows += 1;
        }
    }

    Ok((total / windows as f64) as f32)
}

/// Average subpixel variance for levels `1..levels`.
pub fn subpixel_variance_levels(
    forward: &PixelBuffer,
    channel: usize,
    levels: u32,
) -> Result<Vec<f32>> {
    (1..levels)
        .map(|level| average_subpixel_variance(forward, level, channel))
        .collect()
}

/// One prefiltered texel: the mean of `base_row` under `N(x, std²)`.
///
/// The kernel is sampled at `PREFILTER_SAMPLES` evenly spaced quantiles and
/// each sample is clamped to the table.
pub fn filter_lut_value(base_row: &[f32], x: f32, std: f32) -> f32 {
    let width = base_row.len();
    if width == 0 {
        return 0.0;
    }
    let last = (width - 1) as f32;

    let mut acc = 0.0f32;
    for s in 0..PREFILTER_SAMPLES {
        let u = (s as f32 + 0.5) / PREFILTER_SAMPLES as f32;
        let pos = (inv_cdf(u, x, std) * width as f32).floor().clamp(0.0, last);
        acc += base_row[pos as usize];
    }
    acc / PREFILTER_SAMPLES as f32
}

/// Rows `1..levels` of the inverse lookup table.
///
/// `forward` is the Gaussianized buffer and `base_row` the unfiltered row 0
/// of the same channel. Returns `levels - 1` rows, coarsest last.
pub fn prefilter_rows(
    forward: &PixelBuffer,
    base_row: &[f32],
    levels: u32,
    channel: usize,
) -> Result<Vec<Vec<f32>>> {
    let variances = subpixel_variance_levels(forward, channel, levels)?;
    if variances.iter().all(|&v| v == 0.0) && !variances.is_empty() {
        warn!("channel {} has zero subpixel variance at every level", channel);
    }

    Ok(variances
        .iter()
        .enumerate()
        .map(|(i, &variance)| {
            let std = variance.sqrt();
            trace!("level {}: subpixel std {}", i + 1, std);
            (0..LUT_WIDTH)
                .map(|t| {
                    let x = (t as f32 + 0.5) / LUT_WIDTH as f32;
                    filter_lut_value(base_row, x, std)
                })
                .collect()
        })
        .collect())
}
