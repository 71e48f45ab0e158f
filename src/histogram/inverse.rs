//! Inverse histogram transformation `T⁻¹`, base mip row.

use crate::gaussian::target_cdf;
use crate::params::LUT_WIDTH;
use crate::types::{PixelBuffer, Result};

/// Sorted copy of one channel's values (NaN last).
pub fn sorted_channel(input: &PixelBuffer, channel: usize) -> Result<Vec<f32>> {
    let mut values = input.channel_values(channel)?;
    values.sort_unstable_by(f32::total_cmp);
    Ok(values)
}

/// Row 0 of the inverse lookup table for one channel.
///
/// Texel `i` covers Gaussian value `G = (i + 0.5) / LUT_WIDTH`; it stores the
/// input sample at rank `floor(cdf(G) * N)` of the sorted channel.
pub fn compute_inverse_lut(input: &PixelBuffer, channel: usize) -> Result<Vec<f32>> {
    input.validate()?;
    let sorted = sorted_channel(input, channel)?;
    Ok(inverse_row(&sorted))
}

/// Tabulate `T⁻¹` from already sorted samples. `sorted` must not be empty.
pub(crate) fn inverse_row(sorted: &[f32]) -> Vec<f32> {
    let n = sorted.len();
    let last = n.saturating_sub(1);
    (0..LUT_WIDTH)
        .map(|i| {
            let g = (i as f32 + 0.5) / LUT_WIDTH as f32;
            let u = target_cdf(g) as f64;
            let rank = ((u * n as f64).floor() as usize).min(last);
            sorted[rank]
        })
        .collect()
}
