//! Forward histogram transformation `T`.

use crate::gaussian::gaussianize;
use crate::types::{check_channel, PixelBuffer, Result};

/// Linear indices of a channel's samples, ordered by value.
///
/// Ties are broken by linear index so the order is reproducible. NaN sorts
/// after every number.
pub fn rank_order(input: &PixelBuffer, channel: usize) -> Result<Vec<u32>> {
    check_channel(channel)?;
    let data = &input.data;
    let mut order: Vec<u32> = (0..data.len() as u32).collect();
    order.sort_unstable_by(|&a, &b| {
        data[a as usize][channel]
            .total_cmp(&data[b as usize][channel])
            .then(a.cmp(&b))
    });
    Ok(order)
}

/// Gaussianized values of one channel, in raster order.
///
/// The sample of rank `i` among `n` maps to `invCDF((i + 0.5) / n)`.
pub fn gaussianize_channel(input: &PixelBuffer, channel: usize) -> Result<Vec<f32>> {
    input.validate()?;
    let order = rank_order(input, channel)?;
    let n = order.len() as f64;

    let mut out = vec![0.0f32; order.len()];
    for (rank, &idx) in order.iter().enumerate() {
        let u = ((rank as f64 + 0.5) / n) as f32;
        out[idx as usize] = gaussianize(u);
    }
    Ok(out)
}

/// Apply `T` to one channel.
///
/// Returns a copy of `input` whose `channel` holds the Gaussianized values;
/// the other channels are copied unchanged.
pub fn compute_forward_transform(input: &PixelBuffer, channel: usize) -> Result<PixelBuffer> {
    let values = gaussianize_channel(input, channel)?;
    let mut output = input.clone();
    for (px, v) in output.data.iter_mut().zip(values) {
        px[channel] = v;
    }
    Ok(output)
}
