//! Range rescaling for block-compressed storage of decorrelated channels.
//!
//! Block compressors quantize each channel against its block endpoints, so a
//! decorrelated axis that maps to a long RGB vector loses more precision than
//! a short one. Dividing the Gaussian deviation by the axis length spreads
//! the stored values accordingly; the run-time shader multiplies it back.

use log::{debug, warn};

use crate::types::{ColorBasis, CompressionScalers, PixelBuffer};

/// Storage format the forward buffer will be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureCompression {
    /// Stored without lossy compression; no rescale.
    Uncompressed,
    /// Stored with a DXT/BC-style block compressor.
    #[default]
    BlockCompressed,
}

impl TextureCompression {
    /// Whether storage applies block compression.
    pub fn is_block_compressed(self) -> bool {
        matches!(self, Self::BlockCompressed)
    }
}

/// Scalers for a decorrelation basis.
///
/// With block compression, `scalers[k] = 1 / |vectors[k]|`. A zero-length
/// axis gets `1.0`. Otherwise returns [`CompressionScalers::DISABLED`].
pub fn compute_scalers(basis: &ColorBasis, compression: TextureCompression) -> CompressionScalers {
    if !compression.is_block_compressed() {
        return CompressionScalers::DISABLED;
    }

    let mut scalers = [1.0f32; 3];
    for (k, v) in basis.vectors.iter().enumerate() {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        if len > 0.0 {
            scalers[k] = 1.0 / len;
        } else {
            warn!("basis vector {} has zero length; leaving axis unscaled", k);
        }
    }
    debug!("compression scalers {:?}", scalers);
    CompressionScalers(scalers)
}

/// Apply `(v - 0.5) / s + 0.5` to the first three channels.
///
/// Returns an unchanged copy when the scalers are disabled.
pub fn rescale(forward: &PixelBuffer, scalers: CompressionScalers) -> PixelBuffer {
    map_rgb(forward, scalers, CompressionScalers::scale)
}

/// Invert [`rescale`].
pub fn unscale(stored: &PixelBuffer, scalers: CompressionScalers) -> PixelBuffer {
    map_rgb(stored, scalers, CompressionScalers::unscale)
}

fn map_rgb(
    input: &PixelBuffer,
    scalers: CompressionScalers,
    f: fn(&CompressionScalers, f32, usize) -> f32,
) -> PixelBuffer {
    let mut output = input.clone();
    if scalers.is_enabled() {
        for px in output.data.iter_mut() {
            for (k, v) in px.iter_mut().take(3).enumerate() {
                *v = f(&scalers, *v, k);
            }
        }
    }
    output
}
