//! Conversion between raw texture bytes and linear float buffers.

use crate::color::transfer::srgb_eotf;
use crate::types::{Error, PixelBuffer, Result};

/// Layout of raw pixel bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA
    Rgba8,
    /// 8-bit RGB (alpha reads as 1.0)
    Rgb8,
    /// 8-bit grayscale, replicated to RGB (alpha reads as 1.0)
    Gray8,
    /// 16-bit float RGBA, little-endian
    Rgba16F,
    /// 32-bit float RGBA, little-endian
    Rgba32F,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
            Self::Gray8 => 1,
            Self::Rgba16F => 8,
            Self::Rgba32F => 16,
        }
    }

    /// Returns true for the floating-point formats.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Rgba16F | Self::Rgba32F)
    }
}

/// How stored color values relate to linear light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorEncoding {
    /// sRGB-encoded color; RGB is linearized on decode.
    #[default]
    Srgb,
    /// Already linear (data maps, normal maps, float textures).
    Linear,
}

/// Decode raw bytes into a linear float buffer.
///
/// 8-bit values are normalized by 255; with [`ColorEncoding::Srgb`] the RGB
/// channels are then linearized (alpha never is). Float formats are taken
/// as stored.
pub fn decode_raw(
    width: u32,
    height: u32,
    format: PixelFormat,
    encoding: ColorEncoding,
    bytes: &[u8],
) -> Result<PixelBuffer> {
    PixelBuffer::validate_dimensions(width, height)?;

    let pixels = width as usize * height as usize;
    let bpp = format.bytes_per_pixel();
    let expected = pixels
        .checked_mul(bpp)
        .ok_or_else(|| Error::LimitExceeded("raw data size overflow".into()))?;
    if bytes.len() < expected {
        return Err(Error::InvalidPixelData(format!(
            "data too small: expected at least {} bytes, got {}",
            expected,
            bytes.len()
        )));
    }

    let linearize = |v: f32| match encoding {
        ColorEncoding::Srgb => srgb_eotf(v),
        ColorEncoding::Linear => v,
    };
    let unorm = |b: u8| b as f32 / 255.0;

    let data = bytes[..expected]
        .chunks_exact(bpp)
        .map(|px| match format {
            PixelFormat::Rgba8 => [
                linearize(unorm(px[0])),
                linearize(unorm(px[1])),
                linearize(unorm(px[2])),
                unorm(px[3]),
            ],
            PixelFormat::Rgb8 => [
                linearize(unorm(px[0])),
                linearize(unorm(px[1])),
                linearize(unorm(px[2])),
                1.0,
            ],
            PixelFormat::Gray8 => {
                let v = linearize(unorm(px[0]));
                [v, v, v, 1.0]
            }
            PixelFormat::Rgba16F => {
                let mut out = [0.0f32; 4];
                for (c, half_bytes) in px.chunks_exact(2).enumerate() {
                    out[c] = half_to_f32(half_bytes);
                }
                out
            }
            PixelFormat::Rgba32F => {
                let mut out = [0.0f32; 4];
                for (c, float_bytes) in px.chunks_exact(4).enumerate() {
                    out[c] = f32::from_le_bytes([
                        float_bytes[0],
                        float_bytes[1],
                        float_bytes[2],
                        float_bytes[3],
                    ]);
                }
                out
            }
        })
        .collect();

    PixelBuffer::from_data(width, height, data)
}

/// Quantize a buffer to 8-bit RGBA.
///
/// Values are clamped to `[0, 1]` and rounded; no transfer function is
/// applied, so the output stays linear.
pub fn encode_rgba8(buffer: &PixelBuffer) -> Vec<u8> {
    buffer
        .data
        .iter()
        .flat_map(|&px| px.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8))
        .collect()
}

/// Convert half-precision float bytes to f32.
fn half_to_f32(bytes: &[u8]) -> f32 {
    let bits = u16::from_le_bytes([bytes[0], bytes[1]]);
    half::f16::from_bits(bits).to_f32()
}
