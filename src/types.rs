//! Core types shared by every precomputation stage.

use thiserror::Error;

use crate::color::{ColorEncoding, PixelFormat};
use crate::limits;
use crate::params::LUT_WIDTH;

/// Errors that can occur during precomputation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Buffer dimensions are invalid (zero).
    #[error("invalid buffer dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    /// Input exceeds safety limits.
    #[error("input exceeds safety limit: {0}")]
    LimitExceeded(String),

    /// Pixel data does not match the declared dimensions or format.
    #[error("invalid pixel data: {0}")]
    InvalidPixelData(String),

    /// A channel index outside `0..4` was requested.
    #[error("channel index {0} out of range (expected 0..=3)")]
    ChannelOutOfRange(usize),

    /// A pipeline run was requested with no channel to process.
    #[error("channel selection is empty")]
    EmptyChannelSelection,

    /// The Jacobi eigen solver did not converge within its sweep budget.
    #[error("eigen decomposition did not converge after {sweeps} sweeps")]
    NoConvergence {
        /// Number of sweeps performed before giving up.
        sweeps: usize,
    },
}

/// Result type for precomputation operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A dense 2-D grid of linear RGBA float samples.
///
/// Pixel `(x, y)` lives at `data[y * width + x]`. Channel values are not
/// range-constrained; only specific stages normalize them.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Row-major RGBA samples, `width * height` entries.
    pub data: Vec<[f32; 4]>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    ///
    /// Returns an error if dimensions are zero or exceed safety limits.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, [0.0; 4])
    }

    /// Create a buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: [f32; 4]) -> Result<Self> {
        Self::validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![color; width as usize * height as usize],
        })
    }

    /// Create a buffer from existing samples.
    pub fn from_data(width: u32, height: u32, data: Vec<[f32; 4]>) -> Result<Self> {
        Self::validate_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::InvalidPixelData(format!(
                "expected {} pixels for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a buffer whose selected channel holds `values` and whose other
    /// channels are zero.
    pub fn from_channel(width: u32, height: u32, channel: usize, values: &[f32]) -> Result<Self> {
        check_channel(channel)?;
        let mut buffer = Self::new(width, height)?;
        if values.len() != buffer.data.len() {
            return Err(Error::InvalidPixelData(format!(
                "expected {} channel values, got {}",
                buffer.data.len(),
                values.len()
            )));
        }
        for (pixel, &v) in buffer.data.iter_mut().zip(values) {
            pixel[channel] = v;
        }
        Ok(buffer)
    }

    /// Decode raw bytes into a linear float buffer.
    ///
    /// See [`crate::color::decode_raw`].
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        encoding: ColorEncoding,
        bytes: &[u8],
    ) -> Result<Self> {
        crate::color::decode_raw(width, height, format, encoding, bytes)
    }

    /// Quantize to 8-bit RGBA for storage.
    ///
    /// See [`crate::color::encode_rgba8`].
    pub fn to_rgba8(&self) -> Vec<u8> {
        crate::color::encode_rgba8(self)
    }

    /// Validate dimensions against safety limits.
    pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions(width, height));
        }

        if width > limits::MAX_IMAGE_DIMENSION || height > limits::MAX_IMAGE_DIMENSION {
            return Err(Error::LimitExceeded(format!(
                "dimension {} exceeds maximum {}",
                width.max(height),
                limits::MAX_IMAGE_DIMENSION
            )));
        }

        let total_pixels = width as u64 * height as u64;
        if total_pixels > limits::MAX_TOTAL_PIXELS {
            return Err(Error::LimitExceeded(format!(
                "total pixels {} exceeds maximum {}",
                total_pixels,
                limits::MAX_TOTAL_PIXELS
            )));
        }

        Ok(())
    }

    /// Check that the public fields still describe a consistent buffer.
    pub fn validate(&self) -> Result<()> {
        Self::validate_dimensions(self.width, self.height)?;
        if self.data.len() != self.pixel_count() {
            return Err(Error::InvalidPixelData(format!(
                "buffer is {}x{} but holds {} pixels",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Number of pixels, `width * height`.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Linear index of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Color at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        self.data[self.index(x, y)]
    }

    /// Overwrite the color at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: [f32; 4]) {
        let idx = self.index(x, y);
        self.data[idx] = color;
    }

    /// Single channel value at `(x, y)`.
    #[inline]
    pub fn get_channel(&self, x: u32, y: u32, channel: usize) -> f32 {
        self.data[self.index(x, y)][channel]
    }

    /// Overwrite a single channel value at `(x, y)`.
    #[inline]
    pub fn set_channel(&mut self, x: u32, y: u32, channel: usize, value: f32) {
        let idx = self.index(x, y);
        self.data[idx][channel] = value;
    }

    /// All values of one channel in raster order.
    pub fn channel_values(&self, channel: usize) -> Result<Vec<f32>> {
        check_channel(channel)?;
        Ok(self.data.iter().map(|p| p[channel]).collect())
    }
}

/// Return an error unless `channel` names one of R, G, B, A.
pub(crate) fn check_channel(channel: usize) -> Result<()> {
    if channel < 4 {
        Ok(())
    } else {
        Err(Error::ChannelOutOfRange(channel))
    }
}

/// Number of mip levels of a texture of the given width: `floor(log2(w)) + 1`.
#[inline]
pub fn mip_levels(width: u32) -> u32 {
    u32::BITS - width.leading_zeros()
}

/// The inverse histogram transform `T⁻¹`, one row per mip level.
///
/// Texel `i` of row 0 stores the input value whose quantile equals
/// `cdf((i + 0.5) / LUT_WIDTH)` under the target Gaussian. Rows above 0 hold
/// the same table prefiltered for coarser mips.
#[derive(Debug, Clone, PartialEq)]
pub struct LookUpTable {
    buffer: PixelBuffer,
}

impl LookUpTable {
    /// Create a zero-filled table with the given number of mip rows.
    pub fn new(levels: u32) -> Result<Self> {
        Ok(Self {
            buffer: PixelBuffer::new(LUT_WIDTH as u32, levels)?,
        })
    }

    /// Create a table sized for a texture of width `texture_width`.
    pub fn for_texture_width(texture_width: u32) -> Result<Self> {
        Self::new(mip_levels(texture_width))
    }

    /// Texels along the value axis (always [`LUT_WIDTH`]).
    #[inline]
    pub fn width(&self) -> usize {
        self.buffer.width as usize
    }

    /// Number of mip rows.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.buffer.height
    }

    /// Stored value at `texel` of `level` for `channel`.
    #[inline]
    pub fn get(&self, texel: usize, level: u32, channel: usize) -> f32 {
        self.buffer.get_channel(texel as u32, level, channel)
    }

    /// One row of one channel.
    pub fn row(&self, level: u32, channel: usize) -> Vec<f32> {
        (0..self.width())
            .map(|i| self.get(i, level, channel))
            .collect()
    }

    /// Overwrite one row of one channel.
    pub fn set_row(&mut self, level: u32, channel: usize, values: &[f32]) -> Result<()> {
        check_channel(channel)?;
        if level >= self.levels() || values.len() != self.width() {
            return Err(Error::InvalidPixelData(format!(
                "row {} with {} values does not fit a {}x{} table",
                level,
                values.len(),
                self.width(),
                self.levels()
            )));
        }
        for (i, &v) in values.iter().enumerate() {
            self.buffer.set_channel(i as u32, level, channel, v);
        }
        Ok(())
    }

    /// Look up the original value for a Gaussian-domain value `g`.
    ///
    /// Interpolates linearly between texel centers and clamps at both ends,
    /// the way a bilinear clamped texture fetch would.
    pub fn sample(&self, level: u32, channel: usize, g: f32) -> f32 {
        let last = self.width() - 1;
        let pos = (g * self.width() as f32 - 0.5).clamp(0.0, last as f32);
        let i0 = pos.floor() as usize;
        let i1 = (i0 + 1).min(last);
        let t = pos - i0 as f32;
        let v0 = self.get(i0, level, channel);
        let v1 = self.get(i1, level, channel);
        v0 + (v1 - v0) * t
    }

    /// The table as a pixel buffer (`LUT_WIDTH` x levels).
    pub fn as_buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Consume the table, returning its pixel buffer.
    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

/// Affine map from normalized decorrelated space back to RGB.
///
/// `rgb = origin + Σ n[k] * vectors[k]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBasis {
    /// RGB color at normalized coordinates `(0, 0, 0)`.
    pub origin: [f32; 3],
    /// Principal axes scaled by their value ranges.
    pub vectors: [[f32; 3]; 3],
}

impl ColorBasis {
    /// The identity basis: normalized space is RGB.
    pub fn identity() -> Self {
        Self {
            origin: [0.0; 3],
            vectors: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Map normalized decorrelated coordinates back to RGB.
    pub fn reconstruct(&self, normalized: [f32; 3]) -> [f32; 3] {
        let mut rgb = self.origin;
        for (n, v) in normalized.iter().zip(&self.vectors) {
            for c in 0..3 {
                rgb[c] += n * v[c];
            }
        }
        rgb
    }
}

impl Default for ColorBasis {
    fn default() -> Self {
        Self::identity()
    }
}

/// Per-axis rescale factors applied before block compression.
///
/// All three entries are `-1.0` when rescaling is disabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionScalers(pub [f32; 3]);

impl CompressionScalers {
    /// Sentinel meaning "no rescale".
    pub const DISABLED: Self = Self([-1.0; 3]);

    /// Whether these scalers rescale anything.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.0[0] >= 0.0
    }

    /// Rescale `v` on axis `k`: `(v - 0.5) / s + 0.5`.
    #[inline]
    pub fn scale(&self, v: f32, k: usize) -> f32 {
        (v - 0.5) / self.0[k] + 0.5
    }

    /// Undo [`scale`](Self::scale): `(v - 0.5) * s + 0.5`.
    #[inline]
    pub fn unscale(&self, v: f32, k: usize) -> f32 {
        (v - 0.5) * self.0[k] + 0.5
    }
}

/// The set of channels (0=R, 1=G, 2=B, 3=A) a map processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelSelection(u8);

impl ChannelSelection {
    /// R, G, B and A.
    pub const RGBA: Self = Self(0b1111);
    /// R, G and B.
    pub const RGB: Self = Self(0b0111);
    /// R and A.
    pub const RA: Self = Self(0b1001);
    /// G only.
    pub const G: Self = Self(0b0010);
    /// A only.
    pub const A: Self = Self(0b1000);

    /// Build a selection from channel indices.
    pub fn from_channels(channels: &[usize]) -> Result<Self> {
        let mut bits = 0u8;
        for &c in channels {
            check_channel(c)?;
            bits |= 1 << c;
        }
        Ok(Self(bits))
    }

    /// Whether `channel` is selected.
    #[inline]
    pub fn contains(&self, channel: usize) -> bool {
        channel < 4 && self.0 & (1 << channel) != 0
    }

    /// Number of selected channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether no channel is selected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Selected channels in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..4).filter(move |&c| self.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_dimension_limits() {
        assert!(PixelBuffer::new(256, 256).is_ok());

        assert!(matches!(
            PixelBuffer::new(0, 16),
            Err(Error::InvalidDimensions(0, 16))
        ));
        assert!(PixelBuffer::new(16, 0).is_err());
        assert!(matches!(
            PixelBuffer::new(100_000, 1),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_from_data_length_mismatch() {
        let err = PixelBuffer::from_data(2, 2, vec![[0.0; 4]; 3]).unwrap_err();
        assert!(err.to_string().contains("expected 4 pixels"));
    }

    #[test]
    fn test_raster_indexing() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.set_channel(2, 1, 1, 0.75);
        assert_eq!(buf.index(2, 1), 5);
        assert_eq!(buf.data[5][1], 0.75);
        assert_eq!(buf.get(2, 1), [0.0, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn test_validate_detects_tampered_data() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        assert!(buf.validate().is_ok());
        buf.data.pop();
        assert!(matches!(buf.validate(), Err(Error::InvalidPixelData(_))));
    }

    #[test]
    fn test_channel_out_of_range() {
        let buf = PixelBuffer::new(2, 2).unwrap();
        assert!(matches!(
            buf.channel_values(4),
            Err(Error::ChannelOutOfRange(4))
        ));
    }

    #[test]
    fn test_mip_levels() {
        assert_eq!(mip_levels(1), 1);
        assert_eq!(mip_levels(2), 2);
        assert_eq!(mip_levels(3), 2);
        assert_eq!(mip_levels(256), 9);
        assert_eq!(mip_levels(1000), 10);
        assert_eq!(mip_levels(1024), 11);
    }

    #[test]
    fn test_lut_shape() {
        let lut = LookUpTable::for_texture_width(512).unwrap();
        assert_eq!(lut.width(), 128);
        assert_eq!(lut.levels(), 10);
        assert_eq!(lut.as_buffer().pixel_count(), 128 * 10);
    }

    #[test]
    fn test_lut_sample_interpolates_and_clamps() {
        let mut lut = LookUpTable::new(1).unwrap();
        let row: Vec<f32> = (0..128).map(|i| i as f32).collect();
        lut.set_row(0, 2, &row).unwrap();

        // Texel centers hit exactly.
        assert_eq!(lut.sample(0, 2, 10.5 / 128.0), 10.0);
        // Halfway between two centers.
        assert!((lut.sample(0, 2, 11.0 / 128.0) - 10.5).abs() < 1e-4);
        // Clamped at both ends.
        assert_eq!(lut.sample(0, 2, -1.0), 0.0);
        assert_eq!(lut.sample(0, 2, 2.0), 127.0);
    }

    #[test]
    fn test_lut_set_row_rejects_bad_shape() {
        let mut lut = LookUpTable::new(2).unwrap();
        assert!(lut.set_row(2, 0, &[0.0; 128]).is_err());
        assert!(lut.set_row(0, 0, &[0.0; 64]).is_err());
        assert!(lut.set_row(0, 5, &[0.0; 128]).is_err());
    }

    #[test]
    fn test_identity_basis_reconstructs_input() {
        let basis = ColorBasis::identity();
        assert_eq!(basis.reconstruct([0.1, 0.2, 0.3]), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_compression_scalers_sentinel() {
        assert!(!CompressionScalers::DISABLED.is_enabled());
        let s = CompressionScalers([0.5, 1.0, 2.0]);
        assert!(s.is_enabled());
        assert_eq!(s.scale(0.75, 0), 1.0);
        assert_eq!(s.unscale(1.0, 0), 0.75);
    }

    #[test]
    fn test_channel_selection() {
        let sel = ChannelSelection::from_channels(&[3, 0]).unwrap();
        assert_eq!(sel, ChannelSelection::RA);
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(sel.len(), 2);
        assert!(!sel.contains(1));
        assert!(ChannelSelection::from_channels(&[]).unwrap().is_empty());
        assert!(ChannelSelection::from_channels(&[7]).is_err());
    }
}
