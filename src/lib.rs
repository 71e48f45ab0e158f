//! Offline precomputation for histogram-preserving stochastic texture tiling.
//!
//! Stochastic tiling blends randomly offset tiles of an example texture in a
//! Gaussian domain, then maps the blend back through an inverse histogram
//! transform so the output keeps the example's histogram. This crate produces
//! the two inputs that run-time reconstruction needs:
//!
//! - a Gaussianized copy of the texture (`T`), where every processed channel
//!   has been remapped by rank onto `N(0.5, 0.16666²)`;
//! - a 128-texel inverse lookup table (`T⁻¹`) with one row per mip level,
//!   prefiltered so coarse mips dequantize with the right contrast.
//!
//! Color maps are optionally rotated into a decorrelated (PCA) color space
//! first; the returned [`ColorBasis`] maps the normalized axes back to RGB.
//!
//! # Example
//!
//! ```ignore
//! use stochastic_tiling::{
//!     precompute, ColorEncoding, MapKind, MapPlan, NoProgress, PixelBuffer, PixelFormat,
//!     PrecomputeConfig,
//! };
//!
//! let albedo = PixelBuffer::from_raw(512, 512, PixelFormat::Rgba8, ColorEncoding::Srgb, &bytes)?;
//! let config = PrecomputeConfig::default();
//! let result = precompute(&albedo, MapPlan::for_kind(MapKind::Albedo), &config, &mut NoProgress)?;
//!
//! assert_eq!(result.lut.width(), 128);
//! assert_eq!(result.lut.levels(), 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod color;
pub mod compression;
pub mod gaussian;
pub mod histogram;
pub mod material;
pub mod pipeline;
mod types;

// Re-export core types
pub use types::{
    mip_levels, ChannelSelection, ColorBasis, CompressionScalers, Error, LookUpTable, PixelBuffer,
    Result,
};

pub use color::{AxisOrder, ColorEncoding, PixelFormat};
pub use compression::TextureCompression;
pub use material::{precompute_material, LayerMask, MapKind, MapOutput, MaterialInputs, Workflow};
pub use pipeline::{precompute, MapPlan, NoProgress, Precomputation, PrecomputeConfig, Progress};

/// Fixed numerical parameters of the precomputation.
pub mod params {
    /// Mean of the target Gaussian distribution.
    pub const GAUSSIAN_AVERAGE: f32 = 0.5;

    /// Standard deviation of the target Gaussian distribution.
    ///
    /// Chosen so that almost all of the distribution's mass lies in `[0, 1]`.
    pub const GAUSSIAN_STD: f32 = 0.16666;

    /// Number of texels along the value axis of the inverse lookup table.
    pub const LUT_WIDTH: usize = 128;

    /// Gaussian quantile samples averaged per texel when prefiltering.
    pub const PREFILTER_SAMPLES: usize = 2 * LUT_WIDTH;

    /// Sweep budget of the Jacobi eigen solver.
    pub const JACOBI_MAX_SWEEPS: usize = 50;
}

/// Safety limits for buffer allocation.
pub mod limits {
    /// Maximum buffer dimension (width or height).
    pub const MAX_IMAGE_DIMENSION: u32 = 16384;

    /// Maximum total pixels (width * height).
    pub const MAX_TOTAL_PIXELS: u64 = 268_435_456; // 16384²

    /// Inputs above this many pixels take noticeably long to precompute.
    pub const LONG_RUNNING_PIXELS: u64 = 1_048_576;
}
