//! Histogram transformation `T`, its inverse `T⁻¹`, and mip prefiltering.
//!
//! `T` replaces every sample of a channel by the target-Gaussian value at the
//! sample's quantile, so rank order is preserved exactly. `T⁻¹` is tabulated
//! over the Gaussian value axis and extended across mip levels by
//! [`prefilter`].

pub mod forward;
pub mod inverse;
pub mod prefilter;

pub use forward::*;
pub use inverse::*;
pub use prefilter::*;
