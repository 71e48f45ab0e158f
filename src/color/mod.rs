//! Color handling: transfer functions, raw pixel conversion, decorrelation.

pub mod convert;
pub mod decorrelate;
pub mod eigen;
pub mod transfer;

pub use convert::*;
pub use decorrelate::*;
pub use eigen::*;
pub use transfer::*;
