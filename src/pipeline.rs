//! Per-map precomputation pipeline.
//!
//! Stages run in a fixed order: optional decorrelation, forward transform
//! per channel, inverse LUT row 0 per channel, LUT prefiltering per channel,
//! and compression rescaling when decorrelation ran.

use log::debug;

use crate::color::{decorrelate, AxisOrder};
use crate::compression::{compute_scalers, rescale, TextureCompression};
use crate::histogram::{compute_inverse_lut, gaussianize_channel, prefilter_rows};
use crate::material::MapKind;
use crate::types::{
    ChannelSelection, ColorBasis, CompressionScalers, Error, LookUpTable, PixelBuffer, Result,
};

/// Configuration for a precomputation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputeConfig {
    /// Storage format of the forward buffer; decides compression scalers.
    pub compression: TextureCompression,
    /// How principal axes are assigned to channels when decorrelating.
    pub axis_order: AxisOrder,
    /// Fill LUT rows above 0 with prefiltered tables. When false they repeat
    /// row 0.
    pub prefilter: bool,
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            compression: TextureCompression::BlockCompressed,
            axis_order: AxisOrder::Solver,
            prefilter: true,
        }
    }
}

/// What to do with one input map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPlan {
    /// Kind of map, used for logging.
    pub kind: MapKind,
    /// Channels to transform.
    pub channels: ChannelSelection,
    /// Rotate RGB into its principal axes first.
    pub decorrelate: bool,
}

impl MapPlan {
    /// The fixed plan for a map kind.
    pub fn for_kind(kind: MapKind) -> Self {
        Self {
            kind,
            channels: kind.channels(),
            decorrelate: kind.decorrelates(),
        }
    }

    /// The same plan with decorrelation turned off.
    pub fn without_decorrelation(self) -> Self {
        Self {
            decorrelate: false,
            ..self
        }
    }
}

/// Output of [`precompute`].
#[derive(Debug, Clone)]
pub struct Precomputation {
    /// Gaussianized buffer, same size as the input. Unselected channels hold
    /// the (possibly decorrelated) source values.
    pub forward: PixelBuffer,
    /// Inverse lookup table, `LUT_WIDTH` x mip levels.
    pub lut: LookUpTable,
    /// Map from normalized decorrelated space to RGB, when decorrelation ran.
    pub basis: Option<ColorBasis>,
    /// Rescale factors applied to the forward buffer, when decorrelation ran.
    pub scalers: Option<CompressionScalers>,
}

/// Receives one call per completed pipeline step.
pub trait Progress {
    /// Step `current` of `total` (1-based) has finished.
    fn on_step(&mut self, current: usize, total: usize, label: &str);
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    #[inline]
    fn on_step(&mut self, _current: usize, _total: usize, _label: &str) {}
}

impl<F: FnMut(usize, usize, &str)> Progress for F {
    #[inline]
    fn on_step(&mut self, current: usize, total: usize, label: &str) {
        self(current, total, label)
    }
}

struct Steps<'a> {
    sink: &'a mut dyn Progress,
    current: usize,
    total: usize,
}

impl Steps<'_> {
    fn done(&mut self, label: &str) {
        self.current += 1;
        self.sink.on_step(self.current, self.total, label);
    }
}

/// Run the full precomputation for one map.
///
/// The input buffer is never modified. Fails with
/// [`Error::EmptyChannelSelection`] when the plan selects no channel and
/// with [`Error::NoConvergence`] when decorrelation cannot find the principal
/// axes.
pub fn precompute(
    input: &PixelBuffer,
    plan: MapPlan,
    config: &PrecomputeConfig,
    progress: &mut dyn Progress,
) -> Result<Precomputation> {
    input.validate()?;
    if plan.channels.is_empty() {
        return Err(Error::EmptyChannelSelection);
    }

    let stages_per_channel = if config.prefilter { 3 } else { 2 };
    let decorrelation_steps = if plan.decorrelate { 2 } else { 0 };
    let mut steps = Steps {
        sink: progress,
        current: 0,
        total: decorrelation_steps + stages_per_channel * plan.channels.len(),
    };

    debug!(
        "precomputing {:?} {}x{}, channels {:?}, decorrelate {}",
        plan.kind,
        input.width,
        input.height,
        plan.channels.iter().collect::<Vec<_>>(),
        plan.decorrelate
    );

    // Source values the histogram stages read.
    let (source, basis) = if plan.decorrelate {
        let dec = decorrelate(input, config.axis_order)?;
        steps.done("decorrelate");
        (dec.buffer, Some(dec.basis))
    } else {
        (input.clone(), None)
    };

    let mut forward = source.clone();
    for channel in plan.channels.iter() {
        let values = gaussianize_channel(&source, channel)?;
        for (px, v) in forward.data.iter_mut().zip(values) {
            px[channel] = v;
        }
        steps.done("forward transform");
    }

    let mut lut = LookUpTable::for_texture_width(input.width)?;
    let mut base_rows = Vec::with_capacity(plan.channels.len());
    for channel in plan.channels.iter() {
        let row = compute_inverse_lut(&source, channel)?;
        lut.set_row(0, channel, &row)?;
        base_rows.push((channel, row));
        steps.done("inverse lut");
    }

    if config.prefilter {
        for (channel, base) in &base_rows {
            let rows = prefilter_rows(&forward, base, lut.levels(), *channel)?;
            for (level, row) in (1..).zip(&rows) {
                lut.set_row(level, *channel, row)?;
            }
            steps.done("prefilter");
        }
    } else {
        for (channel, base) in &base_rows {
            for level in 1..lut.levels() {
                lut.set_row(level, *channel, base)?;
            }
        }
    }

    let scalers = match &basis {
        Some(basis) => {
            let scalers = compute_scalers(basis, config.compression);
            forward = rescale(&forward, scalers);
            steps.done("rescale");
            Some(scalers)
        }
        None => None,
    };

    debug!(
        "finished {:?}: {} lut levels, scalers {:?}",
        plan.kind,
        lut.levels(),
        scalers
    );

    Ok(Precomputation {
        forward,
        lut,
        basis,
        scalers,
    })
}
