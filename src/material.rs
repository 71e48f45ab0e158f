//! Material-level batch processing over the stochastic input layers.

use log::{info, warn};

use crate::limits::LONG_RUNNING_PIXELS;
use crate::pipeline::{precompute, MapPlan, NoProgress, Precomputation, PrecomputeConfig};
use crate::types::{ChannelSelection, Error, PixelBuffer, Result};

/// Kind of input map in a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// Base color, RGBA.
    Albedo,
    /// Metallic in R, smoothness in A.
    Metallic,
    /// Specular color in RGB, smoothness in A.
    Specular,
    /// Tangent-space normal map.
    Normal,
    /// Height in G.
    Height,
    /// Ambient occlusion in G.
    Occlusion,
    /// Emission color.
    Emission,
    /// Detail mask in A.
    DetailMask,
    /// Secondary base color.
    DetailAlbedo,
    /// Secondary normal map.
    DetailNormal,
}

impl MapKind {
    /// Every map kind, in layer order.
    pub const ALL: [MapKind; 10] = [
        MapKind::Albedo,
        MapKind::Metallic,
        MapKind::Specular,
        MapKind::Normal,
        MapKind::Height,
        MapKind::Occlusion,
        MapKind::Emission,
        MapKind::DetailMask,
        MapKind::DetailAlbedo,
        MapKind::DetailNormal,
    ];

    /// Channels transformed for this kind.
    pub fn channels(self) -> ChannelSelection {
        match self {
            Self::Albedo | Self::Specular => ChannelSelection::RGBA,
            Self::Metallic => ChannelSelection::RA,
            Self::Normal | Self::Emission | Self::DetailAlbedo | Self::DetailNormal => {
                ChannelSelection::RGB
            }
            Self::Height | Self::Occlusion => ChannelSelection::G,
            Self::DetailMask => ChannelSelection::A,
        }
    }

    /// Whether RGB is decorrelated before transforming.
    pub fn decorrelates(self) -> bool {
        matches!(
            self,
            Self::Albedo | Self::Normal | Self::Emission | Self::DetailAlbedo | Self::DetailNormal
        )
    }

    /// Bit index in a [`LayerMask`]. Metallic and specular share a layer.
    pub fn layer(self) -> u32 {
        match self {
            Self::Albedo => 0,
            Self::Metallic | Self::Specular => 1,
            Self::Normal => 2,
            Self::Height => 3,
            Self::Occlusion => 4,
            Self::Emission => 5,
            Self::DetailMask => 6,
            Self::DetailAlbedo => 7,
            Self::DetailNormal => 8,
        }
    }
}

/// Which of the shared metallic/specular layer's kinds a material uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workflow {
    /// Metallic/smoothness.
    #[default]
    Metallic,
    /// Specular/smoothness.
    Specular,
}

impl Workflow {
    /// The map kind driven by the shared layer bit.
    pub fn map_kind(self) -> MapKind {
        match self {
            Self::Metallic => MapKind::Metallic,
            Self::Specular => MapKind::Specular,
        }
    }
}

/// Set of stochastic input layers (9 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(u16);

impl LayerMask {
    const ALL_BITS: u16 = (1 << 9) - 1;

    /// No layer selected.
    pub const NONE: Self = Self(0);

    /// Every layer selected.
    pub fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    /// Mask from raw bits; bits above the ninth are dropped.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    /// Raw bits.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Add the layer of `kind`.
    pub fn with(self, kind: MapKind) -> Self {
        Self(self.0 | 1 << kind.layer())
    }

    /// Whether the layer of `kind` is selected.
    pub fn is_selected(self, kind: MapKind) -> bool {
        self.0 & (1 << kind.layer()) != 0
    }
}

/// Source maps of one material. Absent maps are `None`.
#[derive(Debug, Clone, Default)]
pub struct MaterialInputs {
    /// Metallic or specular workflow.
    pub workflow: Workflow,
    /// Base color map.
    pub albedo: Option<PixelBuffer>,
    /// Metallic map under [`Workflow::Metallic`], specular map otherwise.
    pub metallic_specular: Option<PixelBuffer>,
    /// Normal map.
    pub normal: Option<PixelBuffer>,
    /// Height map.
    pub height: Option<PixelBuffer>,
    /// Occlusion map.
    pub occlusion: Option<PixelBuffer>,
    /// Emission map.
    pub emission: Option<PixelBuffer>,
    /// Detail mask.
    pub detail_mask: Option<PixelBuffer>,
    /// Detail base color map.
    pub detail_albedo: Option<PixelBuffer>,
    /// Detail normal map.
    pub detail_normal: Option<PixelBuffer>,
}

impl MaterialInputs {
    /// Source buffer for `kind`, if present.
    ///
    /// Metallic and specular resolve only when they match the workflow.
    pub fn input(&self, kind: MapKind) -> Option<&PixelBuffer> {
        match kind {
            MapKind::Albedo => self.albedo.as_ref(),
            MapKind::Metallic | MapKind::Specular => {
                if kind == self.workflow.map_kind() {
                    self.metallic_specular.as_ref()
                } else {
                    None
                }
            }
            MapKind::Normal => self.normal.as_ref(),
            MapKind::Height => self.height.as_ref(),
            MapKind::Occlusion => self.occlusion.as_ref(),
            MapKind::Emission => self.emission.as_ref(),
            MapKind::DetailMask => self.detail_mask.as_ref(),
            MapKind::DetailAlbedo => self.detail_albedo.as_ref(),
            MapKind::DetailNormal => self.detail_normal.as_ref(),
        }
    }

    /// Selected, present maps in layer order.
    pub fn selected(&self, mask: LayerMask) -> Vec<(MapKind, &PixelBuffer)> {
        MapKind::ALL
            .iter()
            .filter(|kind| mask.is_selected(**kind))
            .filter_map(|&kind| self.input(kind).map(|buf| (kind, buf)))
            .collect()
    }

    /// Whether any selected input is large enough to take a while.
    pub fn is_long_running(&self, mask: LayerMask) -> bool {
        self.selected(mask)
            .iter()
            .any(|(_, buf)| buf.pixel_count() as u64 > LONG_RUNNING_PIXELS)
    }
}

/// Result for one map of a material.
#[derive(Debug)]
pub struct MapOutput {
    /// Which map this is.
    pub kind: MapKind,
    /// The precomputation, or why the map was left unprocessed.
    pub result: Result<Precomputation>,
}

/// Precompute every selected, present map of a material.
///
/// Maps whose decorrelation does not converge are redone without it. Other
/// failures are reported in the map's [`MapOutput::result`]. With the
/// `rayon` feature maps are processed in parallel; output order is layer
/// order either way.
pub fn precompute_material(
    inputs: &MaterialInputs,
    mask: LayerMask,
    config: &PrecomputeConfig,
) -> Vec<MapOutput> {
    let jobs = inputs.selected(mask);

    #[cfg(feature = "rayon")]
    let outputs: Vec<MapOutput> = {
        use rayon::prelude::*;
        jobs.par_iter()
            .map(|&(kind, input)| precompute_map(kind, input, config))
            .collect()
    };

    #[cfg(not(feature = "rayon"))]
    let outputs: Vec<MapOutput> = jobs
        .iter()
        .map(|&(kind, input)| precompute_map(kind, input, config))
        .collect();

    outputs
}

fn precompute_map(kind: MapKind, input: &PixelBuffer, config: &PrecomputeConfig) -> MapOutput {
    let plan = MapPlan::for_kind(kind);
    let result = match precompute(input, plan, config, &mut NoProgress) {
        Err(Error::NoConvergence { sweeps }) if plan.decorrelate => {
            warn!(
                "{:?}: principal axes not found after {} sweeps; processing without decorrelation",
                kind, sweeps
            );
            precompute(input, plan.without_decorrelation(), config, &mut NoProgress)
        }
        other => other,
    };

    match &result {
        Ok(out) => info!(
            "{:?}: precomputed {}x{} map, {} lut levels",
            kind,
            out.forward.width,
            out.forward.height,
            out.lut.levels()
        ),
        Err(e) => warn!("{:?}: left unprocessed: {}", kind, e),
    }

    MapOutput { kind, result }
}
