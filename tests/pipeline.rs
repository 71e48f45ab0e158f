//! End-to-end runs from raw texture bytes through material batches.

mod common;

use common::{create_color_texture, create_noise};
use stochastic_tiling::{
    limits, precompute, precompute_material, ColorEncoding, Error, LayerMask, MapKind, MapPlan,
    MaterialInputs, NoProgress, PixelBuffer, PixelFormat, PrecomputeConfig, Workflow,
};

fn srgb_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            bytes.push(((x * 255) / width.max(1)) as u8);
            bytes.push(((y * 255) / height.max(1)) as u8);
            bytes.push(((x * 7 + y * 3) % 256) as u8);
            bytes.push(255);
        }
    }
    bytes
}

// ============================================================================
// Raw input
// ============================================================================

#[test]
fn test_albedo_from_srgb_bytes() {
    let bytes = srgb_bytes(64, 64);
    let albedo =
        PixelBuffer::from_raw(64, 64, PixelFormat::Rgba8, ColorEncoding::Srgb, &bytes).unwrap();
    let out = precompute(
        &albedo,
        MapPlan::for_kind(MapKind::Albedo),
        &PrecomputeConfig::default(),
        &mut NoProgress,
    )
    .unwrap();

    assert_eq!((out.forward.width, out.forward.height), (64, 64));
    assert_eq!(out.lut.width(), 128);
    assert_eq!(out.lut.levels(), 7);
    assert_eq!(out.lut.as_buffer().pixel_count(), 128 * 7);

    let stored = out.forward.to_rgba8();
    assert_eq!(stored.len(), 64 * 64 * 4);
}

#[test]
fn test_short_raw_data_rejected() {
    let err =
        PixelBuffer::from_raw(8, 8, PixelFormat::Rgb8, ColorEncoding::Linear, &[0u8; 100])
            .unwrap_err();
    assert!(matches!(err, Error::InvalidPixelData(_)));
}

#[test]
fn test_non_power_of_two_width() {
    let img = create_noise(100, 30, 4);
    let out = precompute(
        &img,
        MapPlan::for_kind(MapKind::Metallic),
        &PrecomputeConfig::default(),
        &mut NoProgress,
    )
    .unwrap();
    // floor(log2(100)) + 1
    assert_eq!(out.lut.levels(), 7);
    for level in 0..7 {
        assert!(out.lut.row(level, 0).iter().all(|v| v.is_finite()));
        assert!(out.lut.row(level, 3).iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_flat_color_map_is_finite() {
    let img = PixelBuffer::filled(16, 16, [0.3, 0.3, 0.3, 1.0]).unwrap();
    let out = precompute(
        &img,
        MapPlan::for_kind(MapKind::Emission),
        &PrecomputeConfig::default(),
        &mut NoProgress,
    )
    .unwrap();
    assert!(out
        .forward
        .data
        .iter()
        .all(|px| px.iter().all(|v| v.is_finite())));
    assert!(out.scalers.unwrap().0.iter().all(|s| s.is_finite()));
}

#[test]
fn test_zero_dimensions_rejected() {
    let img = PixelBuffer {
        width: 0,
        height: 4,
        data: Vec::new(),
    };
    let err = precompute(
        &img,
        MapPlan::for_kind(MapKind::Height),
        &PrecomputeConfig::default(),
        &mut NoProgress,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidDimensions(0, 4)));
}

#[test]
fn test_oversized_dimensions_rejected() {
    assert!(matches!(
        PixelBuffer::new(limits::MAX_IMAGE_DIMENSION + 1, 1),
        Err(Error::LimitExceeded(_))
    ));
}

// ============================================================================
// Material batches
// ============================================================================

#[test]
fn test_full_material() {
    let inputs = MaterialInputs {
        workflow: Workflow::Metallic,
        albedo: Some(create_color_texture(32, 32, 1)),
        metallic_specular: Some(create_noise(32, 32, 2)),
        normal: Some(create_color_texture(32, 32, 3)),
        height: Some(create_noise(32, 32, 4)),
        occlusion: Some(create_noise(32, 32, 5)),
        emission: Some(create_color_texture(32, 32, 6)),
        detail_mask: Some(create_noise(16, 16, 7)),
        detail_albedo: Some(create_color_texture(16, 16, 8)),
        detail_normal: Some(create_color_texture(16, 16, 9)),
    };

    let outputs = precompute_material(&inputs, LayerMask::all(), &PrecomputeConfig::default());
    let kinds: Vec<_> = outputs.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MapKind::Albedo,
            MapKind::Metallic,
            MapKind::Normal,
            MapKind::Height,
            MapKind::Occlusion,
            MapKind::Emission,
            MapKind::DetailMask,
            MapKind::DetailAlbedo,
            MapKind::DetailNormal,
        ]
    );

    for output in &outputs {
        let result = output.result.as_ref().unwrap();
        assert_eq!(result.basis.is_some(), output.kind.decorrelates());
        let expected_levels = if output.kind.layer() >= 6 { 5 } else { 6 };
        assert_eq!(result.lut.levels(), expected_levels);
    }
    assert!(!inputs.is_long_running(LayerMask::all()));
}

#[test]
fn test_batch_matches_single_runs() {
    let albedo = create_color_texture(24, 24, 12);
    let inputs = MaterialInputs {
        albedo: Some(albedo.clone()),
        ..Default::default()
    };
    let config = PrecomputeConfig::default();

    let outputs = precompute_material(&inputs, LayerMask::NONE.with(MapKind::Albedo), &config);
    let batch = outputs[0].result.as_ref().unwrap();
    let single = precompute(
        &albedo,
        MapPlan::for_kind(MapKind::Albedo),
        &config,
        &mut NoProgress,
    )
    .unwrap();

    assert_eq!(batch.forward, single.forward);
    assert_eq!(batch.lut, single.lut);
    assert_eq!(batch.basis, single.basis);
    assert_eq!(batch.scalers, single.scalers);
}

#[test]
fn test_empty_mask_does_nothing() {
    let inputs = MaterialInputs {
        albedo: Some(create_color_texture(8, 8, 1)),
        ..Default::default()
    };
    assert!(precompute_material(&inputs, LayerMask::NONE, &PrecomputeConfig::default()).is_empty());
}
