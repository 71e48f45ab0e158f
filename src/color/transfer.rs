//! sRGB transfer function (IEC 61966-2-1).
//!
//! Textures authored in sRGB are linearized before precomputation so the
//! histogram statistics are computed in linear light.

/// sRGB OETF: Linear `[0,1]` → sRGB encoded `[0,1]`
#[inline]
pub fn srgb_oetf(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// sRGB EOTF (inverse OETF): sRGB encoded `[0,1]` → Linear `[0,1]`
#[inline]
pub fn srgb_eotf(encoded: f32) -> f32 {
    if encoded <= 0.04045 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}
