//! Common test utilities for synthetic texture generation.
//!
//! These helpers build textures programmatically, avoiding the need to
//! include binary test images in the repository.

#![allow(dead_code)]

use stochastic_tiling::PixelBuffer;

/// Deterministic linear congruential generator yielding values in `[0, 1)`.
pub struct Lcg(u32);

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self(seed)
    }

    pub fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345) & 0x7fff_ffff;
        self.0 as f32 / 2_147_483_648.0
    }
}

/// Single-channel ramp `i / (n - 1)` in raster order.
pub fn create_raster_ramp(width: u32, height: u32, channel: usize) -> PixelBuffer {
    let n = (width * height) as usize;
    let values: Vec<f32> = (0..n)
        .map(|i| i as f32 / (n - 1).max(1) as f32)
        .collect();
    PixelBuffer::from_channel(width, height, channel, &values).unwrap()
}

/// Single channel holding the uniform grid `(i + 0.5) / n`, shuffled.
pub fn create_uniform_shuffled(width: u32, height: u32, channel: usize) -> PixelBuffer {
    let n = (width * height) as usize;
    let mut values: Vec<f32> = (0..n).map(|i| (i as f32 + 0.5) / n as f32).collect();
    let mut rng = Lcg::new(7);
    for i in (1..n).rev() {
        let j = (rng.next_f32() * (i + 1) as f32) as usize;
        values.swap(i, j.min(i));
    }
    PixelBuffer::from_channel(width, height, channel, &values).unwrap()
}

/// One-pixel checkerboard of 0 and 1 in every channel.
pub fn create_checkerboard(width: u32, height: u32) -> PixelBuffer {
    let mut img = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let v = ((x + y) % 2) as f32;
            img.set(x, y, [v; 4]);
        }
    }
    img
}

/// Independent uniform noise in every channel.
pub fn create_noise(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut rng = Lcg::new(seed);
    let data = (0..width * height)
        .map(|_| [rng.next_f32(), rng.next_f32(), rng.next_f32(), rng.next_f32()])
        .collect();
    PixelBuffer::from_data(width, height, data).unwrap()
}

/// Correlated color texture: a diagonal gradient with per-pixel jitter.
pub fn create_color_texture(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut rng = Lcg::new(seed);
    let mut img = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let t = (x + y) as f32 / (width + height) as f32;
            let j = rng.next_f32();
            img.set(
                x,
                y,
                [
                    0.1 + 0.7 * t + 0.05 * j,
                    0.2 + 0.5 * t + 0.1 * rng.next_f32(),
                    0.6 - 0.4 * t + 0.1 * j,
                    0.5 + 0.5 * rng.next_f32(),
                ],
            );
        }
    }
    img
}

/// Variance of a slice.
pub fn variance(values: &[f32]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n
}
