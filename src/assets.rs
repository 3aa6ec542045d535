//! Sprite assets
//!
//! The smoke sprite is generated up front and handed to the renderer, so the display
//! cannot start drawing before its image exists.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Edge length of the generated smoke texture
pub const SMOKE_TEXTURE_SIZE: u32 = 64;

/// Lattice cells across the texture for the noise layer
const NOISE_CELLS: usize = 8;

/// An RGBA8 image (straight alpha, row-major)
#[derive(Debug, Clone)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SpriteImage {
    /// Soft grey puff: radial falloff modulated by smoothed value noise
    pub fn smoke(size: u32, seed: u64) -> Self {
        let size = size.max(2);
        let mut rng = Pcg32::seed_from_u64(seed);
        let lattice: Vec<f32> = (0..(NOISE_CELLS + 1) * (NOISE_CELLS + 1))
            .map(|_| rng.random::<f32>())
            .collect();

        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        let half = size as f32 / 2.0;

        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 + 0.5 - half) / half;
                let dy = (y as f32 + 0.5 - half) / half;
                let r = (dx * dx + dy * dy).sqrt();

                let falloff = (1.0 - r).clamp(0.0, 1.0);
                let falloff = falloff * falloff * (3.0 - 2.0 * falloff);

                let u = x as f32 / size as f32 * NOISE_CELLS as f32;
                let v = y as f32 / size as f32 * NOISE_CELLS as f32;
                let noise = value_noise(&lattice, u, v);

                let alpha = (falloff * (0.55 + 0.45 * noise)).clamp(0.0, 1.0);
                let shade = 0.75 + 0.25 * noise;
                let grey = (shade * 255.0) as u8;

                pixels.extend_from_slice(&[grey, grey, grey, (alpha * 255.0) as u8]);
            }
        }

        Self {
            width: size,
            height: size,
            pixels,
        }
    }
}

fn value_noise(lattice: &[f32], u: f32, v: f32) -> f32 {
    let stride = NOISE_CELLS + 1;
    let x0 = (u.floor() as usize).min(NOISE_CELLS - 1);
    let y0 = (v.floor() as usize).min(NOISE_CELLS - 1);
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;
    let sx = fx * fx * (3.0 - 2.0 * fx);
    let sy = fy * fy * (3.0 - 2.0 * fy);

    let at = |x: usize, y: usize| lattice[y * stride + x];
    let top = at(x0, y0) + (at(x0 + 1, y0) - at(x0, y0)) * sx;
    let bottom = at(x0, y0 + 1) + (at(x0 + 1, y0 + 1) - at(x0, y0 + 1)) * sx;
    top + (bottom - top) * sy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_dimensions() {
        let img = SpriteImage::smoke(SMOKE_TEXTURE_SIZE, 1);
        assert_eq!(img.width, SMOKE_TEXTURE_SIZE);
        assert_eq!(img.pixels.len(), (SMOKE_TEXTURE_SIZE * SMOKE_TEXTURE_SIZE * 4) as usize);
    }

    #[test]
    fn test_smoke_is_soft_edged() {
        let img = SpriteImage::smoke(32, 1);
        let alpha = |x: u32, y: u32| img.pixels[((y * img.width + x) * 4 + 3) as usize];
        assert_eq!(alpha(0, 0), 0, "corners are transparent");
        assert!(alpha(16, 16) > 100, "centre is dense");
    }
}
