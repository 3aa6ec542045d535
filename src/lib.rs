//! Fireworks - a canvas-style fireworks display
//!
//! Core modules:
//! - `sim`: Particle simulation (launches, explosions, smoke, frame scheduler)
//! - `canvas`: 2D drawing surface abstraction and a recording implementation
//! - `renderer`: WebGPU backend that replays recorded frames
//! - `assets`: Sprite assets prepared before the loop starts
//! - `settings`: Data-driven display tuning

pub mod assets;
pub mod canvas;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use canvas::{Canvas, Composite, DrawList, Hsla};
pub use settings::{QualityPreset, Settings};
pub use sim::Show;

use glam::Vec2;
use rand::Rng;

/// Display configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Launch particle defaults
    pub const LAUNCH_TRAIL_LENGTH: usize = 5;
    pub const LAUNCH_START_SPEED: f32 = 2.0;
    /// Speed multiplier applied every tick (unbounded growth)
    pub const LAUNCH_ACCELERATION: f32 = 1.05;
    pub const LAUNCH_MIN_BRIGHTNESS: f32 = 50.0;
    pub const LAUNCH_MAX_BRIGHTNESS: f32 = 70.0;
    /// Ticks after which a launch bursts at its target regardless of distance
    pub const MAX_FLIGHT_TICKS: u32 = 600;

    /// Pulsing ring drawn at the launch target
    pub const TARGET_RING_MIN: f32 = 1.0;
    pub const TARGET_RING_MAX: f32 = 8.0;
    pub const TARGET_RING_STEP: f32 = 0.3;

    /// Explosion particle defaults
    pub const EXPLOSION_MIN_TRAIL: usize = 10;
    pub const EXPLOSION_MAX_TRAIL: usize = 20;
    pub const EXPLOSION_MIN_SPEED: f32 = 1.0;
    pub const EXPLOSION_MAX_SPEED: f32 = 10.0;
    pub const EXPLOSION_FRICTION: f32 = 0.95;
    /// Constant per-tick downward displacement (pixels)
    pub const EXPLOSION_GRAVITY: f32 = 1.0;
    /// Hue spread around the global hue (degrees)
    pub const EXPLOSION_HUE_SPREAD: f32 = 20.0;
    pub const EXPLOSION_MIN_BRIGHTNESS: f32 = 50.0;
    pub const EXPLOSION_MAX_BRIGHTNESS: f32 = 80.0;
    pub const EXPLOSION_MIN_DECAY: f32 = 0.003;
    pub const EXPLOSION_MAX_DECAY: f32 = 0.006;

    /// Smoke particle defaults
    pub const SMOKE_JITTER_X: f32 = 25.0;
    pub const SMOKE_JITTER_Y: f32 = 15.0;
    pub const SMOKE_MIN_VX: f32 = 0.2;
    pub const SMOKE_MIN_RISE: f32 = 0.1;
    pub const SMOKE_DECAY: f32 = 0.001;

    /// Stroke width for all trails (pixels)
    pub const LINE_WIDTH: f32 = 1.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Uniform random value in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_distance() {
        assert_eq!(distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Vec2::new(7.0, 7.0), Vec2::new(7.0, 7.0)), 0.0);
    }

    #[test]
    fn test_random_range_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_range(&mut rng, -20.0, 20.0);
            assert!((-20.0..20.0).contains(&v));
        }
        assert_eq!(random_range(&mut rng, 3.0, 3.0), 3.0);
    }

    proptest! {
        #[test]
        fn prop_random_range_stays_inside(seed in any::<u64>(), min in -1000.0f32..1000.0, span in 0.0f32..1000.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let v = random_range(&mut rng, min, min + span);
            prop_assert!(v >= min && v <= min + span);
        }
    }
}
