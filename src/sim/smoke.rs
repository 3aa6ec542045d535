//! Smoke puffs left behind by explosions

use glam::Vec2;
use rand::Rng;

use super::particle::{DrawContext, Lifecycle, Particle, TickEffects};
use crate::canvas::Canvas;
use crate::consts::*;
use crate::random_range;

/// Slow, upward-drifting sprite with linear fade
#[derive(Debug, Clone)]
pub struct SmokeParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alpha: f32,
}

impl SmokeParticle {
    /// Spawn a puff jittered around `center`
    pub fn new<R: Rng + ?Sized>(center: Vec2, max_velocity: f32, rng: &mut R) -> Self {
        let pos = center
            + Vec2::new(
                random_range(rng, -SMOKE_JITTER_X, SMOKE_JITTER_X),
                random_range(rng, -SMOKE_JITTER_Y, SMOKE_JITTER_Y),
            );
        let vel = Vec2::new(
            random_range(rng, SMOKE_MIN_VX, max_velocity),
            random_range(rng, -max_velocity, -SMOKE_MIN_RISE),
        );
        Self {
            pos,
            vel,
            alpha: 1.0,
        }
    }
}

impl Particle for SmokeParticle {
    fn draw(&self, canvas: &mut dyn Canvas, ctx: &DrawContext) {
        let settings = ctx.settings;
        let opacity = if settings.smoke_fades {
            settings.smoke_opacity * self.alpha.max(0.0)
        } else {
            settings.smoke_opacity
        };
        let size = Vec2::splat(settings.smoke_size);
        canvas.draw_sprite(self.pos, size, opacity);
    }

    fn update(&mut self, _effects: &mut TickEffects) -> Lifecycle {
        self.pos += self.vel;
        self.alpha -= SMOKE_DECAY;

        if self.alpha <= 0.0 {
            Lifecycle::Expire
        } else {
            Lifecycle::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, DrawList};
    use crate::settings::Settings;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(5);
        let center = Vec2::new(300.0, 200.0);
        for _ in 0..500 {
            let p = SmokeParticle::new(center, 1.0, &mut rng);
            let offset = p.pos - center;
            assert!(offset.x.abs() <= SMOKE_JITTER_X);
            assert!(offset.y.abs() <= SMOKE_JITTER_Y);
            assert!((SMOKE_MIN_VX..1.0).contains(&p.vel.x));
            assert!((-1.0..-SMOKE_MIN_RISE).contains(&p.vel.y), "smoke rises");
        }
    }

    #[test]
    fn test_linear_fade_and_removal() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut p = SmokeParticle::new(Vec2::ZERO, 1.0, &mut rng);
        let mut effects = TickEffects::default();
        let mut ticks = 0;

        loop {
            let before = p.alpha;
            let start = p.pos;
            let outcome = p.update(&mut effects);
            ticks += 1;
            assert!((before - p.alpha - SMOKE_DECAY).abs() < 1e-6);
            assert_eq!(p.pos, start + p.vel);
            if outcome == Lifecycle::Expire {
                assert!(p.alpha <= 0.0);
                break;
            }
            assert!(p.alpha > 0.0);
        }

        // 1.0 / 0.001, give or take float rounding
        assert!((999..=1001).contains(&ticks), "expired after {} ticks", ticks);
    }

    #[test]
    fn test_draw_opacity() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut p = SmokeParticle::new(Vec2::ZERO, 1.0, &mut rng);
        p.alpha = 0.5;

        let mut settings = Settings::default();
        let mut list = DrawList::new();
        p.draw(
            &mut list,
            &DrawContext {
                hue: 0.0,
                settings: &settings,
            },
        );
        settings.smoke_fades = true;
        p.draw(
            &mut list,
            &DrawContext {
                hue: 0.0,
                settings: &settings,
            },
        );

        let opacities: Vec<f32> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite { opacity, .. } => Some(*opacity),
                _ => None,
            })
            .collect();
        assert_eq!(opacities.len(), 2);
        assert!((opacities[0] - 0.3).abs() < 1e-6);
        assert!((opacities[1] - 0.15).abs() < 1e-6);
    }
}
