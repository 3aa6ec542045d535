//! Explosion fragments

use glam::Vec2;
use rand::Rng;

use super::particle::{DrawContext, Lifecycle, Particle, TickEffects};
use super::trail::Trail;
use crate::canvas::{Canvas, Hsla};
use crate::consts::*;
use crate::random_range;

/// Radial fragment slowed by friction and pulled down by a constant offset
#[derive(Debug, Clone)]
pub struct ExplosionParticle {
    pub pos: Vec2,
    pub trail: Trail,
    pub angle: f32,
    pub speed: f32,
    pub hue: f32,
    pub brightness: f32,
    pub alpha: f32,
    /// Alpha lost per tick
    pub decay: f32,
}

impl ExplosionParticle {
    /// Spawn a fragment at `pos`, colored around the current global `hue`
    pub fn new<R: Rng + ?Sized>(pos: Vec2, hue: f32, rng: &mut R) -> Self {
        let trail_len = rng.random_range(EXPLOSION_MIN_TRAIL..=EXPLOSION_MAX_TRAIL);
        Self {
            pos,
            trail: Trail::new(trail_len, pos),
            angle: random_range(rng, 0.0, std::f32::consts::TAU),
            speed: random_range(rng, EXPLOSION_MIN_SPEED, EXPLOSION_MAX_SPEED),
            hue: random_range(
                rng,
                hue - EXPLOSION_HUE_SPREAD,
                hue + EXPLOSION_HUE_SPREAD,
            ),
            brightness: random_range(rng, EXPLOSION_MIN_BRIGHTNESS, EXPLOSION_MAX_BRIGHTNESS),
            alpha: 1.0,
            decay: random_range(rng, EXPLOSION_MIN_DECAY, EXPLOSION_MAX_DECAY),
        }
    }
}

impl Particle for ExplosionParticle {
    fn draw(&self, canvas: &mut dyn Canvas, _ctx: &DrawContext) {
        let start = self.trail.oldest();
        // Bow the segment slightly upward so it reads as a falling arc
        let control = (start + self.pos) * 0.5 - Vec2::new(0.0, start.distance(self.pos) * 0.1);

        canvas.begin_path();
        canvas.move_to(start);
        canvas.quadratic_curve_to(control, self.pos);
        canvas.stroke(
            Hsla::new(self.hue, 100.0, self.brightness, self.alpha),
            LINE_WIDTH,
        );
    }

    fn update(&mut self, _effects: &mut TickEffects) -> Lifecycle {
        self.trail.push(self.pos);
        self.speed *= EXPLOSION_FRICTION;
        self.pos += Vec2::new(
            self.angle.cos() * self.speed,
            self.angle.sin() * self.speed + EXPLOSION_GRAVITY,
        );
        self.alpha -= self.decay;

        if self.alpha <= self.decay {
            Lifecycle::Expire
        } else {
            Lifecycle::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, DrawList, PathOp};
    use crate::settings::Settings;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let p = ExplosionParticle::new(Vec2::new(10.0, 20.0), 200.0, &mut rng);
            assert!((EXPLOSION_MIN_TRAIL..=EXPLOSION_MAX_TRAIL).contains(&p.trail.len()));
            assert!((180.0..220.0).contains(&p.hue));
            assert!((EXPLOSION_MIN_SPEED..EXPLOSION_MAX_SPEED).contains(&p.speed));
            assert!((EXPLOSION_MIN_DECAY..EXPLOSION_MAX_DECAY).contains(&p.decay));
            assert!((EXPLOSION_MIN_BRIGHTNESS..EXPLOSION_MAX_BRIGHTNESS).contains(&p.brightness));
            assert_eq!(p.alpha, 1.0);
        }
    }

    #[test]
    fn test_friction_and_gravity() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = ExplosionParticle::new(Vec2::ZERO, 0.0, &mut rng);
        p.angle = 0.0;
        p.speed = 10.0;
        p.update(&mut TickEffects::default());
        assert!((p.speed - 9.5).abs() < 1e-5);
        assert!((p.pos.x - 9.5).abs() < 1e-4);
        assert!((p.pos.y - EXPLOSION_GRAVITY).abs() < 1e-4);
        assert_eq!(p.trail.newest(), Vec2::ZERO);
    }

    #[test]
    fn test_fades_out_exactly_once() {
        let mut rng = Pcg32::seed_from_u64(9);
        let settings = Settings::default();
        let ctx = DrawContext {
            hue: 0.0,
            settings: &settings,
        };
        let mut p = ExplosionParticle::new(Vec2::ZERO, 0.0, &mut rng);
        let mut effects = TickEffects::default();
        let mut list = DrawList::new();
        let mut last_alpha = p.alpha;

        let mut ticks = 0;
        loop {
            p.draw(&mut list, &ctx);
            let outcome = p.update(&mut effects);
            assert!(p.alpha < last_alpha);
            last_alpha = p.alpha;
            ticks += 1;
            if outcome == Lifecycle::Expire {
                assert!(p.alpha <= p.decay);
                break;
            }
            assert!(p.alpha > p.decay);
            assert!(ticks < 1000);
        }

        for command in &list.commands {
            if let DrawCommand::Stroke { color, .. } = command {
                assert!(color.alpha > 0.0);
            }
        }
        assert_eq!(list.stroke_count(), ticks);
    }

    #[test]
    fn test_draw_curve_from_oldest_trail_point() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut p = ExplosionParticle::new(Vec2::new(200.0, 200.0), 30.0, &mut rng);
        p.trail = Trail::new(3, p.pos);
        let mut effects = TickEffects::default();
        for _ in 0..6 {
            assert_eq!(p.update(&mut effects), Lifecycle::Continue);
        }
        assert_eq!(p.trail.len(), 3);
        assert_ne!(p.trail.oldest(), p.trail.newest());

        let settings = Settings::default();
        let ctx = DrawContext {
            hue: 0.0,
            settings: &settings,
        };
        let mut list = DrawList::new();
        p.draw(&mut list, &ctx);

        assert_eq!(list.stroke_count(), 1);
        match &list.commands[0] {
            DrawCommand::Stroke { path, .. } => {
                assert_eq!(path.len(), 2);
                assert_eq!(path[0], PathOp::MoveTo(p.trail.oldest()));
                assert!(matches!(path[1], PathOp::QuadTo { end, .. } if end == p.pos));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
