//! Launch particles: shells flying from the ground to their burst point

use glam::Vec2;
use rand::Rng;

use super::particle::{DrawContext, Lifecycle, Particle, TickEffects};
use super::trail::Trail;
use crate::canvas::{Canvas, Hsla};
use crate::consts::*;
use crate::{distance, random_range};

/// Flight state of a launch particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Flying,
    /// Reached the target this tick; terminal
    Exploding,
}

/// A shell accelerating along a straight line toward its target
#[derive(Debug, Clone)]
pub struct LaunchParticle {
    pub pos: Vec2,
    pub origin: Vec2,
    pub target: Vec2,
    pub trail: Trail,
    pub distance_to_target: f32,
    pub distance_traveled: f32,
    pub angle: f32,
    pub speed: f32,
    pub brightness: f32,
    /// Radius of the pulsing ring drawn at the target
    pub target_radius: f32,
    pub state: LaunchState,
    /// Ticks spent flying
    pub age: u32,
}

impl LaunchParticle {
    pub fn new<R: Rng + ?Sized>(origin: Vec2, target: Vec2, rng: &mut R) -> Self {
        let delta = target - origin;
        Self {
            pos: origin,
            origin,
            target,
            trail: Trail::new(LAUNCH_TRAIL_LENGTH, origin),
            distance_to_target: distance(origin, target),
            distance_traveled: 0.0,
            angle: delta.y.atan2(delta.x),
            speed: LAUNCH_START_SPEED,
            brightness: random_range(rng, LAUNCH_MIN_BRIGHTNESS, LAUNCH_MAX_BRIGHTNESS),
            target_radius: TARGET_RING_MIN,
            state: LaunchState::Flying,
            age: 0,
        }
    }

    fn advance_target_ring(&mut self) {
        if self.target_radius < TARGET_RING_MAX {
            self.target_radius += TARGET_RING_STEP;
        } else {
            self.target_radius = TARGET_RING_MIN;
        }
    }
}

impl Particle for LaunchParticle {
    fn draw(&self, canvas: &mut dyn Canvas, ctx: &DrawContext) {
        let color = Hsla::hsl(ctx.hue, self.brightness);

        canvas.begin_path();
        canvas.move_to(self.trail.oldest());
        canvas.line_to(self.pos);
        canvas.stroke(color, LINE_WIDTH);

        canvas.begin_path();
        canvas.arc(self.target, self.target_radius, 0.0, std::f32::consts::TAU);
        canvas.stroke(color, LINE_WIDTH);
    }

    fn update(&mut self, effects: &mut TickEffects) -> Lifecycle {
        self.trail.push(self.pos);
        self.advance_target_ring();
        self.age += 1;

        self.speed *= LAUNCH_ACCELERATION;
        let vel = Vec2::new(self.angle.cos(), self.angle.sin()) * self.speed;

        // Never shrinks: the shell only moves along the origin->target ray
        let traveled = distance(self.origin, self.pos + vel);
        self.distance_traveled = self.distance_traveled.max(traveled);

        if self.distance_traveled >= self.distance_to_target || self.age >= MAX_FLIGHT_TICKS {
            if self.age >= MAX_FLIGHT_TICKS && self.distance_traveled < self.distance_to_target {
                log::warn!(
                    "Launch toward ({:.0}, {:.0}) exceeded {} ticks, bursting early",
                    self.target.x,
                    self.target.y,
                    MAX_FLIGHT_TICKS
                );
            }
            self.pos = self.target;
            self.state = LaunchState::Exploding;
            effects.burst_at(self.target);
            return Lifecycle::Expire;
        }

        self.pos += vel;
        Lifecycle::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, DrawList, PathOp};
    use crate::settings::Settings;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn launch(origin: Vec2, target: Vec2) -> LaunchParticle {
        let mut rng = Pcg32::seed_from_u64(1);
        LaunchParticle::new(origin, target, &mut rng)
    }

    #[test]
    fn test_new_launch() {
        let p = launch(Vec2::new(100.0, 500.0), Vec2::new(100.0, 100.0));
        assert_eq!(p.distance_traveled, 0.0);
        assert_eq!(p.distance_to_target, 400.0);
        assert_eq!(p.speed, LAUNCH_START_SPEED);
        assert_eq!(p.trail.len(), LAUNCH_TRAIL_LENGTH);
        assert!((p.angle + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((LAUNCH_MIN_BRIGHTNESS..LAUNCH_MAX_BRIGHTNESS).contains(&p.brightness));
    }

    #[test]
    fn test_flight_until_burst() {
        let mut p = launch(Vec2::new(100.0, 500.0), Vec2::new(100.0, 100.0));
        let mut effects = TickEffects::default();
        let mut last_speed = p.speed;
        let mut last_traveled = p.distance_traveled;

        loop {
            let outcome = p.update(&mut effects);
            assert!(p.speed > last_speed, "speed must grow every tick");
            assert!(p.distance_traveled >= last_traveled);
            last_speed = p.speed;
            last_traveled = p.distance_traveled;

            match outcome {
                Lifecycle::Continue => {
                    assert!(p.distance_traveled < p.distance_to_target);
                    assert!(effects.bursts.is_empty());
                }
                Lifecycle::Expire => {
                    assert!(p.distance_traveled >= p.distance_to_target);
                    break;
                }
            }
            assert!(p.age < MAX_FLIGHT_TICKS);
        }

        assert_eq!(p.state, LaunchState::Exploding);
        assert_eq!(effects.bursts, vec![Vec2::new(100.0, 100.0)]);
    }

    #[test]
    fn test_zero_distance_expires_first_tick() {
        let mut p = launch(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0));
        let mut effects = TickEffects::default();
        assert_eq!(p.update(&mut effects), Lifecycle::Expire);
        assert_eq!(effects.bursts.len(), 1);
    }

    #[test]
    fn test_target_ring_pulses() {
        let mut p = launch(Vec2::new(0.0, 100_000.0), Vec2::ZERO);
        let mut effects = TickEffects::default();
        let mut saw_reset = false;
        for _ in 0..40 {
            let before = p.target_radius;
            p.update(&mut effects);
            assert!(p.target_radius >= TARGET_RING_MIN);
            assert!(p.target_radius < TARGET_RING_MAX + TARGET_RING_STEP);
            if p.target_radius < before {
                assert_eq!(p.target_radius, TARGET_RING_MIN);
                saw_reset = true;
            }
        }
        assert!(saw_reset);
    }

    #[test]
    fn test_draw_streak_from_oldest_trail_point() {
        let mut p = launch(Vec2::new(0.0, 10_000.0), Vec2::ZERO);
        let mut effects = TickEffects::default();
        for _ in 0..LAUNCH_TRAIL_LENGTH + 3 {
            assert_eq!(p.update(&mut effects), Lifecycle::Continue);
        }
        assert_ne!(p.trail.oldest(), p.origin);
        assert_ne!(p.trail.oldest(), p.trail.newest());

        let settings = Settings::default();
        let ctx = DrawContext {
            hue: 0.0,
            settings: &settings,
        };
        let mut list = DrawList::new();
        p.draw(&mut list, &ctx);

        match &list.commands[0] {
            DrawCommand::Stroke { path, .. } => {
                assert_eq!(
                    path,
                    &vec![PathOp::MoveTo(p.trail.oldest()), PathOp::LineTo(p.pos)]
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_draw_trail_and_ring() {
        let p = launch(Vec2::new(10.0, 10.0), Vec2::new(10.0, 0.0));
        let settings = Settings::default();
        let ctx = DrawContext {
            hue: 120.0,
            settings: &settings,
        };
        let mut list = DrawList::new();
        p.draw(&mut list, &ctx);

        assert_eq!(list.stroke_count(), 2);
        match &list.commands[1] {
            DrawCommand::Stroke { path, color, .. } => {
                assert_eq!(color.hue, 120.0);
                assert!(matches!(path[0], PathOp::Arc { radius, .. } if radius == TARGET_RING_MIN));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
