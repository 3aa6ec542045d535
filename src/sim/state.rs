//! Display state: populations plus the context driving them
//!
//! Everything the scheduler mutates lives in [`Show`]; pointer handlers only write the
//! pointer fields of [`SimContext`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::explosion::ExplosionParticle;
use super::launch::LaunchParticle;
use super::population::Population;
use super::smoke::SmokeParticle;
use crate::random_range;
use crate::settings::Settings;

/// Tick counter that fires every `total` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub count: u32,
    pub total: u32,
}

impl Cadence {
    pub fn new(total: u32) -> Self {
        Self {
            count: 0,
            total: total.max(1),
        }
    }

    /// Advance one tick; returns true (and resets) when the total is reached
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.total {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

/// Last known pointer state, written by input handlers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub pos: Vec2,
    pub pressed: bool,
}

/// Mutable simulation context owned by the scheduler
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Global hue (degrees, never clamped)
    pub hue: f32,
    pub auto_launch: Cadence,
    pub pointer_launch: Cadence,
    pub pointer: Pointer,
    /// Canvas size in pixels
    pub viewport: Vec2,
    pub rng: Pcg32,
    /// Ticks run so far
    pub time_ticks: u64,
}

impl SimContext {
    pub fn new(settings: &Settings, viewport: Vec2, seed: u64) -> Self {
        Self {
            hue: settings.hue_start,
            auto_launch: Cadence::new(settings.auto_launch_ticks),
            pointer_launch: Cadence::new(settings.pointer_launch_ticks),
            pointer: Pointer::default(),
            viewport,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
        }
    }

    /// Launch origin: bottom-centre of the canvas
    pub fn launch_origin(&self) -> Vec2 {
        Vec2::new(self.viewport.x / 2.0, self.viewport.y)
    }

    /// Uniform random point in the upper half of the canvas
    pub fn random_target(&mut self) -> Vec2 {
        Vec2::new(
            random_range(&mut self.rng, 0.0, self.viewport.x),
            random_range(&mut self.rng, 0.0, self.viewport.y / 2.0),
        )
    }
}

/// Population sizes and clock, for logging and HUDs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowStats {
    pub launches: usize,
    pub explosions: usize,
    pub smoke: usize,
    pub hue: f32,
    pub time_ticks: u64,
}

/// A running fireworks display
#[derive(Debug)]
pub struct Show {
    pub settings: Settings,
    pub ctx: SimContext,
    pub launches: Population<LaunchParticle>,
    pub explosions: Population<ExplosionParticle>,
    pub smoke: Population<SmokeParticle>,
    running: bool,
}

impl Show {
    pub fn new(settings: Settings, viewport: Vec2, seed: u64) -> Self {
        let ctx = SimContext::new(&settings, viewport, seed);
        Self {
            settings,
            ctx,
            launches: Population::new(),
            explosions: Population::new(),
            smoke: Population::new(),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the display; no further ticks run
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Fireworks stopped after {} ticks", self.ctx.time_ticks);
        }
        self.running = false;
    }

    /// Update the canvas size used for launch origins and random targets
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.ctx.viewport = Vec2::new(width, height);
        }
    }

    /// Apply new settings; cadence totals take effect immediately
    pub fn apply_settings(&mut self, settings: Settings) {
        self.ctx.auto_launch.total = settings.auto_launch_ticks.max(1);
        self.ctx.pointer_launch.total = settings.pointer_launch_ticks.max(1);
        self.settings = settings;
    }

    /// Record the pointer position (canvas pixels). Non-finite input is ignored.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Ignoring non-finite pointer position ({}, {})", x, y);
            return;
        }
        self.ctx.pointer.pos = Vec2::new(x, y);
    }

    pub fn pointer_pressed(&mut self, pressed: bool) {
        self.ctx.pointer.pressed = pressed;
    }

    /// Launch a shell from bottom-centre toward `target`
    pub fn launch(&mut self, target: Vec2) {
        let origin = self.ctx.launch_origin();
        log::debug!(
            "Launch toward ({:.0}, {:.0}), {} in flight",
            target.x,
            target.y,
            self.launches.len() + 1
        );
        let particle = LaunchParticle::new(origin, target, &mut self.ctx.rng);
        self.launches.insert(particle);
    }

    /// Spawn one explosion batch at `pos` using the current global hue
    pub fn create_explosion(&mut self, pos: Vec2) {
        let count = self.settings.explosion_particles();
        for _ in 0..count {
            let particle = ExplosionParticle::new(pos, self.ctx.hue, &mut self.ctx.rng);
            self.explosions.insert(particle);
        }
    }

    /// Spawn the smoke emission for an explosion at `pos`
    pub fn create_smoke(&mut self, pos: Vec2) {
        for _ in 0..self.settings.smoke_particles {
            let particle =
                SmokeParticle::new(pos, self.settings.max_smoke_velocity, &mut self.ctx.rng);
            self.smoke.insert(particle);
        }
    }

    pub fn stats(&self) -> ShowStats {
        ShowStats {
            launches: self.launches.len(),
            explosions: self.explosions.len(),
            smoke: self.smoke.len(),
            hue: self.ctx.hue,
            time_ticks: self.ctx.time_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show() -> Show {
        Show::new(Settings::default(), Vec2::new(800.0, 600.0), 12345)
    }

    #[test]
    fn test_cadence_fires_and_resets() {
        let mut c = Cadence::new(3);
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert_eq!(c.count, 0);
    }

    #[test]
    fn test_create_explosion_batch() {
        let mut show = show();
        show.create_explosion(Vec2::new(100.0, 100.0));
        assert_eq!(show.explosions.len(), 80);
        assert!(show.explosions.iter().all(|p| p.pos == Vec2::new(100.0, 100.0)));

        // Independent draws, not copies of one fragment
        let first = show.explosions.iter().next().map(|p| p.angle);
        assert!(show.explosions.iter().any(|p| Some(p.angle) != first));
    }

    #[test]
    fn test_create_smoke_single() {
        let mut show = show();
        show.create_smoke(Vec2::new(100.0, 100.0));
        assert_eq!(show.smoke.len(), 1);
    }

    #[test]
    fn test_launch_from_bottom_centre() {
        let mut show = show();
        show.launch(Vec2::new(10.0, 10.0));
        let p = show.launches.iter().next().unwrap();
        assert_eq!(p.origin, Vec2::new(400.0, 600.0));
        assert_eq!(p.target, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_random_target_in_upper_half() {
        let mut ctx = SimContext::new(&Settings::default(), Vec2::new(800.0, 600.0), 1);
        for _ in 0..1000 {
            let t = ctx.random_target();
            assert!((0.0..800.0).contains(&t.x));
            assert!((0.0..300.0).contains(&t.y));
        }
    }

    #[test]
    fn test_pointer_ignores_non_finite() {
        let mut show = show();
        show.pointer_moved(5.0, 6.0);
        show.pointer_moved(f32::NAN, 1.0);
        assert_eq!(show.ctx.pointer.pos, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_resize_moves_origin() {
        let mut show = show();
        show.resize(1000.0, 400.0);
        assert_eq!(show.ctx.launch_origin(), Vec2::new(500.0, 400.0));
        show.resize(0.0, 100.0);
        assert_eq!(show.ctx.viewport, Vec2::new(1000.0, 400.0));
    }
}
