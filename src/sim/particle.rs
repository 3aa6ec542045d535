//! Shared particle capability driven by the frame scheduler

use glam::Vec2;

use crate::canvas::Canvas;
use crate::settings::Settings;

/// Outcome of a particle update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Keep the particle in its population
    Continue,
    /// Remove the particle at the end of the current pass
    Expire,
}

/// Read-only state shared by every draw call in a tick
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    /// Global hue (degrees, unbounded)
    pub hue: f32,
    pub settings: &'a Settings,
}

/// Side effects requested by particle updates, applied by the scheduler
#[derive(Debug, Default, Clone)]
pub struct TickEffects {
    /// Points where an explosion and smoke emission must be created
    pub bursts: Vec<Vec2>,
}

impl TickEffects {
    pub fn burst_at(&mut self, point: Vec2) {
        self.bursts.push(point);
    }
}

/// A transient, self-expiring visual entity
pub trait Particle {
    fn draw(&self, canvas: &mut dyn Canvas, ctx: &DrawContext);
    fn update(&mut self, effects: &mut TickEffects) -> Lifecycle;
}
