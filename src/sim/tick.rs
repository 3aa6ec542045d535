//! Fixed timestep frame scheduler
//!
//! One tick fades the canvas, steps the three populations and runs both launch cadences.

use super::particle::{DrawContext, TickEffects};
use super::state::Show;
use crate::canvas::{Canvas, Composite, Hsla, Rect};
use crate::consts::*;

use glam::Vec2;

/// Advance the display by one tick, drawing onto `canvas`
pub fn tick(show: &mut Show, canvas: &mut dyn Canvas) {
    if !show.is_running() {
        return;
    }

    show.ctx.time_ticks += 1;
    show.ctx.hue += show.settings.hue_step;

    // Erase a fraction of last frame instead of clearing, leaving trails
    canvas.set_composite(Composite::DestinationOut);
    canvas.fill_rect(
        Rect::new(Vec2::ZERO, show.ctx.viewport),
        Hsla::black(show.settings.fade_alpha),
    );
    canvas.set_composite(Composite::Lighter);

    let mut effects = TickEffects::default();
    {
        let draw_ctx = DrawContext {
            hue: show.ctx.hue,
            settings: &show.settings,
        };
        show.launches.step(canvas, &draw_ctx, &mut effects);
    }

    for point in std::mem::take(&mut effects.bursts) {
        log::debug!("Burst at ({:.0}, {:.0})", point.x, point.y);
        show.create_explosion(point);
        show.create_smoke(point);
    }

    {
        let draw_ctx = DrawContext {
            hue: show.ctx.hue,
            settings: &show.settings,
        };
        show.explosions.step(canvas, &draw_ctx, &mut effects);
        show.smoke.step(canvas, &draw_ctx, &mut effects);
    }

    // Autonomous launches are suppressed while the pointer is held, not paused
    if show.ctx.auto_launch.tick() && !show.ctx.pointer.pressed {
        let target = show.ctx.random_target();
        show.launch(target);
    }

    if show.ctx.pointer_launch.tick() && show.ctx.pointer.pressed {
        let target = show.ctx.pointer.pos;
        show.launch(target);
    }
}

/// Accumulates frame time into whole fixed ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` seconds of wall time; returns the number of ticks to run now
    pub fn advance(&mut self, dt: f32) -> u32 {
        let dt = dt.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop backlog we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }
}

/// Run as many ticks as `dt` seconds cover; returns how many ran
pub fn advance(show: &mut Show, clock: &mut FrameClock, dt: f32, canvas: &mut dyn Canvas) -> u32 {
    if !show.is_running() {
        return 0;
    }
    let steps = clock.advance(dt);
    for _ in 0..steps {
        tick(show, canvas);
    }
    steps
}
