//! 2D drawing surface abstraction
//!
//! The simulation draws through [`Canvas`], a small immediate-mode API shaped like an HTML
//! canvas context. [`DrawList`] records those calls so a frame can be inspected in tests,
//! counted by the headless runner, or replayed by the GPU renderer.

use glam::Vec2;

/// Compositing mode for subsequent fills, strokes and sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Paint over existing content
    #[default]
    SourceOver,
    /// Erase existing content in proportion to the painted alpha
    DestinationOut,
    /// Add painted color to existing content
    Lighter,
}

impl Composite {
    pub const ALL: [Composite; 3] = [
        Composite::SourceOver,
        Composite::DestinationOut,
        Composite::Lighter,
    ];

    pub fn index(self) -> usize {
        match self {
            Composite::SourceOver => 0,
            Composite::DestinationOut => 1,
            Composite::Lighter => 2,
        }
    }
}

/// Color in the CSS `hsla()` model: hue in degrees (any value, wrapped modulo 360),
/// saturation and lightness in percent, alpha in 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub alpha: f32,
}

impl Hsla {
    pub const fn new(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
            alpha,
        }
    }

    /// Fully saturated, opaque color
    pub const fn hsl(hue: f32, lightness: f32) -> Self {
        Self::new(hue, 100.0, lightness, 1.0)
    }

    pub const fn black(alpha: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, alpha)
    }

    /// Convert to straight (non-premultiplied) RGBA in 0-1
    pub fn to_rgba(self) -> [f32; 4] {
        let h = self.hue.rem_euclid(360.0);
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        [r + m, g + m, b + m, self.alpha.clamp(0.0, 1.0)]
    }
}

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }
}

/// Drawing surface consumed by the simulation.
///
/// Coordinates are canvas pixels with the origin at the top-left and y growing downward.
pub trait Canvas {
    fn set_composite(&mut self, mode: Composite);
    fn fill_rect(&mut self, rect: Rect, color: Hsla);
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Vec2);
    fn line_to(&mut self, p: Vec2);
    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2);
    /// Circular arc around `center`, angles in radians, clockwise in screen space
    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32);
    /// Stroke the current path
    fn stroke(&mut self, color: Hsla, width: f32);
    /// Draw the smoke sprite centred on `center`
    fn draw_sprite(&mut self, center: Vec2, size: Vec2, opacity: f32);
}

/// One path segment, as issued to [`Canvas`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { control: Vec2, end: Vec2 },
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
    },
}

/// A recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Composite(Composite),
    FillRect { rect: Rect, color: Hsla },
    Stroke {
        path: Vec<PathOp>,
        color: Hsla,
        width: f32,
    },
    Sprite {
        center: Vec2,
        size: Vec2,
        opacity: f32,
    },
}

/// Recording [`Canvas`]
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    path: Vec<PathOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.path.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of stroke commands recorded
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count()
    }

    /// Number of sprite commands recorded
    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
            .count()
    }
}

impl Canvas for DrawList {
    fn set_composite(&mut self, mode: Composite) {
        self.commands.push(DrawCommand::Composite(mode));
    }

    fn fill_rect(&mut self, rect: Rect, color: Hsla) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, p: Vec2) {
        self.path.push(PathOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Vec2) {
        self.path.push(PathOp::LineTo(p));
    }

    fn quadratic_curve_to(&mut self, control: Vec2, end: Vec2) {
        self.path.push(PathOp::QuadTo { control, end });
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32) {
        self.path.push(PathOp::Arc {
            center,
            radius,
            start: start_angle,
            end: end_angle,
        });
    }

    fn stroke(&mut self, color: Hsla, width: f32) {
        // Like a canvas context, the path stays current after stroking
        self.commands.push(DrawCommand::Stroke {
            path: self.path.clone(),
            color,
            width,
        });
    }

    fn draw_sprite(&mut self, center: Vec2, size: Vec2, opacity: f32) {
        self.commands.push(DrawCommand::Sprite {
            center,
            size,
            opacity,
        });
    }
}
