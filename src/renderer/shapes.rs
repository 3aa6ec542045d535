//! Tessellation of recorded canvas commands into triangle batches

use std::ops::Range;

use glam::Vec2;

use super::vertex::{SpriteVertex, Vertex};
use crate::canvas::{Composite, DrawCommand, DrawList, PathOp, Rect};

/// Segments used to flatten one quadratic curve
const QUAD_SEGMENTS: usize = 8;
/// Arc flattening bounds
const MIN_ARC_SEGMENTS: usize = 8;
const MAX_ARC_SEGMENTS: usize = 64;

/// Which vertex stream a batch draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Color,
    Sprite,
}

/// A run of consecutive vertices sharing a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub kind: BatchKind,
    pub composite: Composite,
    pub range: Range<u32>,
}

/// Triangles for one frame, in canvas pixels
#[derive(Debug, Default, Clone)]
pub struct FrameGeometry {
    pub color: Vec<Vertex>,
    pub sprites: Vec<SpriteVertex>,
    pub batches: Vec<Batch>,
}

impl FrameGeometry {
    /// Tessellate every command of `list`, preserving draw order
    pub fn build(list: &DrawList) -> Self {
        let mut geometry = Self::default();
        let mut composite = Composite::SourceOver;

        for command in &list.commands {
            match command {
                DrawCommand::Composite(mode) => composite = *mode,
                DrawCommand::FillRect { rect, color } => {
                    let start = geometry.color.len() as u32;
                    fill_rect(&mut geometry.color, *rect, color.to_rgba());
                    geometry.extend(BatchKind::Color, composite, start);
                }
                DrawCommand::Stroke { path, color, width } => {
                    let start = geometry.color.len() as u32;
                    let rgba = color.to_rgba();
                    for polyline in flatten(path) {
                        stroke_polyline(&mut geometry.color, &polyline, *width, rgba);
                    }
                    geometry.extend(BatchKind::Color, composite, start);
                }
                DrawCommand::Sprite {
                    center,
                    size,
                    opacity,
                } => {
                    let start = geometry.sprites.len() as u32;
                    sprite_quad(&mut geometry.sprites, *center, *size, *opacity);
                    geometry.extend(BatchKind::Sprite, composite, start);
                }
            }
        }

        geometry
    }

    /// Close the vertices pushed since `start` into the current batch or a new one
    fn extend(&mut self, kind: BatchKind, composite: Composite, start: u32) {
        let end = match kind {
            BatchKind::Color => self.color.len() as u32,
            BatchKind::Sprite => self.sprites.len() as u32,
        };
        if end == start {
            return;
        }
        match self.batches.last_mut() {
            Some(last)
                if last.kind == kind && last.composite == composite && last.range.end == start =>
            {
                last.range.end = end;
            }
            _ => self.batches.push(Batch {
                kind,
                composite,
                range: start..end,
            }),
        }
    }
}

fn fill_rect(out: &mut Vec<Vertex>, rect: Rect, color: [f32; 4]) {
    let a = rect.origin;
    let b = rect.origin + rect.size;
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, a.y, color));
    out.push(Vertex::new(a.x, b.y, color));

    out.push(Vertex::new(b.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(a.x, b.y, color));
}

fn sprite_quad(out: &mut Vec<SpriteVertex>, center: Vec2, size: Vec2, opacity: f32) {
    let a = center - size / 2.0;
    let b = center + size / 2.0;
    out.push(SpriteVertex::new(a.x, a.y, 0.0, 0.0, opacity));
    out.push(SpriteVertex::new(b.x, a.y, 1.0, 0.0, opacity));
    out.push(SpriteVertex::new(a.x, b.y, 0.0, 1.0, opacity));

    out.push(SpriteVertex::new(b.x, a.y, 1.0, 0.0, opacity));
    out.push(SpriteVertex::new(b.x, b.y, 1.0, 1.0, opacity));
    out.push(SpriteVertex::new(a.x, b.y, 0.0, 1.0, opacity));
}

/// Turn path operations into polylines (one per subpath)
pub fn flatten(path: &[PathOp]) -> Vec<Vec<Vec2>> {
    let mut polylines: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();

    for op in path {
        match *op {
            PathOp::MoveTo(p) => {
                if current.len() > 1 {
                    polylines.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            PathOp::LineTo(p) => current.push(p),
            PathOp::QuadTo { control, end } => {
                let Some(&start) = current.last() else {
                    // Canvas semantics: a curve with no current point starts at its control
                    current.push(control);
                    current.push(end);
                    continue;
                };
                for i in 1..=QUAD_SEGMENTS {
                    let t = i as f32 / QUAD_SEGMENTS as f32;
                    let mt = 1.0 - t;
                    current.push(start * (mt * mt) + control * (2.0 * mt * t) + end * (t * t));
                }
            }
            PathOp::Arc {
                center,
                radius,
                start,
                end,
            } => {
                let sweep = end - start;
                let segments = ((sweep.abs() * radius / 2.0).ceil() as usize)
                    .clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS);
                for i in 0..=segments {
                    let a = start + sweep * (i as f32 / segments as f32);
                    current.push(center + Vec2::new(a.cos(), a.sin()) * radius);
                }
            }
        }
    }

    if current.len() > 1 {
        polylines.push(current);
    }
    polylines
}

/// Emit one quad per polyline segment
fn stroke_polyline(out: &mut Vec<Vertex>, points: &[Vec2], width: f32, color: [f32; 4]) {
    let half = width / 2.0;
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let perp = Vec2::new(-dir.y, dir.x) * half;

        let v1a = p1 + perp;
        let v1b = p1 - perp;
        let v2a = p2 + perp;
        let v2b = p2 - perp;

        out.push(Vertex::new(v1a.x, v1a.y, color));
        out.push(Vertex::new(v1b.x, v1b.y, color));
        out.push(Vertex::new(v2a.x, v2a.y, color));

        out.push(Vertex::new(v2a.x, v2a.y, color));
        out.push(Vertex::new(v1b.x, v1b.y, color));
        out.push(Vertex::new(v2b.x, v2b.y, color));
    }
}

/// Map canvas pixels (origin top-left, y down) to normalized device coordinates
#[inline]
pub fn pixel_to_ndc(p: [f32; 2], size: (u32, u32)) -> [f32; 2] {
    let w = size.0.max(1) as f32;
    let h = size.1.max(1) as f32;
    [p[0] / w * 2.0 - 1.0, 1.0 - p[1] / h * 2.0]
}
