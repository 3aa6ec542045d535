//! WebGPU rendering module
//!
//! Replays recorded canvas frames into a persistent offscreen texture.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{CanvasRenderer, RenderError};
pub use shapes::FrameGeometry;
