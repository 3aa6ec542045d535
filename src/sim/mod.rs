//! Particle simulation module
//!
//! All display logic lives here. Nothing in this module touches a GPU or a browser:
//! - Fixed timestep only
//! - Drawing goes through the `Canvas` trait
//! - Every mutation happens inside a tick or a pointer handler

pub mod explosion;
pub mod launch;
pub mod particle;
pub mod population;
pub mod smoke;
pub mod state;
pub mod tick;
pub mod trail;

pub use explosion::ExplosionParticle;
pub use launch::{LaunchParticle, LaunchState};
pub use particle::{DrawContext, Lifecycle, Particle, TickEffects};
pub use population::Population;
pub use smoke::SmokeParticle;
pub use state::{Cadence, Pointer, Show, ShowStats, SimContext};
pub use tick::{FrameClock, advance, tick};
pub use trail::Trail;
