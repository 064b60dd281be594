//! Match simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and storage dependencies:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - Input arrives as an explicit per-frame snapshot

pub mod autopilot;
pub mod collision;
pub mod monster;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod world;

pub use autopilot::autopilot_input;
pub use collision::{Body, in_range, nearest, overlaps};
pub use state::{MatchEvent, MatchPhase, MatchState};
pub use tick::tick;
pub use world::{
    Actor, Capability, Color, Entity, EntityBuilder, EntityId, Physics, RenderDesc, ShapeKind,
    Transform, World,
};
