//! Replay of recorded sessions

pub mod loader;
pub mod playback;

pub use loader::{load_keyframes, parse_keyframes};
pub use playback::{Correspondence, Playback, ReplayEntity, visual_of};
