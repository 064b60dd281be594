//! Session recording
//!
//! Features:
//! - Self-describing JSON line per keyframe
//! - Tolerant field-level decoding
//! - Best-effort recorder (failures disable recording, never the match)

pub mod format;
pub mod recorder;

pub use format::{DEFAULT_COLOR, EntitySnapshot, FORMAT_VERSION, Keyframe, RecordLine, SessionHeader};
pub use recorder::Recorder;
