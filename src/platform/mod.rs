//! Platform abstraction layer
//!
//! Handles the boundary with the host:
//! - Input snapshots (polled once per frame)
//! - Recording storage (append-only line files)

pub mod input;
pub mod storage;

pub use input::{Action, InputSnapshot};
pub use storage::{FileRecordingStorage, MemoryRecordingStorage, RecordingStorage, session_name};
