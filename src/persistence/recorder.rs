//! Session recorder: samples renderable entities at a fixed cadence.
//!
//! Recording is best-effort. The first failed write is logged, the recorder
//! disables itself and the match carries on.

use super::format::{EntitySnapshot, FORMAT_VERSION, Keyframe, RecordLine, SessionHeader};
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{ArenaError, Result};
use crate::platform::storage::RecordingStorage;
use crate::sim::world::World;

/// Captures keyframes for one session
#[derive(Debug, Clone)]
pub struct Recorder {
    session: String,
    /// Seconds between keyframes
    interval: f64,
    /// Session clock (seconds since start)
    clock: f64,
    last_sample: f64,
    keyframes_written: usize,
    enabled: bool,
}

impl Recorder {
    /// Begin a session: writes the header and a keyframe at t = 0
    pub fn start(
        storage: &mut dyn RecordingStorage,
        session: impl Into<String>,
        interval: f32,
        seed: u64,
        world: &World,
    ) -> Self {
        let mut recorder = Self {
            session: session.into(),
            interval: f64::from(interval.max(0.0)),
            clock: 0.0,
            last_sample: 0.0,
            keyframes_written: 0,
            enabled: true,
        };
        let header = RecordLine::Header(SessionHeader {
            version: FORMAT_VERSION,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            seed,
        });
        recorder.write(storage, &header);
        recorder.capture(storage, world);
        if recorder.enabled {
            log::info!("Recording enabled: {}", recorder.session);
        }
        recorder
    }

    /// Advance the session clock; writes a keyframe once the interval has elapsed
    pub fn record_frame(&mut self, storage: &mut dyn RecordingStorage, world: &World, dt: f32) {
        if !self.enabled {
            return;
        }
        self.clock += f64::from(dt);
        if self.clock - self.last_sample >= self.interval {
            self.capture(storage, world);
        }
    }

    /// Write a keyframe of every renderable entity at the current clock
    pub fn capture(&mut self, storage: &mut dyn RecordingStorage, world: &World) {
        if !self.enabled {
            return;
        }
        let keyframe = Keyframe {
            t: self.clock,
            entities: world.iter().filter_map(EntitySnapshot::of).collect(),
        };
        self.last_sample = self.clock;
        if self.write(storage, &RecordLine::Keyframe(keyframe)) {
            self.keyframes_written += 1;
        }
    }

    /// Flush and close the session
    pub fn stop(&mut self, storage: &mut dyn RecordingStorage) -> Result<()> {
        if !self.enabled {
            // Still release the writer an earlier failure may have left open
            let _ = storage.close(&self.session);
            return Err(ArenaError::RecordingDisabled(self.session.clone()));
        }
        self.enabled = false;
        if let Err(e) = storage.close(&self.session) {
            log::warn!("Recording close failed for {}: {}", self.session, e);
            return Err(e);
        }
        log::info!(
            "Recording stopped: {} ({} keyframes, {:.2}s)",
            self.session,
            self.keyframes_written,
            self.clock
        );
        Ok(())
    }

    fn write(&mut self, storage: &mut dyn RecordingStorage, line: &RecordLine) -> bool {
        let result = line
            .to_line()
            .map_err(ArenaError::from)
            .and_then(|text| storage.append_line(&self.session, &text));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Recording write failed, disabling recorder for {}: {}", self.session, e);
                self.enabled = false;
                false
            }
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn keyframes_written(&self) -> usize {
        self.keyframes_written
    }
}
