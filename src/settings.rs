//! Arena settings
//!
//! Persisted as pretty JSON. A missing or unreadable file falls back to
//! defaults so the game always starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::RECORD_SAMPLE_INTERVAL;
use crate::error::Result;
use crate::replay::Correspondence;

/// Default directory for recording sessions
pub const DEFAULT_RECORDINGS_DIR: &str = "recordings";

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Recording ===
    /// Where session files are written and listed
    pub recordings_dir: PathBuf,
    /// Record every match
    pub record: bool,
    /// Seconds between recorded keyframes
    pub sample_interval: f32,

    // === Replay ===
    /// How entities of consecutive keyframes are paired
    pub correspondence: Correspondence,

    // === Simulation ===
    /// Fixed RNG seed; a fresh seed per match when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from(DEFAULT_RECORDINGS_DIR),
            record: true,
            sample_interval: RECORD_SAMPLE_INTERVAL,
            correspondence: Correspondence::ByIndex,
            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                if path.exists() {
                    log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                } else {
                    log::info!("Using default settings");
                }
                Self::default()
            }
        }
    }

    /// Like [`Settings::load`], but a missing file is created with the defaults
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            return Self::load(path);
        }
        let settings = Self::default();
        if let Err(e) = settings.save(path) {
            log::warn!("Could not write default settings to {}: {}", path.display(), e);
        }
        settings
    }

    /// Strict load; errors on a missing or malformed file
    pub fn try_load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp values that would break the recorder
    fn sanitize(&mut self) {
        if !self.sample_interval.is_finite() || self.sample_interval <= 0.0 {
            self.sample_interval = RECORD_SAMPLE_INTERVAL;
        }
    }
}
