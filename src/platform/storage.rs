//! Recording storage
//!
//! Append-only line stores keyed by session name. File access is blocking
//! and buffered; callers flush at session boundaries, not per frame.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ArenaError, Result};

/// File extension of recording sessions
pub const RECORDING_EXTENSION: &str = "jsonl";

/// Session name for a recording started at `unix_millis`
pub fn session_name(unix_millis: u128) -> String {
    format!("hulu_session_{}.{}", unix_millis, RECORDING_EXTENSION)
}

/// Line store for recording sessions
pub trait RecordingStorage {
    /// Append one line to the named session (created on first append)
    fn append_line(&mut self, session: &str, line: &str) -> Result<()>;

    /// Push buffered lines to durable storage
    fn flush(&mut self) -> Result<()>;

    /// Flush the named session and release whatever keeps it open
    fn close(&mut self, session: &str) -> Result<()>;

    /// Every line of the named session, in storage order
    fn read_lines(&self, session: &str) -> Result<Vec<String>>;

    /// Known sessions, newest first
    fn list_recordings(&self) -> Result<Vec<String>>;
}

/// Sessions stored as `<dir>/<session>` files
#[derive(Debug)]
pub struct FileRecordingStorage {
    dir: PathBuf,
    writers: HashMap<String, BufWriter<File>>,
}

impl FileRecordingStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writers: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, session: &str) -> PathBuf {
        self.dir.join(session)
    }
}

impl RecordingStorage for FileRecordingStorage {
    fn append_line(&mut self, session: &str, line: &str) -> Result<()> {
        if !self.writers.contains_key(session) {
            fs::create_dir_all(&self.dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_of(session))?;
            self.writers.insert(session.to_string(), BufWriter::new(file));
        }
        let writer = self
            .writers
            .get_mut(session)
            .ok_or_else(|| ArenaError::not_found(session))?;
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self, session: &str) -> Result<()> {
        match self.writers.remove(session) {
            Some(mut writer) => Ok(writer.flush()?),
            None => Ok(()),
        }
    }

    /// Lines that are not valid UTF-8 are dropped; only I/O failures are errors
    fn read_lines(&self, session: &str) -> Result<Vec<String>> {
        let path = self.path_of(session);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArenaError::not_found(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let mut lines = Vec::new();
        for (n, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let mut raw = raw?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            match String::from_utf8(raw) {
                Ok(line) => lines.push(line),
                Err(_) => log::warn!("Skipping non-UTF-8 line {} in {}", n + 1, session),
            }
        }
        Ok(lines)
    }

    fn list_recordings(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // No directory yet means no recordings yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORDING_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

/// Sessions kept in memory (tests, dry runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordingStorage {
    sessions: HashMap<String, Vec<String>>,
    /// Appends fail while set
    pub fail_writes: bool,
}

impl MemoryRecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session with raw lines
    pub fn insert(&mut self, session: &str, lines: Vec<String>) {
        self.sessions.insert(session.to_string(), lines);
    }
}

impl RecordingStorage for MemoryRecordingStorage {
    fn append_line(&mut self, session: &str, line: &str) -> Result<()> {
        if self.fail_writes {
            return Err(std::io::Error::other("storage is read-only").into());
        }
        self.sessions
            .entry(session.to_string())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self, _session: &str) -> Result<()> {
        Ok(())
    }

    fn read_lines(&self, session: &str) -> Result<Vec<String>> {
        self.sessions
            .get(session)
            .cloned()
            .ok_or_else(|| ArenaError::not_found(session))
    }

    fn list_recordings(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.sessions.keys().cloned().collect();
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }
}
