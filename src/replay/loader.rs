//! Keyframe loading
//!
//! Lines that are not readable keyframes (headers, foreign records, garbage)
//! are skipped; the rest are ordered by timestamp regardless of file order.

use crate::error::Result;
use crate::persistence::format::{Keyframe, RecordLine};
use crate::platform::storage::RecordingStorage;

/// Tolerant parse of raw recording lines into time-ordered keyframes
pub fn parse_keyframes<I, S>(lines: I) -> Vec<Keyframe>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keyframes = Vec::new();
    let mut skipped = 0usize;

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        match RecordLine::parse(line) {
            Some(RecordLine::Keyframe(kf)) => keyframes.push(kf),
            Some(RecordLine::Header(_)) => {}
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} unreadable recording lines", skipped);
    }

    // Stable, so equal timestamps keep file order
    keyframes.sort_by(|a, b| a.t.total_cmp(&b.t));
    keyframes
}

/// Read a whole session and parse its keyframes
pub fn load_keyframes(storage: &dyn RecordingStorage, session: &str) -> Result<Vec<Keyframe>> {
    let lines = storage.read_lines(session)?;
    let keyframes = parse_keyframes(&lines);
    log::info!(
        "Loaded {} keyframes from {} ({} lines)",
        keyframes.len(),
        session,
        lines.len()
    );
    Ok(keyframes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArenaError;
    use crate::platform::storage::MemoryRecordingStorage;

    #[test]
    fn test_sorts_by_timestamp() {
        let lines = [
            r#"{"type":"keyframe","t":0.2,"entities":[]}"#,
            r#"{"type":"keyframe","t":0.0,"entities":[]}"#,
            r#"{"type":"keyframe","t":0.1,"entities":[]}"#,
        ];
        let ts: Vec<f64> = parse_keyframes(lines).iter().map(|k| k.t).collect();
        assert_eq!(ts, vec![0.0, 0.1, 0.2]);
    }

    #[test]
    fn test_skips_everything_but_keyframes() {
        let lines = [
            r#"{"type":"header","version":1,"width":800,"height":600,"seed":3}"#,
            "",
            "{{ broken",
            r#"{"type":"input","t":0.5}"#,
            r#"{"type":"keyframe","t":0.5,"entities":[{"id":"a","x":1,"y":2}]}"#,
        ];
        let kfs = parse_keyframes(lines);
        assert_eq!(kfs.len(), 1);
        assert_eq!(kfs[0].entities[0].position().x, 1.0);
    }

    #[test]
    fn test_load_from_storage() {
        let mut storage = MemoryRecordingStorage::new();
        storage.insert(
            "s.jsonl",
            vec![r#"{"type":"keyframe","t":1,"entities":[]}"#.to_string()],
        );
        assert_eq!(load_keyframes(&storage, "s.jsonl").unwrap().len(), 1);
        assert!(matches!(
            load_keyframes(&storage, "missing.jsonl"),
            Err(ArenaError::NotFound(_))
        ));
    }
}
