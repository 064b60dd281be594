//! Time-indexed replay of recorded keyframes
//!
//! The playback clock only moves forward and stops at the last sample. For any
//! clock value the bracketing pair of samples is found, and every pooled entity
//! is placed on the straight line between its two sampled positions. Visuals
//! are fixed when a pool entity is created; only positions move afterwards.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::lerp_exact;
use crate::persistence::format::{EntitySnapshot, Keyframe};
use crate::sim::world::{RenderDesc, ShapeKind};

/// Smallest interval used when dividing by the distance between two samples
const MIN_SPAN: f64 = 1e-6;

/// Side length for snapshots with an unknown shape and no usable size
const FALLBACK_SIZE: f32 = 20.0;

/// How entities of two consecutive samples are paired up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correspondence {
    /// Same position in the entity list
    #[default]
    ByIndex,
    /// Same recorded id, falling back to the list position for new ids
    ById,
}

/// A pooled stand-in for a recorded entity
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEntity {
    pub name: String,
    pub position: Vec2,
    pub render: RenderDesc,
    pub active: bool,
}

impl ReplayEntity {
    fn from_snapshot(snapshot: &EntitySnapshot, name: String) -> Self {
        Self {
            name,
            position: snapshot.position(),
            render: visual_of(snapshot),
            active: true,
        }
    }
}

/// Render descriptor for a recorded snapshot
pub fn visual_of(snapshot: &EntitySnapshot) -> RenderDesc {
    match snapshot.rt {
        Some(shape) => RenderDesc::new(shape, snapshot.w.max(1.0), snapshot.h.max(1.0), snapshot.color),
        None => {
            let w = if snapshot.w > 0.0 { snapshot.w } else { FALLBACK_SIZE };
            let h = if snapshot.h > 0.0 { snapshot.h } else { FALLBACK_SIZE };
            RenderDesc::new(ShapeKind::Rectangle, w.max(1.0), h.max(1.0), snapshot.color)
        }
    }
}

/// Replay state for one loaded session
#[derive(Debug, Clone)]
pub struct Playback {
    keyframes: Vec<Keyframe>,
    clock: f64,
    pool: Vec<ReplayEntity>,
    /// Pool slot owned by each recorded id (`ById` only)
    slots_by_id: HashMap<String, usize>,
    correspondence: Correspondence,
}

impl Playback {
    /// Build the pool from the first sample and place it at clock 0
    pub fn new(mut keyframes: Vec<Keyframe>, correspondence: Correspondence) -> Self {
        keyframes.sort_by(|a, b| a.t.total_cmp(&b.t));

        let pool = keyframes
            .first()
            .map(|kf| {
                kf.entities
                    .iter()
                    .enumerate()
                    .map(|(i, s)| ReplayEntity::from_snapshot(s, display_name(s, i, "Obj")))
                    .collect()
            })
            .unwrap_or_default();

        let mut slots_by_id = HashMap::new();
        if correspondence == Correspondence::ById {
            if let Some(first) = keyframes.first() {
                for (i, s) in first.entities.iter().enumerate() {
                    slots_by_id.entry(slot_key(s, i)).or_insert(i);
                }
            }
        }

        let mut playback = Self {
            keyframes,
            clock: 0.0,
            pool,
            slots_by_id,
            correspondence,
        };
        playback.apply();
        playback
    }

    /// Move the clock forward by `dt` seconds (clamped to the last sample)
    pub fn advance(&mut self, dt: f32) {
        if self.keyframes.is_empty() {
            return;
        }
        self.seek(self.clock + f64::from(dt.max(0.0)));
    }

    /// Jump the clock to `time` (clamped to the last sample)
    pub fn seek(&mut self, time: f64) {
        if self.keyframes.is_empty() {
            return;
        }
        self.clock = time.min(self.duration());
        self.apply();
    }

    /// Indices of the samples bracketing the current clock
    pub fn bracket(&self) -> Option<(usize, usize)> {
        let last = self.keyframes.len().checked_sub(1)?;
        let found = self
            .keyframes
            .windows(2)
            .position(|w| self.clock >= w[0].t && self.clock <= w[1].t);
        Some(match found {
            Some(i) => (i, i + 1),
            None => (0, last),
        })
    }

    fn apply(&mut self) {
        let Some((ia, ib)) = self.bracket() else {
            return;
        };
        let a = &self.keyframes[ia];
        let b = &self.keyframes[ib];
        let span = (b.t - a.t).max(MIN_SPAN);
        let u = ((self.clock - a.t) / span).clamp(0.0, 1.0) as f32;

        let n = a.entities.len().min(b.entities.len());
        match self.correspondence {
            Correspondence::ByIndex => {
                reconcile_pool(&mut self.pool, n, a);
                for (i, slot) in self.pool.iter_mut().take(n).enumerate() {
                    slot.position = lerp_exact(a.entities[i].position(), b.entities[i].position(), u);
                }
            }
            Correspondence::ById => place_by_id(&mut self.pool, &mut self.slots_by_id, a, b, n, u),
        }
    }

    /// Pool entities, active and inactive
    pub fn entities(&self) -> &[ReplayEntity] {
        &self.pool
    }

    pub fn active_entities(&self) -> impl Iterator<Item = &ReplayEntity> {
        self.pool.iter().filter(|e| e.active)
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Timestamp of the last sample (0 when empty)
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map(|kf| kf.t).unwrap_or(0.0)
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        !self.is_empty() && self.clock >= self.duration()
    }
}

fn display_name(snapshot: &EntitySnapshot, index: usize, prefix: &str) -> String {
    if snapshot.id.is_empty() {
        format!("{}#{}", prefix, index)
    } else {
        snapshot.id.clone()
    }
}

/// Pool key for a snapshot: its id, or its list index when it has none
fn slot_key(snapshot: &EntitySnapshot, index: usize) -> String {
    if snapshot.id.is_empty() {
        format!("#{}", index)
    } else {
        snapshot.id.clone()
    }
}

/// Each recorded id keeps one pool slot for the whole replay. A new id gets a
/// fresh slot styled from its own snapshot and starts from the earlier
/// sample's entity at the same index. Slots whose id is absent go inactive.
fn place_by_id(
    pool: &mut Vec<ReplayEntity>,
    slots: &mut HashMap<String, usize>,
    earlier: &Keyframe,
    later: &Keyframe,
    n: usize,
    u: f32,
) {
    let mut starts: HashMap<&str, &EntitySnapshot> = HashMap::new();
    for s in earlier.entities.iter().filter(|s| !s.id.is_empty()) {
        starts.entry(s.id.as_str()).or_insert(s);
    }

    for slot in pool.iter_mut() {
        slot.active = false;
    }

    for (i, end) in later.entities.iter().take(n).enumerate() {
        let matched = starts.get(end.id.as_str()).copied();
        let start = matched.unwrap_or(&earlier.entities[i]);
        let key = slot_key(end, i);
        let index = match slots.get(&key) {
            Some(&index) => index,
            None => {
                let source = matched.unwrap_or(end);
                pool.push(ReplayEntity::from_snapshot(source, display_name(end, i, "RObj")));
                slots.insert(key, pool.len() - 1);
                pool.len() - 1
            }
        };
        let slot = &mut pool[index];
        slot.active = true;
        slot.position = lerp_exact(start.position(), end.position(), u);
    }
}

/// Resize the active prefix of the pool to `n`: reactivate or create slots
/// to grow, deactivate surplus to shrink
fn reconcile_pool(pool: &mut Vec<ReplayEntity>, n: usize, earlier: &Keyframe) {
    for (i, slot) in pool.iter_mut().enumerate() {
        slot.active = i < n;
    }
    while pool.len() < n {
        let i = pool.len();
        let snapshot = &earlier.entities[i];
        pool.push(ReplayEntity::from_snapshot(snapshot, display_name(snapshot, i, "RObj")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::Color;

    fn snap(id: &str, x: f32, y: f32) -> EntitySnapshot {
        EntitySnapshot {
            id: id.to_string(),
            rt: Some(ShapeKind::Circle),
            w: 30.0,
            h: 30.0,
            color: Color::rgb(0.0, 1.0, 0.0),
            x,
            y,
        }
    }

    fn kf(t: f64, entities: Vec<EntitySnapshot>) -> Keyframe {
        Keyframe { t, entities }
    }

    fn positions(p: &Playback) -> Vec<Vec2> {
        p.active_entities().map(|e| e.position).collect()
    }

    #[test]
    fn test_midpoint_interpolation() {
        let mut p = Playback::new(
            vec![kf(0.0, vec![snap("a", 0.0, 0.0)]), kf(1.0, vec![snap("a", 10.0, 0.0)])],
            Correspondence::ByIndex,
        );
        p.advance(0.5);
        assert_eq!(positions(&p), vec![Vec2::new(5.0, 0.0)]);
    }

    #[test]
    fn test_exact_at_sample_times() {
        let a = Vec2::new(0.1, 123.456);
        let b = Vec2::new(789.3, -0.7);
        let mut p = Playback::new(
            vec![kf(0.0, vec![snap("a", a.x, a.y)]), kf(0.7, vec![snap("a", b.x, b.y)])],
            Correspondence::ByIndex,
        );
        assert_eq!(positions(&p), vec![a]);
        p.seek(0.7);
        assert_eq!(positions(&p), vec![b]);
    }

    #[test]
    fn test_clock_clamps_at_last_sample() {
        let mut p = Playback::new(
            vec![kf(0.0, vec![snap("a", 0.0, 0.0)]), kf(1.0, vec![snap("a", 10.0, 4.0)])],
            Correspondence::ByIndex,
        );
        for _ in 0..30 {
            p.advance(0.1);
        }
        assert_eq!(p.clock(), 1.0);
        assert!(p.is_finished());
        assert_eq!(positions(&p), vec![Vec2::new(10.0, 4.0)]);
    }

    #[test]
    fn test_before_first_sample_uses_first_positions() {
        let p = Playback::new(
            vec![kf(2.0, vec![snap("a", 3.0, 3.0)]), kf(3.0, vec![snap("a", 9.0, 9.0)])],
            Correspondence::ByIndex,
        );
        assert_eq!(p.bracket(), Some((0, 1)));
        assert_eq!(positions(&p), vec![Vec2::new(3.0, 3.0)]);
    }

    #[test]
    fn test_duplicate_timestamps_do_not_divide_by_zero() {
        let mut p = Playback::new(
            vec![kf(1.0, vec![snap("a", 0.0, 0.0)]), kf(1.0, vec![snap("a", 8.0, 0.0)])],
            Correspondence::ByIndex,
        );
        p.advance(5.0);
        // Zero-length bracket resolves to its earlier sample
        assert_eq!(p.bracket(), Some((0, 1)));
        assert_eq!(positions(&p), vec![Vec2::ZERO]);
    }

    #[test]
    fn test_pool_shrinks_by_deactivating() {
        let mut p = Playback::new(
            vec![
                kf(0.0, vec![snap("a", 0.0, 0.0), snap("b", 1.0, 1.0), snap("c", 2.0, 2.0)]),
                kf(1.0, vec![snap("a", 4.0, 0.0)]),
            ],
            Correspondence::ByIndex,
        );
        p.advance(0.5);
        assert_eq!(p.entities().len(), 3);
        assert_eq!(p.active_entities().count(), 1);
        assert_eq!(positions(&p), vec![Vec2::new(2.0, 0.0)]);
    }

    #[test]
    fn test_pool_grows_with_earlier_sample_visuals() {
        let mut bigger = snap("m", 50.0, 50.0);
        bigger.rt = Some(ShapeKind::Rectangle);
        bigger.w = 25.0;
        bigger.h = 25.0;
        let mut p = Playback::new(
            vec![
                kf(0.0, vec![snap("a", 0.0, 0.0)]),
                kf(1.0, vec![snap("a", 1.0, 0.0), bigger.clone()]),
                kf(2.0, vec![snap("a", 2.0, 0.0), snap("m", 60.0, 50.0)]),
            ],
            Correspondence::ByIndex,
        );
        // Only one entity shared by the first two samples
        p.advance(0.5);
        assert_eq!(p.entities().len(), 1);

        p.advance(1.0);
        assert_eq!(p.entities().len(), 2);
        let grown = &p.entities()[1];
        assert!(grown.active);
        assert_eq!(grown.name, "m");
        assert_eq!(grown.render.shape, ShapeKind::Rectangle);
        assert_eq!(grown.position, Vec2::new(55.0, 50.0));
    }

    #[test]
    fn test_shrunk_slots_come_back() {
        let mut p = Playback::new(
            vec![
                kf(0.0, vec![snap("a", 0.0, 0.0), snap("b", 0.0, 0.0)]),
                kf(1.0, vec![snap("a", 0.0, 0.0)]),
                kf(2.0, vec![snap("a", 0.0, 0.0)]),
                kf(3.0, vec![snap("a", 0.0, 0.0), snap("c", 9.0, 9.0)]),
                kf(4.0, vec![snap("a", 0.0, 0.0), snap("c", 9.0, 9.0)]),
            ],
            Correspondence::ByIndex,
        );
        p.seek(1.5);
        assert_eq!(p.active_entities().count(), 1);
        p.seek(3.5);
        assert_eq!(p.entities().len(), 2);
        assert_eq!(p.active_entities().count(), 2);
        assert_eq!(p.entities()[1].position, Vec2::new(9.0, 9.0));
    }

    #[test]
    fn test_by_id_pairs_reordered_entities() {
        let frames = vec![
            kf(0.0, vec![snap("A", 0.0, 0.0), snap("B", 100.0, 0.0)]),
            kf(1.0, vec![snap("B", 110.0, 0.0), snap("A", 10.0, 0.0)]),
        ];

        let mut by_index = Playback::new(frames.clone(), Correspondence::ByIndex);
        by_index.advance(0.5);
        assert_eq!(by_index.entities()[0].position, Vec2::new(55.0, 0.0));

        let mut by_id = Playback::new(frames, Correspondence::ById);
        by_id.advance(0.5);
        let a = &by_id.entities()[0];
        let b = &by_id.entities()[1];
        assert_eq!((a.name.as_str(), a.position), ("A", Vec2::new(5.0, 0.0)));
        assert_eq!((b.name.as_str(), b.position), ("B", Vec2::new(105.0, 0.0)));
    }

    #[test]
    fn test_by_id_slot_keeps_its_own_visuals() {
        let mut a = snap("A", 0.0, 0.0);
        a.color = Color::rgb(0.0, 1.0, 0.0);
        let mut b = snap("B", 100.0, 0.0);
        b.rt = Some(ShapeKind::Rectangle);
        b.color = Color::rgb(1.0, 0.0, 1.0);
        let mut b_later = b.clone();
        b_later.x = 120.0;

        let mut p = Playback::new(
            vec![kf(0.0, vec![a, b]), kf(1.0, vec![b_later, snap("A", 10.0, 0.0)])],
            Correspondence::ById,
        );
        p.seek(1.0);
        for e in p.active_entities() {
            match e.name.as_str() {
                "A" => {
                    assert_eq!(e.render.shape, ShapeKind::Circle);
                    assert_eq!(e.position, Vec2::new(10.0, 0.0));
                }
                "B" => {
                    assert_eq!(e.render.shape, ShapeKind::Rectangle);
                    assert_eq!(e.position, Vec2::new(120.0, 0.0));
                }
                other => panic!("unexpected slot {}", other),
            }
        }
        assert_eq!(p.entities().len(), 2);
    }

    #[test]
    fn test_by_id_new_and_vanished_ids() {
        let mut c = snap("C", 50.0, 50.0);
        c.rt = Some(ShapeKind::Rectangle);
        let mut c_later = c.clone();
        c_later.x = 60.0;
        let mut p = Playback::new(
            vec![
                kf(0.0, vec![snap("A", 0.0, 0.0), snap("B", 100.0, 0.0)]),
                kf(1.0, vec![c, snap("A", 10.0, 0.0)]),
                kf(2.0, vec![c_later, snap("A", 20.0, 0.0)]),
            ],
            Correspondence::ById,
        );

        p.seek(0.5);
        assert_eq!(p.entities().len(), 3);
        let (slot_a, slot_b, slot_c) = (&p.entities()[0], &p.entities()[1], &p.entities()[2]);
        assert!(slot_a.active && !slot_b.active && slot_c.active);
        assert_eq!(slot_a.position, Vec2::new(5.0, 0.0));
        // New id starts from the earlier entity at its index, styled as itself
        assert_eq!(slot_c.name, "C");
        assert_eq!(slot_c.render.shape, ShapeKind::Rectangle);
        assert_eq!(slot_c.position, Vec2::new(25.0, 25.0));

        p.seek(1.5);
        assert_eq!(p.entities().len(), 3);
        assert_eq!(p.entities()[2].position, Vec2::new(55.0, 50.0));
        assert_eq!(p.entities()[0].position, Vec2::new(15.0, 0.0));
    }

    #[test]
    fn test_visuals_from_first_sample_only() {
        let mut first = snap("a", 0.0, 0.0);
        first.color = Color::rgb(1.0, 0.0, 0.0);
        let mut later = snap("a", 5.0, 0.0);
        later.color = Color::rgb(0.0, 0.0, 1.0);
        let mut p = Playback::new(vec![kf(0.0, vec![first]), kf(1.0, vec![later])], Correspondence::ByIndex);
        p.advance(1.0);
        assert_eq!(p.entities()[0].render.color, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_visual_rules() {
        let mut s = snap("x", 0.0, 0.0);
        s.w = 0.0;
        s.h = 0.5;
        assert_eq!(visual_of(&s).size, Vec2::new(1.0, 1.0));

        s.rt = None;
        s.h = 12.0;
        let v = visual_of(&s);
        assert_eq!(v.shape, ShapeKind::Rectangle);
        assert_eq!(v.size, Vec2::new(20.0, 12.0));
    }

    #[test]
    fn test_empty_recording() {
        let mut p = Playback::new(Vec::new(), Correspondence::ByIndex);
        p.advance(1.0);
        assert!(p.is_empty());
        assert!(!p.is_finished());
        assert!(p.entities().is_empty());
        assert_eq!(p.bracket(), None);
    }

    #[test]
    fn test_unnamed_snapshots_get_index_names() {
        let p = Playback::new(vec![kf(0.0, vec![EntitySnapshot::default()])], Correspondence::ByIndex);
        assert_eq!(p.entities()[0].name, "Obj#0");
        assert_eq!(p.entities()[0].render.size, Vec2::new(20.0, 20.0));
    }
}
