//! Spatial combat resolver
//!
//! Pure range and overlap tests over (position, radius) pairs. Called every
//! frame by the actors; the population is small, so everything is a linear
//! scan and nothing is cached.

use glam::Vec2;

use super::world::{Capability, Entity, EntityId, World};

/// Radius used for monsters without a render descriptor
pub const DEFAULT_MONSTER_RADIUS: f32 = 0.0;

/// A collidable circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub radius: f32,
}

impl Body {
    /// Body of an entity. `None` when it has no transform: such an entity is
    /// absent as far as the resolver is concerned.
    pub fn of(entity: &Entity, default_radius: f32) -> Option<Self> {
        let pos = entity.position()?;
        Some(Self {
            pos,
            radius: collision_radius(entity, default_radius),
        })
    }
}

/// Half the render width, or the category default without a render descriptor
#[inline]
pub fn collision_radius(entity: &Entity, default_radius: f32) -> f32 {
    entity.render.map(|r| r.radius()).unwrap_or(default_radius)
}

/// Euclidean distance between `a` and `b` is at most `threshold`
#[inline]
pub fn in_range(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance(b) <= threshold
}

/// Circles touch or overlap
#[inline]
pub fn overlaps(a: Body, b: Body) -> bool {
    in_range(a.pos, b.pos, a.radius + b.radius)
}

/// `target` is within `reach` of `origin`, measured to the target's edge
#[inline]
pub fn within_reach(origin: Vec2, target: Body, reach: f32) -> bool {
    in_range(origin, target.pos, reach + target.radius)
}

/// Candidate minimizing squared distance to `origin`; ties go to the first seen
pub fn nearest<T>(origin: Vec2, candidates: impl IntoIterator<Item = (T, Vec2)>) -> Option<(T, Vec2)> {
    let mut best: Option<(T, Vec2)> = None;
    let mut best_dist_sq = f32::MAX;
    for (key, pos) in candidates {
        let dist_sq = origin.distance_squared(pos);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = Some((key, pos));
        }
    }
    best
}

/// Bodies of all live monsters, in scan order
pub fn monster_bodies(world: &World) -> Vec<(EntityId, Body)> {
    world
        .query(Capability::Monster)
        .filter_map(|e| Body::of(e, DEFAULT_MONSTER_RADIUS).map(|b| (e.id, b)))
        .collect()
}

/// Any live monster within `reach` of `origin`
pub fn any_monster_within(world: &World, origin: Vec2, reach: f32) -> bool {
    monster_bodies(world)
        .into_iter()
        .any(|(_, body)| within_reach(origin, body, reach))
}

/// Nearest live monster within `reach` of `origin`
pub fn nearest_monster_within(world: &World, origin: Vec2, reach: f32) -> Option<EntityId> {
    let in_reach = monster_bodies(world)
        .into_iter()
        .filter(|(_, body)| within_reach(origin, *body, reach))
        .map(|(id, body)| (id, body.pos));
    nearest(origin, in_reach).map(|(id, _)| id)
}

/// Nearest live monster at any distance
pub fn nearest_monster(world: &World, origin: Vec2) -> Option<(EntityId, Vec2)> {
    nearest(
        origin,
        world
            .query(Capability::Monster)
            .filter_map(|e| e.position().map(|p| (e.id, p))),
    )
}
