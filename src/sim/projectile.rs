//! Projectile behavior
//!
//! Projectiles fly in a straight line at constant velocity. Each resolves at
//! most one hit per frame: the first monster in scan order wins.

use super::collision::{Body, monster_bodies, overlaps};
use super::state::{MatchEvent, MatchState};
use super::world::Capability;
use crate::consts::*;

/// Radius used when a projectile has no render descriptor
const DEFAULT_PROJECTILE_RADIUS: f32 = PROJECTILE_SIZE / 2.0;

/// Move every projectile; those that leave the playfield are destroyed
pub fn fly(state: &mut MatchState, dt: f32) {
    for id in state.world.ids_with(Capability::Projectile) {
        let Some(entity) = state.world.get_mut(id) else { continue };
        let Some(velocity) = entity.projectile().map(|p| p.velocity) else {
            continue;
        };
        let Some(transform) = entity.transform.as_mut() else { continue };

        transform.position += velocity * dt;
        let pos = transform.position;
        if pos.x < 0.0 || pos.x > SCREEN_WIDTH || pos.y < 0.0 || pos.y > SCREEN_HEIGHT {
            state.world.destroy(id);
        }
    }
}

/// Resolve projectile/monster overlaps
pub fn resolve_hits(state: &mut MatchState) {
    for id in state.world.ids_with(Capability::Projectile) {
        let Some(body) = state.world.get(id).and_then(|e| Body::of(e, DEFAULT_PROJECTILE_RADIUS))
        else {
            continue;
        };

        let hit = monster_bodies(&state.world)
            .into_iter()
            .find(|(_, monster)| overlaps(body, *monster))
            .map(|(monster, _)| monster);

        if let Some(monster) = hit {
            state.world.destroy(id);
            state.world.destroy(monster);
            log::debug!("Projectile {:?} hit monster {:?}", id, monster);
            state.push_event(MatchEvent::ProjectileHit {
                projectile: id,
                monster,
            });
            state.reward_kill_heal();
            state.add_score(1);
            state.spawn_monster();
        }
    }
}
