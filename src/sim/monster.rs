//! Monster behavior
//!
//! Monsters chase the player until within attack range, then hold position
//! and charge an attack. The charge is telegraphed through the render color.

use super::collision::{collision_radius, in_range, DEFAULT_MONSTER_RADIUS};
use super::state::{MatchEvent, MatchState, palette};
use super::world::Capability;
use crate::consts::*;

/// Point every monster at the player. Without a player nothing changes.
pub fn steer(state: &mut MatchState) {
    let Some(player_pos) = state.player_position() else { return };

    for id in state.world.ids_with(Capability::Monster) {
        let Some(entity) = state.world.get_mut(id) else { continue };
        let Some(pos) = entity.position() else { continue };
        let Some(attack_range) = entity.monster().map(|m| m.attack_range) else {
            continue;
        };
        let Some(physics) = entity.physics.as_mut() else { continue };

        let to_player = player_pos - pos;
        physics.velocity = if to_player.length() > attack_range {
            to_player.normalize_or_zero() * MONSTER_SPEED
        } else {
            glam::Vec2::ZERO
        };
    }
}

/// Charge, telegraph and resolve attacks against the player
pub fn attack(state: &mut MatchState, dt: f32) {
    let Some(player_pos) = state.player_position() else { return };

    for id in state.world.ids_with(Capability::Monster) {
        if state.is_stopped() {
            break;
        }
        let Some(entity) = state.world.get_mut(id) else { continue };
        let Some(pos) = entity.position() else { continue };
        let radius = collision_radius(entity, DEFAULT_MONSTER_RADIUS);
        let render = entity.render.as_mut();
        let Some(monster) = entity.actor.as_mut().and_then(|a| match a {
            super::world::Actor::Monster(m) => Some(m),
            _ => None,
        }) else {
            continue;
        };

        if !in_range(pos, player_pos, monster.attack_range + radius) {
            // No partial credit for leaving range
            monster.attack_timer = 0.0;
            if let Some(render) = render {
                render.color = palette::MONSTER_IDLE;
            }
            continue;
        }

        monster.attack_timer += dt;
        if let Some(render) = render {
            let ratio = (monster.attack_timer / MONSTER_ATTACK_INTERVAL).min(1.0);
            render.color = palette::monster_charging(ratio);
        }
        if monster.attack_timer < MONSTER_ATTACK_INTERVAL {
            continue;
        }
        monster.attack_timer = 0.0;

        if state.player_blocking() {
            log::debug!("Monster {:?} attacked, but Huluwa blocked", id);
            state.push_event(MatchEvent::AttackBlocked { monster: id });
        } else if let Some(health) = state.change_player_health(-MONSTER_DAMAGE) {
            log::debug!("Monster {:?} hit Huluwa, HP: {}", id, health);
            state.push_event(MatchEvent::AttackLanded { monster: id, health });
        }
    }
}
