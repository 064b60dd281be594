//! Player (Huluwa) behavior
//!
//! Intent runs before integration; attacks run after, against the
//! post-movement positions.

use glam::Vec2;

use super::collision::{any_monster_within, nearest_monster, nearest_monster_within};
use super::state::{MatchEvent, MatchState, palette};
use crate::consts::*;
use crate::platform::input::{Action, InputSnapshot};

/// Radius used to clamp the player when it has no render descriptor
const DEFAULT_PLAYER_RADIUS: f32 = PLAYER_SIZE / 2.0;

/// Advance cooldowns, turn held directions into velocity, update blocking
pub fn steer(state: &mut MatchState, input: &InputSnapshot, dt: f32) {
    let Some(id) = state.player_id else { return };
    let Some(entity) = state.world.get_mut(id) else { return };

    let blocking = input.is_held(Action::Block);
    if let Some(player) = entity.player_mut() {
        player.melee_timer += dt;
        player.ranged_timer += dt;
        player.blocking = blocking;
    }

    let mut intent = Vec2::ZERO;
    if input.is_held(Action::Up) {
        intent.y -= 1.0;
    }
    if input.is_held(Action::Down) {
        intent.y += 1.0;
    }
    if input.is_held(Action::Left) {
        intent.x -= 1.0;
    }
    if input.is_held(Action::Right) {
        intent.x += 1.0;
    }
    if let Some(physics) = entity.physics.as_mut() {
        physics.velocity = intent.normalize_or_zero() * PLAYER_SPEED;
    }

    if let Some(render) = entity.render.as_mut() {
        render.color = if blocking {
            palette::PLAYER_BLOCKING
        } else {
            palette::PLAYER
        };
    }
}

/// Keep the player's whole shape inside the playfield
pub fn clamp_to_playfield(state: &mut MatchState) {
    let Some(id) = state.player_id else { return };
    let Some(entity) = state.world.get_mut(id) else { return };
    let radius = entity.render.map(|r| r.radius()).unwrap_or(DEFAULT_PLAYER_RADIUS);
    if let Some(transform) = entity.transform.as_mut() {
        let pos = &mut transform.position;
        pos.x = pos.x.max(radius).min(SCREEN_WIDTH - radius);
        pos.y = pos.y.max(radius).min(SCREEN_HEIGHT - radius);
    }
}

/// Melee (held) and ranged (edge-triggered) attacks
pub fn attack(state: &mut MatchState, input: &InputSnapshot) {
    let Some(id) = state.player_id else { return };
    let Some((melee_ready, ranged_ready)) = state
        .world
        .get(id)
        .and_then(|e| e.player())
        .map(|p| (p.melee_timer >= MELEE_COOLDOWN, p.ranged_timer >= RANGED_COOLDOWN))
    else {
        return;
    };

    if input.is_held(Action::Melee) && melee_ready {
        reset_timer(state, |p| p.melee_timer = 0.0);
        perform_melee(state);
    }

    if input.just_pressed(Action::Ranged) && ranged_ready {
        reset_timer(state, |p| p.ranged_timer = 0.0);
        perform_ranged(state);
    }
}

fn reset_timer(state: &mut MatchState, f: impl FnOnce(&mut super::world::PlayerState)) {
    if let Some(player) = state
        .player_id
        .and_then(|id| state.world.get_mut(id))
        .and_then(|e| e.player_mut())
    {
        f(player);
    }
}

/// Destroy the nearest monster within melee reach, if any
fn perform_melee(state: &mut MatchState) {
    let Some(pos) = state.player_position() else { return };
    let Some(monster) = nearest_monster_within(&state.world, pos, MELEE_RANGE) else {
        return;
    };

    state.world.destroy(monster);
    log::debug!("Huluwa melee hit monster {:?}", monster);
    state.push_event(MatchEvent::MeleeHit { monster });
    state.reward_kill_heal();
    state.add_score(1);
    if state.roll_replacement() {
        state.spawn_monster();
    }
}

/// Fire at the nearest monster; refused while anything is in melee reach
fn perform_ranged(state: &mut MatchState) {
    let Some(pos) = state.player_position() else { return };

    if any_monster_within(&state.world, pos, MELEE_RANGE) {
        log::debug!("Enemy in melee range, cannot shoot");
        state.push_event(MatchEvent::RangedRefused);
        return;
    }

    match nearest_monster(&state.world, pos) {
        Some((_, target)) => {
            let direction = target - pos;
            let id = state.spawn_projectile(pos, direction);
            log::debug!("Huluwa fired projectile {:?}", id);
            state.push_event(MatchEvent::ProjectileFired {
                id,
                direction: direction.normalize_or_zero(),
            });
        }
        None => {
            log::debug!("No monster to aim at");
            state.push_event(MatchEvent::NoTarget);
        }
    }
}
