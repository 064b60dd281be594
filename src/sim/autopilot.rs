//! Demo mode - the AI plays the player
//!
//! Produces the same input snapshot a human would, so the rest of the
//! simulation can't tell the difference.

use glam::Vec2;

use super::collision::nearest_monster;
use super::state::MatchState;
use super::world::Capability;
use crate::consts::*;
use crate::platform::input::{Action, InputSnapshot};

/// Preferred distance to the nearest monster when nothing is in reach
const WORKING_DISTANCE: f32 = 180.0;
/// Block once any charge is this far along
const BLOCK_AT_CHARGE: f32 = 0.85;

/// Build this frame's input from the match state
pub fn autopilot_input(state: &MatchState) -> InputSnapshot {
    let mut input = InputSnapshot::new();
    let Some(pos) = state.player_position() else {
        return input;
    };

    // Block if any attack is about to land
    let danger = state
        .world
        .query(Capability::Monster)
        .filter_map(|e| e.monster())
        .any(|m| m.attack_timer / MONSTER_ATTACK_INTERVAL >= BLOCK_AT_CHARGE);
    if danger {
        input.set_held(Action::Block, true);
    }

    let Some((_, target)) = nearest_monster(&state.world, pos) else {
        // Nothing to fight: drift back toward the center
        steer_toward(&mut input, pos, Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0), 20.0);
        return input;
    };

    let distance = pos.distance(target);
    if distance <= MELEE_RANGE {
        input.set_held(Action::Melee, true);
    } else {
        input.set_pressed(Action::Ranged);
        if distance < WORKING_DISTANCE {
            // Back off to keep shooting lanes open
            steer_toward(&mut input, pos, pos * 2.0 - target, 0.0);
        } else {
            steer_toward(&mut input, pos, target, WORKING_DISTANCE);
        }
    }

    input
}

/// Hold the directions that move `from` toward `to`, stopping within `slack`
fn steer_toward(input: &mut InputSnapshot, from: Vec2, to: Vec2, slack: f32) {
    let delta = to - from;
    if delta.length() <= slack {
        return;
    }
    let dir = delta.normalize_or_zero();
    input.set_held(Action::Right, dir.x > 0.3);
    input.set_held(Action::Left, dir.x < -0.3);
    input.set_held(Action::Down, dir.y > 0.3);
    input.set_held(Action::Up, dir.y < -0.3);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::tick;

    #[test]
    fn test_melee_when_adjacent() {
        let mut state = MatchState::empty(0);
        state.spawn_player(Vec2::new(400.0, 300.0));
        state.spawn_monster_at(Vec2::new(440.0, 300.0));
        let input = autopilot_input(&state);
        assert!(input.is_held(Action::Melee));
        assert!(!input.just_pressed(Action::Ranged));
    }

    #[test]
    fn test_shoots_from_distance() {
        let mut state = MatchState::empty(0);
        state.spawn_player(Vec2::new(100.0, 300.0));
        state.spawn_monster_at(Vec2::new(700.0, 300.0));
        let input = autopilot_input(&state);
        assert!(input.just_pressed(Action::Ranged));
        assert!(input.is_held(Action::Right));
    }

    #[test]
    fn test_blocks_when_charge_nearly_done() {
        let mut state = MatchState::empty(0);
        state.spawn_player(Vec2::new(400.0, 300.0));
        let m = state.spawn_monster_at(Vec2::new(450.0, 300.0));
        state.world.get_mut(m).unwrap().monster_mut().unwrap().attack_timer = 4.5;
        assert!(autopilot_input(&state).is_held(Action::Block));
    }

    #[test]
    fn test_autopilot_scores_over_time() {
        let mut state = MatchState::new(2024);
        for _ in 0..(120 * 20) {
            let input = autopilot_input(&state);
            tick(&mut state, &input, SIM_DT);
            if state.is_stopped() {
                break;
            }
        }
        assert!(state.score() > 0);
    }
}
