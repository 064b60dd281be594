//! Per-frame simulation step
//!
//! Advances the match by one timestep. Ordering matters: intent and movement
//! are resolved before any check that can destroy an entity, and destroyed
//! entities are invisible to every later scan in the same frame.

use super::state::MatchState;
use super::{monster, player, projectile};
use crate::platform::input::InputSnapshot;

/// Advance the match by `dt` seconds
pub fn tick(state: &mut MatchState, input: &InputSnapshot, dt: f32) {
    if state.is_stopped() {
        return;
    }
    state.elapsed += dt;

    state.advance_spawn_timer(dt);

    // Intent
    player::steer(state, input, dt);
    monster::steer(state);

    // Movement
    integrate(state, dt);
    player::clamp_to_playfield(state);
    projectile::fly(state, dt);

    // Combat
    player::attack(state, input);
    monster::attack(state, dt);
    projectile::resolve_hits(state);

    state.world.sweep();
}

/// Linear integration of every physics body
fn integrate(state: &mut MatchState, dt: f32) {
    for entity in state.world.iter_mut() {
        if let (Some(physics), Some(transform)) = (entity.physics.as_mut(), entity.transform.as_mut()) {
            physics.integrate(transform, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::platform::input::Action;
    use crate::sim::state::MatchEvent;
    use crate::sim::world::Capability;
    use glam::Vec2;

    #[test]
    fn test_monster_in_range_charges_instead_of_approaching() {
        let mut state = MatchState::empty(11);
        state.spawn_player(Vec2::new(400.0, 300.0));
        let m = state.spawn_monster_at(Vec2::new(450.0, 300.0));

        tick(&mut state, &InputSnapshot::new(), 0.1);

        let monster = state.world.get(m).unwrap();
        assert_eq!(monster.position(), Some(Vec2::new(450.0, 300.0)));
        assert!(monster.monster().unwrap().attack_timer > 0.0);
    }

    #[test]
    fn test_player_moves_and_stays_in_bounds() {
        let mut state = MatchState::empty(0);
        state.spawn_player(Vec2::new(20.0, 300.0));
        let input = InputSnapshot::new().hold(Action::Left);
        for _ in 0..10 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.player_position().unwrap().x, PLAYER_SIZE / 2.0);
    }

    #[test]
    fn test_stopped_match_does_not_advance() {
        let mut state = MatchState::new(1);
        state.request_stop();
        let before = state.elapsed;
        tick(&mut state, &InputSnapshot::new(), 1.0);
        assert_eq!(state.elapsed, before);
    }

    #[test]
    fn test_fired_projectile_eventually_scores() {
        let mut state = MatchState::empty(21);
        state.spawn_player(Vec2::new(100.0, 300.0));
        state.spawn_monster_at(Vec2::new(700.0, 300.0));

        // Let the ranged cooldown elapse, then fire once
        for _ in 0..70 {
            tick(&mut state, &InputSnapshot::new(), SIM_DT);
        }
        tick(&mut state, &InputSnapshot::new().press(Action::Ranged), SIM_DT);
        assert_eq!(state.world.count(Capability::Projectile), 1);

        for _ in 0..120 {
            tick(&mut state, &InputSnapshot::new(), SIM_DT);
        }
        assert_eq!(state.score(), 1);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, MatchEvent::ProjectileHit { .. }))
        );
    }

    #[test]
    fn test_determinism() {
        let mut a = MatchState::new(99999);
        let mut b = MatchState::new(99999);
        let inputs = [
            InputSnapshot::new().hold(Action::Up),
            InputSnapshot::new().hold(Action::Melee),
            InputSnapshot::new().press(Action::Ranged),
            InputSnapshot::new(),
        ];
        for _ in 0..100 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.monster_count(), b.monster_count());
        assert_eq!(a.player_position(), b.player_position());
    }
}
