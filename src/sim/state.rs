//! Match state and controller
//!
//! Owns the actor population, score, spawn cadence and the stop request.
//! Actors reach the player through `player_id`, never through ownership.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::world::{
    Actor, Capability, Color, EntityBuilder, EntityId, MonsterState, Physics, PlayerState,
    ProjectileState, RenderDesc, ShapeKind, World,
};
use crate::consts::*;

/// Entity colors used as combat signals
pub mod palette {
    use crate::sim::world::Color;

    pub const PLAYER: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const PLAYER_BLOCKING: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const MONSTER_IDLE: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const PROJECTILE: Color = Color::rgb(1.0, 1.0, 0.0);

    /// Monster tint while charging: white fading to red as `ratio` goes 0 → 1
    pub fn monster_charging(ratio: f32) -> Color {
        let ratio = ratio.clamp(0.0, 1.0);
        Color::rgb(1.0, 1.0 - ratio, 1.0 - ratio)
    }
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Running,
    /// Stop requested (player defeated or explicit exit)
    Stopped,
}

/// Notable things that happened during a tick, drained by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    MonsterSpawned { id: EntityId, pos: Vec2 },
    MeleeHit { monster: EntityId },
    ProjectileFired { id: EntityId, direction: Vec2 },
    /// Ranged attack refused because a monster is in melee range
    RangedRefused,
    /// Ranged attack with nothing to aim at
    NoTarget,
    ProjectileHit { projectile: EntityId, monster: EntityId },
    AttackBlocked { monster: EntityId },
    AttackLanded { monster: EntityId, health: i32 },
    PlayerDefeated,
}

/// Complete match state
#[derive(Debug, Clone)]
pub struct MatchState {
    pub world: World,
    /// The player entity, if alive
    pub player_id: Option<EntityId>,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    score: u64,
    /// Seconds since the last cadence spawn
    spawn_timer: f32,
    /// Simulated seconds since match start
    pub elapsed: f32,
    pub phase: MatchPhase,
    events: Vec<MatchEvent>,
}

impl MatchState {
    /// New match: player at the playfield center plus one monster
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            world: World::new(),
            player_id: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            spawn_timer: 0.0,
            elapsed: 0.0,
            phase: MatchPhase::Running,
            events: Vec::new(),
        };

        let center = Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0);
        state.player_id = Some(state.spawn_player(center));
        state.spawn_monster();

        state
    }

    /// Empty match with no actors (tests and scripted setups)
    pub fn empty(seed: u64) -> Self {
        Self {
            world: World::new(),
            player_id: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            spawn_timer: 0.0,
            elapsed: 0.0,
            phase: MatchPhase::Running,
            events: Vec::new(),
        }
    }

    pub fn spawn_player(&mut self, pos: Vec2) -> EntityId {
        let id = self.world.spawn(
            EntityBuilder::named("Huluwa")
                .at(pos)
                .with_render(RenderDesc::new(
                    ShapeKind::Circle,
                    PLAYER_SIZE,
                    PLAYER_SIZE,
                    palette::PLAYER,
                ))
                .with_physics(Physics::new(PLAYER_FRICTION))
                .with_actor(Actor::Player(PlayerState::new(PLAYER_START_HEALTH))),
        );
        if self.player_id.is_none() {
            self.player_id = Some(id);
        }
        id
    }

    pub fn spawn_monster_at(&mut self, pos: Vec2) -> EntityId {
        let id = self.world.spawn(
            EntityBuilder::named("Monster")
                .at(pos)
                .with_render(RenderDesc::new(
                    ShapeKind::Rectangle,
                    MONSTER_SIZE,
                    MONSTER_SIZE,
                    palette::MONSTER_IDLE,
                ))
                .with_physics(Physics::new(MONSTER_FRICTION))
                .with_actor(Actor::Monster(MonsterState::new(MONSTER_ATTACK_RANGE))),
        );
        self.events.push(MatchEvent::MonsterSpawned { id, pos });
        id
    }

    /// Spawn a monster at a uniformly random position inset from the edges
    pub fn spawn_monster(&mut self) -> EntityId {
        let x = SPAWN_MARGIN + self.rng.random::<f32>() * (SCREEN_WIDTH - 2.0 * SPAWN_MARGIN);
        let y = SPAWN_MARGIN + self.rng.random::<f32>() * (SCREEN_HEIGHT - 2.0 * SPAWN_MARGIN);
        self.spawn_monster_at(Vec2::new(x, y))
    }

    /// Spawn a projectile leaving `origin` along `direction`
    pub fn spawn_projectile(&mut self, origin: Vec2, direction: Vec2) -> EntityId {
        let dir = direction.normalize_or_zero();
        self.world.spawn(
            EntityBuilder::named("Bullet")
                .at(origin + dir * PROJECTILE_MUZZLE_OFFSET)
                .with_render(RenderDesc::new(
                    ShapeKind::Circle,
                    PROJECTILE_SIZE,
                    PROJECTILE_SIZE,
                    palette::PROJECTILE,
                ))
                .with_actor(Actor::Projectile(ProjectileState {
                    velocity: dir * PROJECTILE_SPEED,
                })),
        )
    }

    /// Roll for an immediate replacement after a melee kill
    pub fn roll_replacement(&mut self) -> bool {
        self.rng.random_bool(REPLACEMENT_SPAWN_CHANCE)
    }

    /// Advance the spawn cadence; spawns when the interval elapses and the
    /// population is below the cap
    pub fn advance_spawn_timer(&mut self, dt: f32) {
        self.spawn_timer += dt;
        if self.spawn_timer >= SPAWN_INTERVAL {
            self.spawn_timer = 0.0;
            if self.monster_count() < MAX_MONSTERS {
                self.spawn_monster();
            }
        }
    }

    pub fn monster_count(&self) -> usize {
        self.world.count(Capability::Monster)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Scores only ever go up
    pub fn add_score(&mut self, delta: u32) {
        self.score += u64::from(delta);
        log::info!("Score! Current score: {}", self.score);
    }

    /// Player combat state, if the player is alive
    pub fn player(&self) -> Option<&PlayerState> {
        self.player_id
            .and_then(|id| self.world.get(id))
            .and_then(|e| e.player())
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.player_id
            .and_then(|id| self.world.get(id))
            .and_then(|e| e.position())
    }

    pub fn player_health(&self) -> Option<i32> {
        self.player().map(|p| p.health())
    }

    pub fn player_blocking(&self) -> bool {
        self.player().is_some_and(|p| p.blocking)
    }

    /// Single entry point for every player health change. Health at or below
    /// zero stops the match.
    pub fn change_player_health(&mut self, delta: i32) -> Option<i32> {
        let id = self.player_id?;
        let player = self.world.get_mut(id)?.player_mut()?;
        player.health += delta;
        let health = player.health;
        if health <= 0 && self.phase == MatchPhase::Running {
            log::info!("Game over! Huluwa was defeated.");
            self.events.push(MatchEvent::PlayerDefeated);
            self.request_stop();
        }
        Some(health)
    }

    /// Kill reward: heal by `KILL_HEAL`, never past `HEAL_CAP`, never down
    pub fn reward_kill_heal(&mut self) {
        let Some(health) = self.player_health() else {
            return;
        };
        if health < HEAL_CAP {
            let delta = (health + KILL_HEAL).min(HEAL_CAP) - health;
            self.change_player_health(delta);
        }
    }

    /// Ask the surrounding runtime to stop the simulation loop
    pub fn request_stop(&mut self) {
        self.phase = MatchPhase::Stopped;
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == MatchPhase::Stopped
    }

    pub(crate) fn push_event(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }
}
