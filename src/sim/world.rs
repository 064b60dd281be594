//! Entity store with capability slots
//!
//! Every entity carries at most one of each capability. Actor kinds are
//! mutually exclusive, so they share a single `Actor` slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable entity identifier (never reused within a world)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// RGBA color, serialized as `[r, g, b, a]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Position in playfield space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
}

/// Linear movement primitive (no rotation, no restitution)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub velocity: Vec2,
    /// Velocity multiplier applied after each integration step
    pub friction: f32,
}

impl Physics {
    pub fn new(friction: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            friction,
        }
    }

    /// Translate by velocity, then bleed velocity by friction
    pub fn integrate(&mut self, transform: &mut Transform, dt: f32) {
        transform.position += self.velocity * dt;
        self.velocity *= self.friction;
    }
}

/// Shape drawn for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeKind {
    Circle,
    Rectangle,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "CIRCLE",
            ShapeKind::Rectangle => "RECTANGLE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CIRCLE" => Some(ShapeKind::Circle),
            "RECTANGLE" => Some(ShapeKind::Rectangle),
            _ => None,
        }
    }
}

/// Render descriptor; `size.x / 2` doubles as the collision radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderDesc {
    pub shape: ShapeKind,
    pub size: Vec2,
    pub color: Color,
}

impl RenderDesc {
    pub fn new(shape: ShapeKind, width: f32, height: f32, color: Color) -> Self {
        Self {
            shape,
            size: Vec2::new(width, height),
            color,
        }
    }

    /// Collision radius proxy
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.x / 2.0
    }
}

/// Player (Huluwa) combat state
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub(crate) health: i32,
    /// Seconds since the last melee swing
    pub melee_timer: f32,
    /// Seconds since the last ranged attempt
    pub ranged_timer: f32,
    pub blocking: bool,
}

impl PlayerState {
    pub fn new(health: i32) -> Self {
        Self {
            health,
            melee_timer: 0.0,
            ranged_timer: 0.0,
            blocking: false,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }
}

/// Monster combat state
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterState {
    pub attack_range: f32,
    /// Accumulated time spent charging an attack
    pub attack_timer: f32,
}

impl MonsterState {
    pub fn new(attack_range: f32) -> Self {
        Self {
            attack_range,
            attack_timer: 0.0,
        }
    }
}

/// Projectile flight state
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileState {
    pub velocity: Vec2,
}

/// Gameplay behavior slot
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Player(PlayerState),
    Monster(MonsterState),
    Projectile(ProjectileState),
}

/// Capability kinds that can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Transform,
    Physics,
    Render,
    Player,
    Monster,
    Projectile,
}

/// An entity: identity, name, active flag and capability slots
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub active: bool,
    pub transform: Option<Transform>,
    pub physics: Option<Physics>,
    pub render: Option<RenderDesc>,
    pub actor: Option<Actor>,
}

impl Entity {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Transform => self.transform.is_some(),
            Capability::Physics => self.physics.is_some(),
            Capability::Render => self.render.is_some(),
            Capability::Player => matches!(self.actor, Some(Actor::Player(_))),
            Capability::Monster => matches!(self.actor, Some(Actor::Monster(_))),
            Capability::Projectile => matches!(self.actor, Some(Actor::Projectile(_))),
        }
    }

    /// Current position, if the entity has a transform
    pub fn position(&self) -> Option<Vec2> {
        self.transform.map(|t| t.position)
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.actor {
            Some(Actor::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.actor {
            Some(Actor::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn monster(&self) -> Option<&MonsterState> {
        match &self.actor {
            Some(Actor::Monster(m)) => Some(m),
            _ => None,
        }
    }

    pub fn monster_mut(&mut self) -> Option<&mut MonsterState> {
        match &mut self.actor {
            Some(Actor::Monster(m)) => Some(m),
            _ => None,
        }
    }

    pub fn projectile(&self) -> Option<&ProjectileState> {
        match &self.actor {
            Some(Actor::Projectile(p)) => Some(p),
            _ => None,
        }
    }
}

/// Builder for a new entity; the world assigns the id
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    name: String,
    transform: Option<Transform>,
    physics: Option<Physics>,
    render: Option<RenderDesc>,
    actor: Option<Actor>,
}

impl EntityBuilder {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.transform = Some(Transform { position });
        self
    }

    pub fn with_physics(mut self, physics: Physics) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn with_render(mut self, render: RenderDesc) -> Self {
        self.render = Some(render);
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Owns entity storage. Iteration order is spawn order.
#[derive(Debug, Clone, Default)]
pub struct World {
    entities: Vec<Entity>,
    next_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity from a builder and return its id
    pub fn spawn(&mut self, builder: EntityBuilder) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.push(Entity {
            id,
            name: builder.name,
            active: true,
            transform: builder.transform,
            physics: builder.physics,
            render: builder.render,
            actor: builder.actor,
        });
        id
    }

    /// Look up an active entity
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id && e.active)
    }

    /// Look up an active entity mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id && e.active)
    }

    /// Mark an entity inactive. Returns false if it was already gone.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.active = false;
                true
            }
            None => false,
        }
    }

    /// Active entities in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.active)
    }

    /// Active entities in spawn order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter(|e| e.active)
    }

    /// Active entities that have the given capability
    pub fn query(&self, capability: Capability) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.has(capability))
    }

    /// Ids of active entities with the given capability (snapshot for mutation loops)
    pub fn ids_with(&self, capability: Capability) -> Vec<EntityId> {
        self.query(capability).map(|e| e.id).collect()
    }

    pub fn count(&self, capability: Capability) -> usize {
        self.query(capability).count()
    }

    /// Reclaim storage of inactive entities
    pub fn sweep(&mut self) {
        self.entities.retain(|e| e.active);
    }

    /// Number of stored slots, including inactive ones not yet swept
    pub fn slot_count(&self) -> usize {
        self.entities.len()
    }
}
