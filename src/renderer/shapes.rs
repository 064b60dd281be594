//! Entity drawing: every shape is centred on its entity's position

use glam::Vec2;

use super::Renderer;
use crate::replay::ReplayEntity;
use crate::sim::world::{RenderDesc, ShapeKind, World};

/// Draw one shape centred on `pos`
pub fn draw_shape(renderer: &mut dyn Renderer, pos: Vec2, desc: &RenderDesc) {
    match desc.shape {
        ShapeKind::Circle => renderer.draw_circle(pos, desc.radius(), desc.color),
        ShapeKind::Rectangle => {
            let half = desc.size / 2.0;
            renderer.draw_rect(pos.x - half.x, pos.y - half.y, desc.size.x, desc.size.y, desc.color);
        }
    }
}

/// Draw every active entity that has both a position and a render descriptor
pub fn draw_world(renderer: &mut dyn Renderer, world: &World) {
    for entity in world.iter() {
        if let (Some(pos), Some(render)) = (entity.position(), entity.render.as_ref()) {
            draw_shape(renderer, pos, render);
        }
    }
}

pub fn draw_replay_entity(renderer: &mut dyn Renderer, entity: &ReplayEntity) {
    if entity.active {
        draw_shape(renderer, entity.position, &entity.render);
    }
}
