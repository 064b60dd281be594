//! Rendering collaborator
//!
//! The core only issues draw requests (shape or text, bounds or baseline,
//! RGBA color). Backends implement [`Renderer`]; [`DrawList`] records the
//! requests for headless runs and tests.

pub mod hud;
pub mod shapes;

use glam::Vec2;

use crate::sim::world::Color;

pub use hud::{draw_match, draw_replay, draw_replay_select};
pub use shapes::{draw_replay_entity, draw_shape, draw_world};

/// Fixed scene colors
pub mod colors {
    use crate::sim::world::Color;

    pub const MATCH_BACKGROUND: Color = Color::rgb(0.5, 0.8, 0.5);
    pub const REPLAY_BACKGROUND: Color = Color::rgb(0.06, 0.06, 0.08);
    pub const HP_FRAME: Color = Color::rgba(0.0, 0.0, 0.0, 0.8);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const HINT: Color = Color::rgb(0.8, 0.8, 0.8);
    pub const LIST_ITEM: Color = Color::rgb(0.9, 0.9, 0.9);
    pub const LIST_HIGHLIGHT: Color = Color::rgba(0.3, 0.3, 0.4, 0.8);
    pub const NOTICE: Color = Color::rgb(0.9, 0.8, 0.2);
    pub const GAME_OVER: Color = Color::rgb(1.0, 0.2, 0.2);
}

/// Drawing surface
pub trait Renderer {
    fn width(&self) -> f32;

    fn height(&self) -> f32;

    /// Filled axis-aligned rectangle with its top-left corner at (x, y)
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    /// Filled circle; backends without circles get the bounding rectangle
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.draw_rect(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
            color,
        );
    }

    /// Text with its baseline starting at (x, y)
    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Color);
}

/// A single recorded draw request
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        color: Color,
    },
}

/// Renderer that records every request in order
#[derive(Debug, Clone)]
pub struct DrawList {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// All text drawn so far, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

impl Renderer for DrawList {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }
}
