//! Scene painters: match, replay and recording selection

use super::shapes::{draw_replay_entity, draw_world};
use super::{Renderer, colors};
use crate::consts::{PLAYER_START_HEALTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::replay::Playback;
use crate::sim::state::MatchState;
use crate::sim::world::Color;

pub const REPLAY_HINT: &str = "REPLAY: ESC to exit";
pub const SELECT_TITLE: &str = "SELECT HULU RECORDING";
pub const NO_RECORDINGS: &str = "NO RECORDINGS FOUND";
pub const NO_KEYFRAMES: &str = "NO KEYFRAMES IN RECORDING";
pub const GAME_OVER: &str = "GAME OVER";

const LIST_X: f32 = 100.0;
const LIST_TOP: f32 = 140.0;
const LIST_ROW: f32 = 28.0;

/// x at which `text` is horizontally centred, given a per-glyph width estimate
fn centred_x(renderer: &dyn Renderer, text: &str, glyph_width: f32) -> f32 {
    renderer.width() / 2.0 - text.chars().count() as f32 * glyph_width / 2.0
}

/// Bar color from red (empty) to green (full)
pub fn health_color(ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    Color::rgb(1.0 - ratio, ratio, 0.0)
}

pub fn draw_match(renderer: &mut dyn Renderer, state: &MatchState) {
    renderer.draw_rect(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT, colors::MATCH_BACKGROUND);
    draw_world(renderer, &state.world);

    if let Some(health) = state.player_health() {
        let ratio = (health as f32 / PLAYER_START_HEALTH as f32).clamp(0.0, 1.0);
        renderer.draw_rect(10.0, 10.0, 150.0, 30.0, colors::HP_FRAME);
        renderer.draw_rect(15.0, 15.0, 140.0 * ratio, 20.0, health_color(ratio));
        renderer.draw_text(10.0, 50.0, &format!("SCORE: {}", state.score()), colors::WHITE);
    }

    if state.is_stopped() {
        let y = renderer.height() / 2.0;
        let x = centred_x(renderer, GAME_OVER, 16.0);
        renderer.draw_text(x, y, GAME_OVER, colors::GAME_OVER);
        let summary = format!("FINAL SCORE: {}", state.score());
        let x = centred_x(renderer, &summary, 12.0);
        renderer.draw_text(x, y + 40.0, &summary, colors::WHITE);
    }
}

pub fn draw_replay(renderer: &mut dyn Renderer, playback: &Playback) {
    let (w, h) = (renderer.width(), renderer.height());
    renderer.draw_rect(0.0, 0.0, w, h, colors::REPLAY_BACKGROUND);

    if playback.is_empty() {
        let x = centred_x(renderer, NO_KEYFRAMES, 14.0);
        renderer.draw_text(x, h / 2.0, NO_KEYFRAMES, colors::NOTICE);
    } else {
        for entity in playback.entities() {
            draw_replay_entity(renderer, entity);
        }
    }

    let x = centred_x(renderer, REPLAY_HINT, 12.0);
    renderer.draw_text(x, 30.0, REPLAY_HINT, colors::HINT);
}

pub fn draw_replay_select(renderer: &mut dyn Renderer, recordings: &[String], selected: usize) {
    let (w, h) = (renderer.width(), renderer.height());
    renderer.draw_rect(0.0, 0.0, w, h, colors::REPLAY_BACKGROUND);

    let x = centred_x(renderer, SELECT_TITLE, 16.0);
    renderer.draw_text(x, 80.0, SELECT_TITLE, colors::WHITE);

    if recordings.is_empty() {
        let x = centred_x(renderer, NO_RECORDINGS, 14.0);
        renderer.draw_text(x, h / 2.0, NO_RECORDINGS, colors::NOTICE);
        return;
    }

    for (i, name) in recordings.iter().enumerate() {
        let y = LIST_TOP + i as f32 * LIST_ROW;
        if i == selected {
            renderer.draw_rect(LIST_X - 10.0, y - 6.0, 600.0, 24.0, colors::LIST_HIGHLIGHT);
        }
        renderer.draw_text(LIST_X, y, name, colors::LIST_ITEM);
    }
}
