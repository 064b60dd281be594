//! Application driver
//!
//! Owns settings, recording storage and the active scene, and turns variable
//! frame times into fixed simulation steps.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::persistence::Recorder;
use crate::platform::input::{Action, InputSnapshot};
use crate::platform::storage::{RecordingStorage, session_name};
use crate::renderer::{self, Renderer};
use crate::replay::{Playback, load_keyframes};
use crate::settings::Settings;
use crate::sim::state::{MatchEvent, MatchState};
use crate::sim::tick::tick;

/// A running match, optionally recorded
#[derive(Debug)]
pub struct MatchScene {
    pub state: MatchState,
    recorder: Option<Recorder>,
    /// Inputs carried into the next substep
    pending: InputSnapshot,
    accumulator: f32,
}

/// Recording selection list
#[derive(Debug, Clone, Default)]
pub struct SelectScene {
    pub recordings: Vec<String>,
    pub selected: usize,
}

impl SelectScene {
    /// Move the highlight, wrapping at both ends
    pub fn step(&mut self, forward: bool) {
        let n = self.recordings.len().max(1);
        self.selected = if forward {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        };
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.recordings.get(self.selected).map(String::as_str)
    }
}

/// Playback of one loaded session
#[derive(Debug, Clone)]
pub struct ReplayScene {
    pub session: String,
    pub playback: Playback,
}

#[derive(Debug)]
pub enum Scene {
    Match(MatchScene),
    ReplaySelect(SelectScene),
    Replay(ReplayScene),
}

enum Transition {
    ToSelect,
    ToReplay(String),
    Quit,
}

pub struct App {
    settings: Settings,
    storage: Box<dyn RecordingStorage>,
    scene: Scene,
    last_session: Option<String>,
    quit: bool,
}

impl App {
    /// Start on the recording selection list
    pub fn new(settings: Settings, storage: Box<dyn RecordingStorage>) -> Self {
        let mut app = Self {
            settings,
            storage,
            scene: Scene::ReplaySelect(SelectScene::default()),
            last_session: None,
            quit: false,
        };
        app.open_replay_select();
        app
    }

    /// Begin a new match, recording it when enabled
    pub fn start_match(&mut self, seed: u64) {
        self.end_match();
        let state = MatchState::new(seed);
        let recorder = if self.settings.record {
            let session = session_name(unix_millis());
            Some(Recorder::start(
                self.storage.as_mut(),
                session,
                self.settings.sample_interval,
                seed,
                &state.world,
            ))
        } else {
            None
        };
        log::info!("Match started (seed {})", seed);
        self.scene = Scene::Match(MatchScene {
            state,
            recorder,
            pending: InputSnapshot::new(),
            accumulator: 0.0,
        });
    }

    /// Stop recording the current match, if any
    pub fn end_match(&mut self) {
        if let Scene::Match(m) = &mut self.scene {
            if let Some(session) = finish_recording(m, self.storage.as_mut()) {
                self.last_session = Some(session);
            }
        }
    }

    pub fn open_replay_select(&mut self) {
        self.end_match();
        let recordings = self.storage.list_recordings().unwrap_or_else(|e| {
            log::warn!("Could not list recordings: {}", e);
            Vec::new()
        });
        log::info!("Replay selection: {} recordings", recordings.len());
        self.scene = Scene::ReplaySelect(SelectScene {
            recordings,
            selected: 0,
        });
    }

    /// Load a session; an unreadable one plays back as empty
    pub fn open_replay(&mut self, session: &str) {
        self.end_match();
        let keyframes = load_keyframes(self.storage.as_ref(), session).unwrap_or_else(|e| {
            log::warn!("Could not load recording {}: {}", session, e);
            Vec::new()
        });
        self.scene = Scene::Replay(ReplayScene {
            session: session.to_string(),
            playback: Playback::new(keyframes, self.settings.correspondence),
        });
    }

    /// Advance the active scene by one frame
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        let transition = match &mut self.scene {
            Scene::Match(m) => {
                if input.just_pressed(Action::Exit) {
                    m.state.request_stop();
                    Some(Transition::Quit)
                } else {
                    step_match(m, self.storage.as_mut(), input, dt);
                    None
                }
            }
            Scene::ReplaySelect(select) => {
                if input.just_pressed(Action::Exit) {
                    Some(Transition::Quit)
                } else if input.just_pressed(Action::Up) {
                    select.step(false);
                    None
                } else if input.just_pressed(Action::Down) {
                    select.step(true);
                    None
                } else if input.just_pressed(Action::Confirm) {
                    select.highlighted().map(|s| Transition::ToReplay(s.to_string()))
                } else {
                    None
                }
            }
            Scene::Replay(replay) => {
                if input.just_pressed(Action::Exit) {
                    Some(Transition::ToSelect)
                } else {
                    replay.playback.advance(dt);
                    None
                }
            }
        };

        // A defeated match stops recording right away
        if let Scene::Match(m) = &mut self.scene {
            if m.state.is_stopped() && m.recorder.is_some() {
                if let Some(session) = finish_recording(m, self.storage.as_mut()) {
                    self.last_session = Some(session);
                }
            }
        }

        match transition {
            Some(Transition::ToSelect) => self.open_replay_select(),
            Some(Transition::ToReplay(session)) => self.open_replay(&session),
            Some(Transition::Quit) => {
                self.end_match();
                self.quit = true;
            }
            None => {}
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        match &self.scene {
            Scene::Match(m) => renderer::draw_match(renderer, &m.state),
            Scene::ReplaySelect(select) => {
                renderer::draw_replay_select(renderer, &select.recordings, select.selected)
            }
            Scene::Replay(replay) => renderer::draw_replay(renderer, &replay.playback),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn match_state(&self) -> Option<&MatchState> {
        match &self.scene {
            Scene::Match(m) => Some(&m.state),
            _ => None,
        }
    }

    pub fn playback(&self) -> Option<&Playback> {
        match &self.scene {
            Scene::Replay(r) => Some(&r.playback),
            _ => None,
        }
    }

    /// Session name of the most recently finished recording
    pub fn last_session(&self) -> Option<&str> {
        self.last_session.as_deref()
    }

    pub fn storage(&self) -> &dyn RecordingStorage {
        self.storage.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }
}

/// Run as many fixed substeps as the accumulated time allows. Edge-triggered
/// input reaches exactly one substep.
fn step_match(m: &mut MatchScene, storage: &mut dyn RecordingStorage, input: &InputSnapshot, dt: f32) {
    m.pending.absorb(input);
    m.accumulator += dt;

    let mut substeps = 0;
    while m.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        if m.state.is_stopped() {
            m.accumulator = 0.0;
            break;
        }
        tick(&mut m.state, &m.pending, SIM_DT);
        m.pending.clear_pressed();
        m.accumulator -= SIM_DT;
        substeps += 1;

        for event in m.state.drain_events() {
            log_event(&event);
        }
        if let Some(recorder) = m.recorder.as_mut() {
            recorder.record_frame(storage, &m.state.world, SIM_DT);
        }
    }

    // Drop backlog we could not catch up on
    if substeps == MAX_SUBSTEPS {
        m.accumulator = m.accumulator.min(SIM_DT);
    }
}

fn finish_recording(m: &mut MatchScene, storage: &mut dyn RecordingStorage) -> Option<String> {
    let mut recorder = m.recorder.take()?;
    // Capture the final frame so the replay ends where the match did
    recorder.capture(storage, &m.state.world);
    match recorder.stop(storage) {
        Ok(()) => Some(recorder.session().to_string()),
        Err(e) => {
            log::debug!("Recording not finalized: {}", e);
            None
        }
    }
}

fn log_event(event: &MatchEvent) {
    match event {
        MatchEvent::PlayerDefeated => log::info!("Player defeated"),
        other => log::debug!("{:?}", other),
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::MemoryRecordingStorage;
    use crate::renderer::DrawList;
    use crate::renderer::hud::{NO_RECORDINGS, REPLAY_HINT};

    fn app_with(storage: MemoryRecordingStorage, record: bool) -> App {
        let settings = Settings {
            record,
            ..Settings::default()
        };
        App::new(settings, Box::new(storage))
    }

    fn frames(app: &mut App, n: usize) {
        let idle = InputSnapshot::new();
        for _ in 0..n {
            app.update(&idle, 1.0 / 60.0);
        }
    }

    #[test]
    fn test_starts_on_empty_selection() {
        let app = app_with(MemoryRecordingStorage::new(), true);
        let mut out = DrawList::new(800.0, 600.0);
        app.render(&mut out);
        assert!(out.contains_text(NO_RECORDINGS));
    }

    #[test]
    fn test_fixed_timestep_substeps() {
        let mut app = app_with(MemoryRecordingStorage::new(), false);
        app.start_match(1);
        // 0.05s of frame time is about six 1/120 substeps
        app.update(&InputSnapshot::new(), 0.05);
        let first = app.match_state().unwrap().elapsed;
        assert!(first >= 5.0 * SIM_DT - 1e-5 && first <= 6.0 * SIM_DT + 1e-5, "elapsed {}", first);

        // Huge frames are clamped and capped at eight substeps
        app.update(&InputSnapshot::new(), 5.0);
        let second = app.match_state().unwrap().elapsed;
        assert!((second - first - 8.0 * SIM_DT).abs() < 1e-4, "elapsed {}", second);
    }

    #[test]
    fn test_press_reaches_one_substep_only() {
        let mut app = app_with(MemoryRecordingStorage::new(), false);
        app.start_match(3);
        let Scene::Match(m) = &mut app.scene else {
            panic!("expected match");
        };
        m.pending.absorb(&InputSnapshot::new().press(Action::Ranged));
        step_match(m, &mut MemoryRecordingStorage::new(), &InputSnapshot::new(), 4.0 * SIM_DT);
        assert!(!m.pending.just_pressed(Action::Ranged));
    }

    #[test]
    fn test_exit_ends_recorded_match() {
        let mut app = app_with(MemoryRecordingStorage::new(), true);
        app.start_match(5);
        frames(&mut app, 30);
        app.update(&InputSnapshot::new().press(Action::Exit), 1.0 / 60.0);

        assert!(app.should_quit());
        let session = app.last_session().expect("session recorded").to_string();
        let keyframes = load_keyframes(app.storage(), &session).unwrap();
        // t = 0, ~10 samples over half a second, and the final capture
        assert!(keyframes.len() >= 8, "only {} keyframes", keyframes.len());
        assert!(keyframes.windows(2).all(|w| w[0].t <= w[1].t));
    }

    #[test]
    fn test_unrecorded_match_writes_nothing() {
        let mut app = app_with(MemoryRecordingStorage::new(), false);
        app.start_match(5);
        frames(&mut app, 10);
        app.end_match();
        assert!(app.last_session().is_none());
        assert!(app.storage().list_recordings().unwrap().is_empty());
    }

    #[test]
    fn test_selection_wraps_and_opens_replay() {
        let mut storage = MemoryRecordingStorage::new();
        storage.insert(
            "hulu_session_2.jsonl",
            vec![
                r#"{"type":"keyframe","t":0,"entities":[{"id":"a","rt":"CIRCLE","w":30,"h":30,"x":0,"y":0}]}"#.to_string(),
                r#"{"type":"keyframe","t":1,"entities":[{"id":"a","rt":"CIRCLE","w":30,"h":30,"x":10,"y":0}]}"#.to_string(),
            ],
        );
        storage.insert("hulu_session_1.jsonl", Vec::new());
        let mut app = app_with(storage, false);

        // Up from the first entry wraps to the last (the older, empty one)
        app.update(&InputSnapshot::new().press(Action::Up), 0.016);
        app.update(&InputSnapshot::new().press(Action::Down), 0.016);
        app.update(&InputSnapshot::new().press(Action::Confirm), 0.016);

        assert!(matches!(app.scene(), Scene::Replay(r) if r.session == "hulu_session_2.jsonl"));
        app.update(&InputSnapshot::new(), 0.05);
        app.update(&InputSnapshot::new(), 0.05);
        let pos = app.playback().unwrap().entities()[0].position;
        assert!((pos.x - 1.0).abs() < 1e-4);

        let mut out = DrawList::new(800.0, 600.0);
        app.render(&mut out);
        assert!(out.contains_text(REPLAY_HINT));

        app.update(&InputSnapshot::new().press(Action::Exit), 0.016);
        assert!(matches!(app.scene(), Scene::ReplaySelect(_)));
        assert!(!app.should_quit());
    }

    #[test]
    fn test_missing_recording_is_empty_replay() {
        let mut app = app_with(MemoryRecordingStorage::new(), false);
        app.open_replay("gone.jsonl");
        assert!(app.playback().unwrap().is_empty());
    }

    #[test]
    fn test_select_step_wraps() {
        let mut select = SelectScene {
            recordings: vec!["a".into(), "b".into(), "c".into()],
            selected: 0,
        };
        select.step(false);
        assert_eq!(select.highlighted(), Some("c"));
        select.step(true);
        assert_eq!(select.highlighted(), Some("a"));

        let mut empty = SelectScene::default();
        empty.step(true);
        assert_eq!(empty.highlighted(), None);
    }
}
