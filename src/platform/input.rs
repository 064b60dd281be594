//! Per-frame input snapshot
//!
//! Replaces ambient global key state: the driver polls the device once per
//! frame and hands the snapshot to the simulation.

use std::collections::HashSet;

/// Logical game actions (device bindings live outside the core)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Block,
    Melee,
    Ranged,
    Exit,
    Confirm,
}

/// Held actions plus actions pressed since the previous frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: mark an action as held
    pub fn hold(mut self, action: Action) -> Self {
        self.held.insert(action);
        self
    }

    /// Builder: mark an action as just pressed (a press also counts as held)
    pub fn press(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self.held.insert(action);
        self
    }

    pub fn set_held(&mut self, action: Action, down: bool) {
        if down {
            self.held.insert(action);
        } else {
            self.held.remove(&action);
        }
    }

    pub fn set_pressed(&mut self, action: Action) {
        self.pressed.insert(action);
        self.held.insert(action);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn just_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Take this frame's held set and add its presses to any not yet consumed
    pub fn absorb(&mut self, frame: &InputSnapshot) {
        self.held = frame.held.clone();
        self.pressed.extend(frame.pressed.iter().copied());
    }

    /// Drop edge events once a substep has seen them
    pub fn clear_pressed(&mut self) {
        self.pressed.clear();
    }

    /// Copy with edge events removed, for the second and later substeps of a frame
    pub fn held_only(&self) -> Self {
        Self {
            held: self.held.clone(),
            pressed: HashSet::new(),
        }
    }
}
