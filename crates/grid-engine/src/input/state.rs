//! Per-frame input snapshot built from queued events.
//!
//! Level-triggered queries (`is_key_down`) report what is held now.
//! Edge-triggered queries (`is_key_just_pressed`) report transitions that
//! happened since the previous frame and reset on the next `begin_frame`.

use std::collections::HashSet;

use glam::Vec2;

use crate::input::queue::InputEvent;

#[derive(Debug, Default, Clone)]
pub struct InputState {
    down: HashSet<u32>,
    just_pressed: HashSet<u32>,
    just_released: HashSet<u32>,
    pointer_down: bool,
    pointer_just_pressed: bool,
    pointer_just_released: bool,
    pointer: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear edge state, then apply this frame's events in order.
    pub fn begin_frame(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.pointer_just_pressed = false;
        self.pointer_just_released = false;

        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key_code } => {
                // Key repeat sends KeyDown while held; only the first one is an edge.
                if self.down.insert(key_code) {
                    self.just_pressed.insert(key_code);
                }
            }
            InputEvent::KeyUp { key_code } => {
                if self.down.remove(&key_code) {
                    self.just_released.insert(key_code);
                }
            }
            InputEvent::PointerDown { x, y } => {
                self.pointer = Vec2::new(x, y);
                if !self.pointer_down {
                    self.pointer_just_pressed = true;
                }
                self.pointer_down = true;
            }
            InputEvent::PointerUp { x, y } => {
                self.pointer = Vec2::new(x, y);
                if self.pointer_down {
                    self.pointer_just_released = true;
                }
                self.pointer_down = false;
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer = Vec2::new(x, y);
            }
        }
    }

    pub fn is_key_down(&self, key_code: u32) -> bool {
        self.down.contains(&key_code)
    }

    pub fn is_key_just_pressed(&self, key_code: u32) -> bool {
        self.just_pressed.contains(&key_code)
    }

    pub fn is_key_just_released(&self, key_code: u32) -> bool {
        self.just_released.contains(&key_code)
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn is_pointer_just_pressed(&self) -> bool {
        self.pointer_just_pressed
    }

    pub fn is_pointer_just_released(&self) -> bool {
        self.pointer_just_released
    }

    /// Last known pointer position in world coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Release everything, e.g. when the host loses focus.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
