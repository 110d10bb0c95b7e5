/// Raw input events pushed by the host between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at world coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to world coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
}

/// Key codes used by the bundled games (DOM `keyCode` values).
pub mod keys {
    pub const SHIFT: u32 = 16;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const RIGHT: u32 = 39;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const R: u32 = 82;
}

/// Events collected since the last frame, drained once per frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
