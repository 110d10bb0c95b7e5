use serde::{Deserialize, Serialize};

use crate::api::error::EngineError;
use crate::api::types::{EntityId, GameEvent, SoundEvent};
use crate::components::entity::Entity;
use crate::components::level::GameLevel;
use crate::core::scene::Scene;
use crate::input::state::InputState;
use crate::renderer::instance::RenderBuffer;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed simulation steps per second (default: 30).
    pub fixed_hz: f32,
    /// Frame rate at which `tmod` equals 1.0 (default: 60).
    pub target_fps: f32,
    /// Pixels per grid cell (default: 8).
    pub grid_size: u32,
    /// Render instances kept per frame; extra sprites are dropped (default: 512).
    pub max_instances: usize,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Run one fixed step at init so state is valid before the first frame.
    pub initial_fixed_step: bool,
    /// Cap on fixed steps per frame after a stall. 0 disables the cap.
    pub max_steps_per_frame: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_hz: 30.0,
            target_fps: 60.0,
            grid_size: 8,
            max_instances: 512,
            max_sounds: 32,
            max_events: 32,
            initial_fixed_step: true,
            max_steps_per_frame: 10,
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Duration of one fixed step in seconds.
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.fixed_hz
    }
}

/// The core contract every game must fulfill.
///
/// Per frame the runner calls `update`, then `fixed_update` once per due
/// fixed step (after every entity's grid step), then `post_update`.
pub trait Game {
    /// Level geometry the entities collide with.
    type Level: GameLevel;

    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    fn level(&self) -> &Self::Level;

    /// Variable-rate tick. `tmod` is 1.0 at the configured target frame rate.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputState, dt: f32, tmod: f32);

    /// Called after each fixed step of the scene's entities.
    fn fixed_update(&mut self, _ctx: &mut EngineContext) {}

    /// Called once per frame after entities settled their visuals (camera work goes here).
    fn post_update(&mut self, _ctx: &mut EngineContext, _dt: f32) {}

    /// Entities removed from the scene this frame, in destruction order.
    fn on_destroyed(&mut self, _ctx: &mut EngineContext, _ids: &[EntityId]) {}

    /// Optional read-only render pass for custom render commands.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to every `Game` hook.
#[derive(Debug)]
pub struct EngineContext {
    pub scene: Scene,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    grid_size: f32,
    max_sounds: usize,
    max_events: usize,
    next_id: u32,
}

impl EngineContext {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            scene: Scene::with_capacity(config.max_instances),
            sounds: Vec::with_capacity(config.max_sounds),
            events: Vec::with_capacity(config.max_events),
            grid_size: config.grid_size as f32,
            max_sounds: config.max_sounds,
            max_events: config.max_events,
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// A fresh entity sized to the configured grid, not yet spawned.
    pub fn create_entity(&mut self) -> Entity {
        let id = self.next_id();
        Entity::new(id, self.grid_size)
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Queue a sound for the host. Dropped when the frame's budget is spent.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        if self.sounds.len() < self.max_sounds {
            self.sounds.push(event);
        } else {
            log::warn!("sound {:?} dropped: {} per frame max", event, self.max_sounds);
        }
    }

    /// Queue a game event for the host. Dropped when the frame's budget is spent.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            log::warn!("game event {} dropped: {} per frame max", event.kind, self.max_events);
        }
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Render context for optional custom render commands.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub render_buffer: &'a mut RenderBuffer,
}
