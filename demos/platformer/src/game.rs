//! Platformer sample: run and jump around a grid level collecting diamonds.

use grid_engine::{
    keys, EngineContext, EngineError, EntityId, Game, GameCamera, GameConfig, GameEvent, InputState,
};

use crate::diamond::{spawn_diamond, DiamondRegistry};
use crate::hero::Hero;
use crate::level::{LevelLayout, PlatformerLevel, LEVEL};

const GRID_SIZE: u32 = 8;

// View size in pixels
const VIEW_W: f32 = 240.0;
const VIEW_H: f32 = 135.0;

const FALLBACK_SPAWN: (i32, i32) = (1, 1);

/// Sound ids for the host audio layer.
pub mod sounds {
    use grid_engine::SoundEvent;

    pub const FOOTSTEP: SoundEvent = SoundEvent(1);
    pub const LAND: SoundEvent = SoundEvent(2);
    pub const PICKUP: SoundEvent = SoundEvent(3);
}

/// Game event kinds for the host.
pub mod game_events {
    /// a/b: pixel position of the hero's feet.
    pub const RUN_DUST: f32 = 1.0;
    /// a: diamonds remaining.
    pub const DIAMONDS_REMAINING: f32 = 2.0;
    pub const WON: f32 = 3.0;
}

pub struct PlatformerGame {
    layout: LevelLayout,
    camera: GameCamera,
    hero: Option<Hero>,
    diamonds: DiamondRegistry,
}

impl PlatformerGame {
    /// The built-in level.
    pub fn new() -> Result<Self, EngineError> {
        Self::from_rows(LEVEL)
    }

    pub fn from_rows(rows: &[&str]) -> Result<Self, EngineError> {
        let layout = LevelLayout::from_rows(GRID_SIZE, rows)?;
        let camera = GameCamera::new(VIEW_W, VIEW_H)
            .with_bounds(layout.level.px_width(), layout.level.px_height());
        Ok(Self {
            layout,
            camera,
            hero: None,
            diamonds: DiamondRegistry::new(),
        })
    }

    pub fn hero(&self) -> Option<&Hero> {
        self.hero.as_ref()
    }

    pub fn diamonds(&self) -> &DiamondRegistry {
        &self.diamonds
    }

    pub fn camera(&self) -> &GameCamera {
        &self.camera
    }

    /// Every diamond has been picked up.
    pub fn is_won(&self) -> bool {
        self.diamonds.is_empty()
    }

    /// Populate the scene from the level layout.
    fn spawn_level(&mut self, ctx: &mut EngineContext) {
        let (cx, cy) = self.layout.hero_spawn.unwrap_or_else(|| {
            log::warn!("level has no hero spawn, using {:?}", FALLBACK_SPAWN);
            FALLBACK_SPAWN
        });
        let hero = Hero::spawn(ctx, cx, cy);

        for &(cx, cy) in &self.layout.diamond_spawns {
            let id = spawn_diamond(ctx, cx, cy);
            self.diamonds.register(id);
        }

        if let Err(err) = self.camera.follow(ctx.scene.get(hero.id), true) {
            log::warn!("camera: {err}");
        }
        self.hero = Some(hero);

        log::info!(
            "level ready: {}x{} cells, {} diamonds",
            self.layout.level.width(),
            self.layout.level.height(),
            self.diamonds.len()
        );
    }

    /// Throw away the current run and start over.
    fn reset(&mut self, ctx: &mut EngineContext) {
        ctx.scene.clear();
        self.diamonds.clear();
        self.hero = None;
        self.camera.unfollow();
        self.spawn_level(ctx);
        log::info!("level reset");
    }

    fn collect_diamonds(&mut self, ctx: &mut EngineContext) {
        let Some(hero) = self.hero.as_ref().and_then(|h| ctx.scene.get(h.id)) else {
            return;
        };
        for id in self.diamonds.touching(ctx, hero) {
            if ctx.scene.destroy(id) {
                ctx.emit_sound(sounds::PICKUP);
            }
        }
    }
}

impl Game for PlatformerGame {
    type Level = PlatformerLevel;

    fn config(&self) -> GameConfig {
        GameConfig {
            grid_size: GRID_SIZE,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.spawn_level(ctx);
    }

    fn level(&self) -> &Self::Level {
        &self.layout.level
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputState, _dt: f32, _tmod: f32) {
        if input.is_key_just_pressed(keys::R) && (self.is_won() || input.is_key_down(keys::SHIFT)) {
            self.reset(ctx);
            return;
        }

        if let Some(hero) = self.hero.as_mut() {
            hero.update(ctx, input, &self.layout.level, &mut self.camera);
        }
        self.collect_diamonds(ctx);
    }

    fn fixed_update(&mut self, ctx: &mut EngineContext) {
        if let Some(hero) = &self.hero {
            hero.fixed_update(ctx);
        }
    }

    fn post_update(&mut self, ctx: &mut EngineContext, dt: f32) {
        self.camera.update(dt, &ctx.scene);
    }

    fn on_destroyed(&mut self, ctx: &mut EngineContext, ids: &[EntityId]) {
        let had_diamonds = !self.diamonds.is_empty();
        let picked = ids.iter().filter(|&&id| self.diamonds.remove(id)).count();
        if picked == 0 {
            return;
        }

        ctx.emit_event(GameEvent {
            kind: game_events::DIAMONDS_REMAINING,
            a: self.diamonds.len() as f32,
            b: 0.0,
            c: 0.0,
        });
        if had_diamonds && self.is_won() {
            log::info!("all diamonds collected");
            ctx.emit_event(GameEvent {
                kind: game_events::WON,
                ..GameEvent::default()
            });
        }
    }
}
