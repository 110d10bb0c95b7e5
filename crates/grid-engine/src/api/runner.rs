use crate::api::error::EngineError;
use crate::api::game::{EngineContext, Game, GameConfig, RenderContext};
use crate::core::time::{FixedInterpUpdater, TmodUpdater};
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::state::InputState;
use crate::renderer::instance::RenderBuffer;
use crate::systems::render::build_render_buffer;

/// Drives a `Game`: variable-rate update, fixed-rate simulation with
/// interpolation, deferred destruction and render-buffer output.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    config: GameConfig,
    queue: InputQueue,
    input: InputState,
    fixed: FixedInterpUpdater,
    tmod: TmodUpdater,
    render_buffer: RenderBuffer,
}

/// One simulation step: every entity moves against the level, then the game reacts.
fn fixed_step<G: Game>(game: &mut G, ctx: &mut EngineContext) {
    ctx.scene.fixed_update_all(game.level());
    game.fixed_update(ctx);
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Result<Self, EngineError> {
        let config = game.config();
        let fixed = Self::fixed_updater(&config)?;
        Ok(Self {
            ctx: EngineContext::new(&config),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            tmod: TmodUpdater::new(config.target_fps),
            queue: InputQueue::new(),
            input: InputState::new(),
            fixed,
            config,
            game,
        })
    }

    fn fixed_updater(config: &GameConfig) -> Result<FixedInterpUpdater, EngineError> {
        let fixed = FixedInterpUpdater::from_hz(config.fixed_hz)?;
        Ok(match config.max_steps_per_frame {
            0 => fixed,
            max => fixed.with_max_steps(max),
        })
    }

    /// Let the game set up, then run the zero-time variable update and, if
    /// configured, one fixed step so state is valid before the first frame.
    pub fn init(&mut self) -> Result<(), EngineError> {
        self.game.init(&mut self.ctx);

        let input = &self.input;
        let mut target = (&mut self.game, &mut self.ctx);
        self.tmod = TmodUpdater::create(self.config.target_fps, &mut target, |(game, ctx), dt, tmod| {
            game.update(ctx, input, dt, tmod)
        });

        let step = self.config.fixed_dt();
        let fixed = FixedInterpUpdater::create(
            step,
            self.config.initial_fixed_step,
            &mut target,
            |(game, ctx)| fixed_step(*game, *ctx),
        )?;
        self.fixed = match self.config.max_steps_per_frame {
            0 => fixed,
            max => fixed.with_max_steps(max),
        };

        log::info!(
            "runner initialized: {} Hz fixed step, {} fps target, {} entities",
            self.config.fixed_hz,
            self.config.target_fps,
            self.ctx.scene.len()
        );
        Ok(())
    }

    /// Queue an input event for the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Advance one render frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.ctx.clear_frame_data();
        self.input.begin_frame(self.queue.drain());
        self.ctx.scene.update_all(dt);

        let input = &self.input;
        let mut target = (&mut self.game, &mut self.ctx);
        self.tmod.update(dt, &mut target, |(game, ctx), dt, tmod| {
            game.update(ctx, input, dt, tmod)
        });
        self.fixed.update(
            dt,
            &mut target,
            |(game, ctx)| fixed_step(*game, *ctx),
            |(_, ctx), ratio| ctx.scene.set_progression_ratio(ratio),
        );

        self.ctx.scene.post_update_all(dt);
        self.game.post_update(&mut self.ctx, dt);

        let destroyed = self.ctx.scene.flush_destroyed();
        if !destroyed.is_empty() {
            self.game.on_destroyed(&mut self.ctx, &destroyed);
        }

        build_render_buffer(self.ctx.scene.iter(), &mut self.render_buffer);
        self.game.render(&mut RenderContext {
            scene: &self.ctx.scene,
            render_buffer: &mut self.render_buffer,
        });
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    /// Interpolation ratio left over after the last tick.
    pub fn progression_ratio(&self) -> f32 {
        self.fixed.ratio()
    }
}
