pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::error::EngineError;
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::runner::GameRunner;
pub use api::types::{EntityId, SoundEvent, GameEvent};
pub use components::collision::{CollisionRatios, LevelCollision, LevelHooks, PlatformHooks, on_ground};
pub use components::entity::{Body, Entity};
pub use components::level::{GameLevel, GridLevel, OpenLevel};
pub use components::motion::{FreeMotion, Motion, StepHooks, VELOCITY_EPSILON};
pub use components::sprite::{SpriteComponent, BlendMode};
pub use components::visual::Visual;
pub use core::cooldown::{CooldownCallback, CooldownComponent};
pub use core::math::{cast_ray, dist, lerp};
pub use core::scene::Scene;
pub use core::time::{FixedInterpUpdater, TmodUpdater, EARLY_STEP_TOLERANCE};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use renderer::camera::GameCamera;
pub use input::queue::{keys, InputEvent, InputQueue};
pub use input::state::InputState;
