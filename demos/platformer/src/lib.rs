//! Platformer sample built on grid-engine: a hero runs and jumps around a
//! grid level collecting diamonds. Drive it with `GameRunner`.

pub mod diamond;
pub mod game;
pub mod hero;
pub mod level;

pub use diamond::DiamondRegistry;
pub use game::{game_events, sounds, PlatformerGame};
pub use hero::Hero;
pub use level::{create_level_marks, LevelLayout, LevelMark, PlatformerLevel};
