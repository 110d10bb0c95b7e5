pub mod cooldown;
pub mod math;
pub mod scene;
pub mod time;
