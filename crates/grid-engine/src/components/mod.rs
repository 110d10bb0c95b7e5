pub mod collision;
pub mod entity;
pub mod level;
pub mod motion;
pub mod sprite;
pub mod visual;
