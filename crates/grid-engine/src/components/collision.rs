//! Level collision strategies plugged into `Motion::step`.
//!
//! `LevelHooks` clamps the sub-cell offset against solid neighbours using
//! per-side collision ratios. `PlatformHooks` adds gravity that only pulls while
//! the body is airborne.

use crate::components::level::GameLevel;
use crate::components::motion::{Motion, StepHooks};

/// How far into a cell the offset may travel toward a solid neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRatios {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Use `top` as-is instead of deriving it from the body height.
    pub use_top_ratio: bool,
}

impl Default for CollisionRatios {
    fn default() -> Self {
        Self {
            left: 0.3,
            right: 0.7,
            top: 1.0,
            bottom: 1.0,
            use_top_ratio: false,
        }
    }
}

impl CollisionRatios {
    /// Offset threshold for the cell above: `top`, or whole cells of body height.
    pub fn top_threshold(&self, height: f32, grid_size: f32) -> f32 {
        if self.use_top_ratio {
            self.top
        } else {
            (height / grid_size).floor()
        }
    }
}

/// One resolved contact with level geometry, as a direction from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCollision {
    pub dx: i32,
    pub dy: i32,
}

/// Axis-separated collision against a `GameLevel`.
pub struct LevelHooks<'a, L: GameLevel + ?Sized> {
    pub level: &'a L,
    pub ratios: CollisionRatios,
    /// Body height in pixels.
    pub height: f32,
    /// Contacts resolved during the step, in order.
    pub collisions: &'a mut Vec<LevelCollision>,
}

impl<'a, L: GameLevel + ?Sized> LevelHooks<'a, L> {
    pub fn new(
        level: &'a L,
        ratios: CollisionRatios,
        height: f32,
        collisions: &'a mut Vec<LevelCollision>,
    ) -> Self {
        Self {
            level,
            ratios,
            height,
            collisions,
        }
    }

    fn hit(&mut self, dx: i32, dy: i32) {
        self.collisions.push(LevelCollision { dx, dy });
    }
}

impl<L: GameLevel + ?Sized> StepHooks for LevelHooks<'_, L> {
    fn check_x_collision(&mut self, m: &mut Motion) {
        if self.level.has_collision(m.cx + 1, m.cy) && m.xr >= self.ratios.right {
            m.xr = self.ratios.right;
            m.velocity_x *= 0.5;
            self.hit(1, 0);
        }

        if self.level.has_collision(m.cx - 1, m.cy) && m.xr <= self.ratios.left {
            m.xr = self.ratios.left;
            m.velocity_x *= 0.5;
            self.hit(-1, 0);
        }
    }

    fn check_y_collision(&mut self, m: &mut Motion) {
        let top = self.ratios.top_threshold(self.height, m.grid_size);
        if self.level.has_collision(m.cx, m.cy - 1) && m.yr <= top {
            m.yr = top;
            m.velocity_y = 0.0;
            self.hit(0, -1);
        }

        if self.level.has_collision(m.cx, m.cy + 1) && m.yr >= self.ratios.bottom {
            m.velocity_y = 0.0;
            m.yr = self.ratios.bottom;
            self.hit(0, 1);
        }
    }
}

/// Whether a body rests exactly on the floor contact point.
///
/// All three must hold: no vertical velocity, a solid cell below, and the
/// vertical offset equal to the bottom ratio.
pub fn on_ground<L: GameLevel + ?Sized>(motion: &Motion, level: &L, ratios: &CollisionRatios) -> bool {
    motion.velocity_y == 0.0
        && level.has_collision(motion.cx, motion.cy + 1)
        && motion.yr == ratios.bottom
}

/// Level collision plus gravity gated on ground contact.
pub struct PlatformHooks<'a, L: GameLevel + ?Sized> {
    pub inner: LevelHooks<'a, L>,
    pub has_gravity: bool,
}

impl<'a, L: GameLevel + ?Sized> PlatformHooks<'a, L> {
    pub fn new(inner: LevelHooks<'a, L>, has_gravity: bool) -> Self {
        Self { inner, has_gravity }
    }
}

impl<L: GameLevel + ?Sized> StepHooks for PlatformHooks<'_, L> {
    fn gravity_y(&mut self, m: &Motion) -> f32 {
        if self.has_gravity && !on_ground(m, self.inner.level, &self.inner.ratios) {
            m.gravity_multiplier * m.gravity_y
        } else {
            0.0
        }
    }

    fn pre_x_check(&mut self, m: &mut Motion) {
        self.inner.pre_x_check(m);
    }

    fn check_x_collision(&mut self, m: &mut Motion) {
        self.inner.check_x_collision(m);
    }

    fn pre_y_check(&mut self, m: &mut Motion) {
        self.inner.pre_y_check(m);
    }

    fn check_y_collision(&mut self, m: &mut Motion) {
        self.inner.check_y_collision(m);
    }
}
