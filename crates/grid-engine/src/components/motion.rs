//! Grid-cell motion integrator.
//!
//! Position is an integer cell `(cx, cy)` plus a sub-cell offset `(xr, yr)`.
//! Pixel position is derived: `(cell + offset) * grid_size`. Y grows downward.
//!
//! Each fixed step splits movement into sub-steps so no single sub-step moves
//! far enough to skip over a solid cell. Collision and gravity behavior is
//! supplied through `StepHooks`, so the same integrator drives free, level and
//! platform bodies.

use glam::Vec2;

use crate::api::error::EngineError;
use crate::core::math::{dist, lerp};

/// Velocities at or below this magnitude snap to zero after friction.
pub const VELOCITY_EPSILON: f32 = 0.0005;

/// Override points called by `Motion::step`. All default to no-ops.
pub trait StepHooks {
    /// Horizontal gravity added to velocity at the start of a step.
    fn gravity_x(&mut self, _motion: &Motion) -> f32 {
        0.0
    }

    /// Vertical gravity added to velocity at the start of a step.
    fn gravity_y(&mut self, _motion: &Motion) -> f32 {
        0.0
    }

    fn pre_x_check(&mut self, _motion: &mut Motion) {}

    fn check_x_collision(&mut self, _motion: &mut Motion) {}

    fn pre_y_check(&mut self, _motion: &mut Motion) {}

    fn check_y_collision(&mut self, _motion: &mut Motion) {}
}

/// Hooks for a body that ignores level geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeMotion;

impl StepHooks for FreeMotion {}

/// Integrator state for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    /// Pixels per grid cell.
    pub grid_size: f32,
    pub cx: i32,
    pub cy: i32,
    /// Sub-cell offset in [0, 1]. 1.0 itself stays in the cell so a bottom
    /// ratio of 1.0 can rest on the floor; only values past it carry.
    pub xr: f32,
    pub yr: f32,

    pub gravity_x: f32,
    pub gravity_y: f32,
    pub gravity_multiplier: f32,
    /// Velocity in cells per fixed step.
    pub velocity_x: f32,
    pub velocity_y: f32,
    /// Per-step velocity multiplier.
    pub friction_x: f32,
    pub friction_y: f32,
    /// Largest fraction of a cell crossed by one sub-step. Always positive.
    max_grid_movement_percent: f32,

    /// Interpolate rendered position between the last two fixed steps.
    pub interpolate: bool,
    /// Pixel position captured at the start of the last fixed step.
    pub last_px: f32,
    pub last_py: f32,
    /// Scheduler-supplied progress toward the next fixed step.
    pub progression_ratio: f32,
}

impl Motion {
    pub fn new(grid_size: f32) -> Self {
        let mut motion = Self {
            grid_size,
            cx: 0,
            cy: 0,
            xr: 0.5,
            yr: 1.0,
            gravity_x: 0.0,
            gravity_y: 0.0,
            gravity_multiplier: 1.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            friction_x: 0.82,
            friction_y: 0.82,
            max_grid_movement_percent: 0.33,
            interpolate: true,
            last_px: 0.0,
            last_py: 0.0,
            progression_ratio: 1.0,
        };
        motion.on_position_manually_changed();
        motion
    }

    // -- Builder pattern --

    pub fn with_grid_position(mut self, cx: i32, cy: i32, xr: f32, yr: f32) -> Self {
        self.to_grid_position(cx, cy, xr, yr);
        self
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.velocity_x = vx;
        self.velocity_y = vy;
        self
    }

    pub fn with_friction(mut self, fx: f32, fy: f32) -> Self {
        self.friction_x = fx;
        self.friction_y = fy;
        self
    }

    pub fn with_gravity(mut self, gx: f32, gy: f32) -> Self {
        self.gravity_x = gx;
        self.gravity_y = gy;
        self
    }

    pub fn with_max_grid_movement(mut self, percent: f32) -> Result<Self, EngineError> {
        self.set_max_grid_movement(percent)?;
        Ok(self)
    }

    pub fn max_grid_movement_percent(&self) -> f32 {
        self.max_grid_movement_percent
    }

    /// Change the sub-step size. Zero, negative or non-finite values would
    /// leave a moving body with no sub-steps, so they are refused.
    pub fn set_max_grid_movement(&mut self, percent: f32) -> Result<(), EngineError> {
        if !percent.is_finite() || percent <= 0.0 {
            return Err(EngineError::InvalidMaxGridMovement(percent));
        }
        self.max_grid_movement_percent = percent;
        Ok(())
    }

    // -- Derived positions --

    /// Simulated pixel X.
    pub fn attach_x(&self) -> f32 {
        (self.cx as f32 + self.xr) * self.grid_size
    }

    /// Simulated pixel Y.
    pub fn attach_y(&self) -> f32 {
        (self.cy as f32 + self.yr) * self.grid_size
    }

    /// Rendered pixel X, interpolated between the last two fixed steps.
    pub fn px(&self) -> f32 {
        if self.interpolate {
            lerp(self.last_px, self.attach_x(), self.progression_ratio)
        } else {
            self.attach_x()
        }
    }

    /// Rendered pixel Y, interpolated between the last two fixed steps.
    pub fn py(&self) -> f32 {
        if self.interpolate {
            lerp(self.last_py, self.attach_y(), self.progression_ratio)
        } else {
            self.attach_y()
        }
    }

    pub fn attach(&self) -> Vec2 {
        Vec2::new(self.attach_x(), self.attach_y())
    }

    pub fn pixel(&self) -> Vec2 {
        Vec2::new(self.px(), self.py())
    }

    // -- Teleports --

    /// Reset interpolation so a manual move is not smoothed over.
    pub fn on_position_manually_changed(&mut self) {
        self.last_px = self.attach_x();
        self.last_py = self.attach_y();
    }

    pub fn to_grid_position(&mut self, cx: i32, cy: i32, xr: f32, yr: f32) {
        self.cx = cx;
        self.cy = cy;
        self.xr = xr;
        self.yr = yr;
        self.on_position_manually_changed();
    }

    pub fn to_pixel_position(&mut self, x: f32, y: f32) {
        self.cx = (x / self.grid_size).floor() as i32;
        self.cy = (y / self.grid_size).floor() as i32;
        self.xr = (x - self.cx as f32 * self.grid_size) / self.grid_size;
        self.yr = (y - self.cy as f32 * self.grid_size) / self.grid_size;
        self.on_position_manually_changed();
    }

    // -- Integration --

    /// Number of sub-steps for the current velocity.
    ///
    /// Only the vertical speed is divided by `max_grid_movement_percent`; the
    /// horizontal speed is added undivided. Movement tuning depends on this
    /// combined count, not a per-axis maximum.
    pub fn sub_step_count(&self) -> u32 {
        let steps = (self.velocity_x.abs()
            + self.velocity_y.abs() / self.max_grid_movement_percent)
            .ceil();
        if steps.is_finite() && steps > 0.0 {
            steps as u32
        } else {
            0
        }
    }

    /// Run one fixed step: gravity, sub-stepped movement with collision hooks,
    /// then friction.
    pub fn step<H: StepHooks + ?Sized>(&mut self, hooks: &mut H) {
        self.last_px = self.attach_x();
        self.last_py = self.attach_y();

        let gx = hooks.gravity_x(self);
        self.velocity_x += gx;
        let gy = hooks.gravity_y(self);
        self.velocity_y += gy;

        let steps = self.sub_step_count();
        let n = steps as f32;
        for _ in 0..steps {
            self.xr += self.velocity_x / n;
            if self.velocity_x != 0.0 {
                hooks.pre_x_check(self);
                hooks.check_x_collision(self);
            }
            self.carry_x();

            self.yr += self.velocity_y / n;
            if self.velocity_y != 0.0 {
                hooks.pre_y_check(self);
                hooks.check_y_collision(self);
            }
            self.carry_y();
        }

        self.velocity_x = damp(self.velocity_x, self.friction_x);
        self.velocity_y = damp(self.velocity_y, self.friction_y);
    }

    fn carry_x(&mut self) {
        while self.xr > 1.0 {
            self.xr -= 1.0;
            self.cx += 1;
        }
        while self.xr < 0.0 {
            self.xr += 1.0;
            self.cx -= 1;
        }
    }

    fn carry_y(&mut self) {
        while self.yr > 1.0 {
            self.yr -= 1.0;
            self.cy += 1;
        }
        while self.yr < 0.0 {
            self.yr += 1.0;
            self.cy -= 1;
        }
    }

    // -- Queries --

    /// Distance in cells to a grid position.
    pub fn dist_grid_to(&self, cx: i32, cy: i32, xr: f32, yr: f32) -> f32 {
        dist(
            self.cx as f32 + self.xr,
            self.cy as f32 + self.yr,
            cx as f32 + xr,
            cy as f32 + yr,
        )
    }

    /// Distance in pixels from the rendered position.
    pub fn dist_px_to(&self, x: f32, y: f32) -> f32 {
        dist(self.px(), self.py(), x, y)
    }

    /// Angle in radians from the rendered position to a pixel position.
    pub fn angle_to(&self, x: f32, y: f32) -> f32 {
        (y - self.py()).atan2(x - self.px())
    }
}

fn damp(velocity: f32, friction: f32) -> f32 {
    let v = velocity * friction;
    if v.abs() <= VELOCITY_EPSILON {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Rng;

    #[test]
    fn attach_combines_cell_and_offset() {
        let m = Motion::new(16.0).with_grid_position(2, 3, 0.5, 0.25);
        assert_eq!(m.attach_x(), 40.0);
        assert_eq!(m.attach_y(), 52.0);
    }

    #[test]
    fn moving_right_carries_into_next_cell() {
        let mut m = Motion::new(8.0)
            .with_grid_position(0, 0, 0.9, 0.5)
            .with_velocity(0.3, 0.0)
            .with_friction(1.0, 1.0);
        m.step(&mut FreeMotion);
        assert_eq!(m.cx, 1);
        assert!((m.xr - 0.2).abs() < 1e-5);
    }

    #[test]
    fn moving_left_borrows_from_previous_cell() {
        let mut m = Motion::new(8.0)
            .with_grid_position(3, 0, 0.1, 0.5)
            .with_velocity(-0.3, 0.0)
            .with_friction(1.0, 1.0);
        m.step(&mut FreeMotion);
        assert_eq!(m.cx, 2);
        assert!((m.xr - 0.8).abs() < 1e-5);
    }

    #[test]
    fn offset_of_exactly_one_does_not_carry() {
        let mut m = Motion::new(8.0)
            .with_grid_position(2, 2, 0.75, 0.75)
            .with_velocity(0.25, 0.25)
            .with_friction(1.0, 1.0);
        m.step(&mut FreeMotion);
        assert_eq!((m.cx, m.xr), (2, 1.0));
        assert_eq!((m.cy, m.yr), (2, 1.0));

        m.step(&mut FreeMotion);
        assert_eq!((m.cx, m.cy), (3, 3));
        assert!((m.xr - 0.25).abs() < 1e-5);
    }

    #[test]
    fn sub_step_count_divides_only_vertical_speed() {
        let m = Motion::new(8.0).with_velocity(0.5, 0.0);
        assert_eq!(m.sub_step_count(), 1);

        let m = Motion::new(8.0).with_velocity(0.0, 0.5);
        // ceil(0.5 / 0.33) = 2
        assert_eq!(m.sub_step_count(), 2);

        let m = Motion::new(8.0).with_velocity(-1.2, -0.66);
        // ceil(1.2 + 0.66 / 0.33) = ceil(3.2) = 4
        assert_eq!(m.sub_step_count(), 4);

        assert_eq!(Motion::new(8.0).sub_step_count(), 0);
    }

    #[test]
    fn sub_step_size_must_be_positive_and_finite() {
        for bad in [0.0, -0.33, f32::NAN, f32::INFINITY] {
            assert!(Motion::new(8.0).with_max_grid_movement(bad).is_err(), "{bad}");
        }

        let mut m = Motion::new(8.0).with_max_grid_movement(0.5).unwrap();
        assert!(m.set_max_grid_movement(0.0).is_err());
        assert_eq!(m.max_grid_movement_percent(), 0.5);

        // A rejected size leaves the body moving at the old one.
        m.velocity_x = 0.25;
        m.step(&mut FreeMotion);
        assert_eq!(m.cx, 0);
        assert!((m.xr - 0.75).abs() < 1e-5, "xr = {}", m.xr);
    }

    #[test]
    fn offsets_stay_normalized_under_random_motion() {
        let mut rng = Rng::new(1234);
        for _ in 0..200 {
            let mut m = Motion::new(8.0)
                .with_grid_position(0, 0, rng.range(0.0, 1.0), rng.range(0.0, 1.0))
                .with_velocity(rng.range(-5.0, 5.0), rng.range(-5.0, 5.0))
                .with_gravity(0.0, rng.range(-0.2, 0.2))
                .with_friction(rng.range(0.5, 1.0), rng.range(0.5, 1.0));
            for _ in 0..20 {
                let mut hooks = ConstantGravity;
                m.step(&mut hooks);
                // Closed on both ends, see carry_x.
                assert!((0.0..=1.0).contains(&m.xr), "xr = {}", m.xr);
                assert!((0.0..=1.0).contains(&m.yr), "yr = {}", m.yr);
            }
        }
    }

    struct ConstantGravity;

    impl StepHooks for ConstantGravity {
        fn gravity_y(&mut self, motion: &Motion) -> f32 {
            motion.gravity_y * motion.gravity_multiplier
        }
    }

    #[test]
    fn friction_converges_to_exact_zero() {
        let mut rng = Rng::new(99);
        for _ in 0..100 {
            let friction = rng.range(0.05, 0.99);
            let mut m = Motion::new(8.0)
                .with_velocity(rng.range(-3.0, 3.0), rng.range(-3.0, 3.0))
                .with_friction(friction, friction);
            let mut steps = 0;
            while m.velocity_x != 0.0 || m.velocity_y != 0.0 {
                m.step(&mut FreeMotion);
                steps += 1;
                assert!(steps < 2000, "friction {friction} never settled");
            }
        }
    }

    #[test]
    fn tiny_velocity_snaps_to_zero() {
        let mut m = Motion::new(8.0).with_velocity(0.0006, -0.0006);
        m.step(&mut FreeMotion);
        assert_eq!(m.velocity_x, 0.0);
        assert_eq!(m.velocity_y, 0.0);
    }

    #[test]
    fn step_snapshots_previous_pixel_position() {
        let mut m = Motion::new(10.0)
            .with_grid_position(1, 1, 0.5, 0.5)
            .with_velocity(0.2, 0.0)
            .with_friction(1.0, 1.0);
        m.step(&mut FreeMotion);
        assert_eq!(m.last_px, 15.0);
        assert!((m.attach_x() - 17.0).abs() < 1e-4);
    }

    #[test]
    fn rendered_position_interpolates_with_ratio() {
        let mut m = Motion::new(10.0)
            .with_grid_position(0, 0, 0.0, 0.0)
            .with_velocity(0.5, 0.0)
            .with_friction(1.0, 1.0);
        m.step(&mut FreeMotion);

        m.progression_ratio = 0.0;
        assert_eq!(m.px(), 0.0);
        m.progression_ratio = 0.5;
        assert!((m.px() - 2.5).abs() < 1e-5);
        m.progression_ratio = 1.0;
        assert!((m.px() - 5.0).abs() < 1e-5);

        m.interpolate = false;
        m.progression_ratio = 0.0;
        assert!((m.px() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn teleport_resets_interpolation() {
        let mut m = Motion::new(8.0);
        m.progression_ratio = 0.3;
        m.to_pixel_position(100.0, 36.0);
        assert_eq!(m.cx, 12);
        assert_eq!(m.cy, 4);
        assert!((m.xr - 0.5).abs() < 1e-6);
        assert!((m.yr - 0.5).abs() < 1e-6);
        assert!((m.px() - 100.0).abs() < 1e-4);
        assert!((m.py() - 36.0).abs() < 1e-4);
    }

    #[test]
    fn distance_and_angle_queries() {
        let m = Motion::new(10.0).with_grid_position(0, 0, 0.0, 0.0);
        assert!((m.dist_grid_to(3, 4, 0.0, 0.0) - 5.0).abs() < 1e-5);
        assert!((m.dist_px_to(30.0, 40.0) - 50.0).abs() < 1e-4);
        assert!((m.angle_to(0.0, 10.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
