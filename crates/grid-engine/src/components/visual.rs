use crate::components::sprite::SpriteComponent;

/// Render-only entity state: size, pivot, squash/stretch and facing.
/// Nothing here affects simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    /// Size in pixels.
    pub width: f32,
    pub height: f32,
    /// Pivot as a fraction of width/height. (0.5, 1.0) is bottom-center.
    pub anchor_x: f32,
    pub anchor_y: f32,
    stretch_x: f32,
    stretch_y: f32,
    pub extra_scale_x: f32,
    pub extra_scale_y: f32,
    /// Final scale, recomputed by `post_update`.
    pub scale_x: f32,
    pub scale_y: f32,
    /// Rate at which stretch returns to neutral, per second.
    pub restore_speed: f32,
    /// Facing: 1 right, -1 left.
    pub dir: i32,
    pub visible: bool,
    pub sprite: Option<SpriteComponent>,
}

impl Visual {
    pub fn new(grid_size: f32) -> Self {
        Self {
            width: grid_size,
            height: grid_size,
            anchor_x: 0.5,
            anchor_y: 1.0,
            stretch_x: 1.0,
            stretch_y: 1.0,
            extra_scale_x: 1.0,
            extra_scale_y: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            restore_speed: 12.0,
            dir: 1,
            visible: true,
            sprite: None,
        }
    }

    pub fn stretch_x(&self) -> f32 {
        self.stretch_x
    }

    pub fn stretch_y(&self) -> f32 {
        self.stretch_y
    }

    /// Squash horizontally; the vertical stretch mirrors around 1.
    pub fn set_stretch_x(&mut self, value: f32) {
        self.stretch_x = value;
        self.stretch_y = 2.0 - value;
    }

    /// Squash vertically; the horizontal stretch mirrors around 1.
    pub fn set_stretch_y(&mut self, value: f32) {
        self.stretch_x = 2.0 - value;
        self.stretch_y = value;
    }

    /// Recompute the final scale, then ease stretch back toward 1.
    pub fn post_update(&mut self, dt: f32) {
        self.scale_x = self.extra_scale_x * self.dir as f32 * self.stretch_x;
        self.scale_y = self.extra_scale_y * self.stretch_y;
        let t = (self.restore_speed * dt).min(1.0);
        self.stretch_x += (1.0 - self.stretch_x) * t;
        self.stretch_y += (1.0 - self.stretch_y) * t;
    }

    pub fn inner_radius(&self) -> f32 {
        self.width.min(self.height) * 0.5
    }

    pub fn outer_radius(&self) -> f32 {
        self.width.max(self.height) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretch_setters_are_coupled() {
        let mut v = Visual::new(8.0);
        v.set_stretch_x(1.25);
        assert_eq!(v.stretch_y(), 0.75);
        v.set_stretch_y(1.4);
        assert!((v.stretch_x() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn post_update_applies_facing_and_decays() {
        let mut v = Visual::new(8.0);
        v.dir = -1;
        v.set_stretch_x(1.5);
        v.post_update(1.0 / 60.0);
        assert_eq!(v.scale_x, -1.5);
        assert_eq!(v.scale_y, 0.5);
        // 12 * 1/60 = 0.2 of the gap closed.
        assert!((v.stretch_x() - 1.4).abs() < 1e-5);
        assert!((v.stretch_y() - 0.6).abs() < 1e-5);
    }

    #[test]
    fn long_frames_restore_fully() {
        let mut v = Visual::new(8.0);
        v.set_stretch_y(0.3);
        v.post_update(1.0);
        assert!((v.stretch_x() - 1.0).abs() < 1e-6);
        assert!((v.stretch_y() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn radii_use_min_and_max_extent() {
        let mut v = Visual::new(8.0);
        v.width = 10.0;
        v.height = 24.0;
        assert_eq!(v.inner_radius(), 5.0);
        assert_eq!(v.outer_radius(), 12.0);
    }
}
