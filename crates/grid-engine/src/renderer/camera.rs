use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::cooldown::CooldownComponent;
use crate::core::math::lerp;
use crate::core::scene::Scene;

const SHAKE: &str = "shake";

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
}

/// Follow camera for Y-down pixel worlds.
///
/// Eases toward its target outside a small dead zone, stays inside the level
/// bounds, and layers bump and shake offsets on top.
#[derive(Debug)]
pub struct GameCamera {
    /// Visible size in pixels.
    pub virtual_width: f32,
    pub virtual_height: f32,
    /// Level size in pixels; the view is kept inside it.
    pub view_bounds: Vec2,
    /// Center of the view in world pixels.
    pub position: Vec2,
    pub zoom: f32,
    /// Distance in pixels the target may drift before the camera moves.
    pub dead_zone: f32,
    pub clamp_to_bounds: bool,
    pub snap_to_pixel: bool,
    following: Option<EntityId>,
    shake_power: f32,
    shake_frames: u32,
    bump: Vec2,
    cooldown: CooldownComponent,
}

impl GameCamera {
    pub fn new(virtual_width: f32, virtual_height: f32) -> Self {
        Self {
            virtual_width,
            virtual_height,
            view_bounds: Vec2::ZERO,
            position: Vec2::ZERO,
            zoom: 1.0,
            dead_zone: 5.0,
            clamp_to_bounds: true,
            snap_to_pixel: true,
            following: None,
            shake_power: 1.0,
            shake_frames: 0,
            bump: Vec2::ZERO,
            cooldown: CooldownComponent::new(),
        }
    }

    pub fn with_bounds(mut self, width: f32, height: f32) -> Self {
        self.view_bounds = Vec2::new(width, height);
        self
    }

    /// Track `target`. With `set_immediately` the view also jumps onto it,
    /// which fails when there is no target.
    pub fn follow(&mut self, target: Option<&Entity>, set_immediately: bool) -> Result<(), EngineError> {
        self.following = target.map(|e| e.id);
        if set_immediately {
            let target = target.ok_or(EngineError::MissingFollowTarget)?;
            self.position = target.pixel();
        }
        Ok(())
    }

    pub fn unfollow(&mut self) {
        self.following = None;
    }

    pub fn following(&self) -> Option<EntityId> {
        self.following
    }

    /// Shake for `duration` seconds. Intensity fades with the remaining time.
    pub fn shake(&mut self, duration: f32, power: f32) {
        self.cooldown.arm(SHAKE, duration);
        self.shake_power = power;
    }

    pub fn is_shaking(&self) -> bool {
        self.cooldown.has(SHAKE)
    }

    /// Kick the view by an offset that decays over the next frames.
    pub fn bump(&mut self, x: f32, y: f32) {
        self.bump += Vec2::new(x, y);
    }

    /// Kick the view `distance` pixels along `angle` (radians).
    pub fn bump_angle(&mut self, angle: f32, distance: f32) {
        self.bump += Vec2::new(angle.cos(), angle.sin()) * distance;
    }

    /// Per-frame update, after entities have moved.
    pub fn update(&mut self, dt: f32, scene: &Scene) {
        self.cooldown.update(dt);

        if let Some(id) = self.following {
            match scene.get(id) {
                Some(target) => self.ease_toward(target.pixel()),
                None => {
                    log::debug!("camera target {:?} left the scene", id);
                    self.following = None;
                }
            }
        }

        if self.clamp_to_bounds {
            self.position.x = clamp_axis(self.position.x, self.view_bounds.x, self.virtual_width);
            self.position.y = clamp_axis(self.position.y, self.view_bounds.y, self.virtual_height);
        }

        self.bump *= 0.75;
        self.position += self.bump;

        if self.cooldown.has(SHAKE) {
            let power = 2.5 * self.shake_power * self.cooldown.ratio(SHAKE);
            let frame = self.shake_frames as f32;
            self.position.x += (frame * 1.1).cos() * power;
            self.position.y += (0.3 + frame * 1.7).sin() * power;
            self.shake_frames += 1;
        } else {
            self.shake_frames = 0;
        }

        if self.snap_to_pixel {
            self.position = self.position.round();
        }
    }

    fn ease_toward(&mut self, target: Vec2) {
        if self.position.distance(target) >= self.dead_zone {
            self.position.x = lerp(self.position.x, target.x, 0.015 * self.zoom);
            self.position.y = lerp(self.position.y, target.y, 0.023 * self.zoom);
        }
    }

    /// Orthographic projection with the origin at the top-left, Y down.
    pub fn projection_matrix(&self) -> Mat4 {
        let half_w = self.virtual_width * 0.5 / self.zoom;
        let half_h = self.virtual_height * 0.5 / self.zoom;
        Mat4::orthographic_rh(
            self.position.x - half_w,
            self.position.x + half_w,
            self.position.y + half_h,
            self.position.y - half_h,
            0.0,
            1.0,
        )
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            projection: self.projection_matrix().to_cols_array_2d(),
        }
    }

    /// Check if a world-space point is visible in the viewport.
    pub fn is_visible(&self, point: Vec2) -> bool {
        let half = Vec2::new(self.virtual_width, self.virtual_height) * 0.5 / self.zoom;
        (point - self.position).abs().cmple(half).all()
    }
}

/// Keep the view inside `[0, bounds]`, centering it when the level is smaller.
fn clamp_axis(pos: f32, bounds: f32, view: f32) -> f32 {
    if bounds < view {
        bounds * 0.5
    } else {
        pos.clamp(view * 0.5, bounds - view * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_target(cx: i32, cy: i32) -> (Scene, EntityId) {
        let mut scene = Scene::new();
        let id = scene.spawn(Entity::new(EntityId(1), 8.0).with_grid_position(cx, cy, 0.5, 1.0));
        (scene, id)
    }

    fn camera() -> GameCamera {
        let mut cam = GameCamera::new(100.0, 80.0).with_bounds(400.0, 300.0);
        cam.snap_to_pixel = false;
        cam
    }

    #[test]
    fn snapping_to_missing_target_is_an_error() {
        let mut cam = camera();
        assert!(matches!(
            cam.follow(None, true),
            Err(EngineError::MissingFollowTarget)
        ));
        assert!(cam.follow(None, false).is_ok());
        assert_eq!(cam.following(), None);
    }

    #[test]
    fn follow_immediately_jumps_to_target() {
        let (scene, id) = scene_with_target(20, 15);
        let mut cam = camera();
        cam.follow(scene.get(id), true).unwrap();
        assert_eq!(cam.position, Vec2::new(164.0, 128.0));
        assert_eq!(cam.following(), Some(id));
    }

    #[test]
    fn target_inside_dead_zone_does_not_move_camera() {
        let (scene, id) = scene_with_target(20, 15);
        let mut cam = camera();
        cam.follow(scene.get(id), true).unwrap();
        cam.position.x += 3.0;
        let before = cam.position;
        cam.update(1.0 / 60.0, &scene);
        assert_eq!(cam.position, before);
    }

    #[test]
    fn camera_eases_with_per_axis_speed() {
        let (scene, id) = scene_with_target(20, 15);
        let mut cam = camera();
        cam.follow(scene.get(id), false).unwrap();
        cam.position = Vec2::new(264.0, 228.0);
        cam.update(1.0 / 60.0, &scene);
        // 100 px off on each axis: 1.5 px and 2.3 px closer.
        assert!((cam.position.x - 262.5).abs() < 1e-3);
        assert!((cam.position.y - 225.7).abs() < 1e-3);
    }

    #[test]
    fn clamp_keeps_view_inside_level_or_centers_it() {
        let (scene, _) = scene_with_target(0, 0);
        let mut cam = camera();
        cam.position = Vec2::new(-50.0, 1000.0);
        cam.update(0.0, &scene);
        assert_eq!(cam.position, Vec2::new(50.0, 260.0));

        let mut small = GameCamera::new(100.0, 80.0).with_bounds(60.0, 40.0);
        small.update(0.0, &scene);
        assert_eq!(small.position, Vec2::new(30.0, 20.0));
    }

    #[test]
    fn bump_decays_each_frame() {
        let (scene, _) = scene_with_target(0, 0);
        let mut cam = camera();
        cam.clamp_to_bounds = false;
        cam.bump(4.0, 0.0);
        cam.update(0.0, &scene);
        assert!((cam.position.x - 3.0).abs() < 1e-5);
        cam.update(0.0, &scene);
        assert!((cam.position.x - 5.25).abs() < 1e-5);
    }

    #[test]
    fn bump_angle_uses_sine_for_y() {
        let mut cam = camera();
        cam.bump_angle(std::f32::consts::FRAC_PI_2, 2.0);
        assert!(cam.bump.x.abs() < 1e-5);
        assert!((cam.bump.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn shake_offsets_until_it_expires() {
        let (scene, _) = scene_with_target(0, 0);
        let mut cam = camera();
        cam.clamp_to_bounds = false;
        cam.shake(0.1, 1.0);
        assert!(cam.is_shaking());

        cam.update(0.05, &scene);
        // Frame 0: cos(0) * 2.5 * ratio 0.5
        assert!((cam.position.x - 1.25).abs() < 1e-3);

        cam.update(0.06, &scene);
        assert!(!cam.is_shaking());
        assert_eq!(cam.shake_frames, 0);
    }

    #[test]
    fn losing_the_target_unfollows() {
        let (mut scene, id) = scene_with_target(5, 5);
        let mut cam = camera();
        cam.follow(scene.get(id), false).unwrap();
        scene.destroy(id);
        scene.flush_destroyed();
        cam.update(0.016, &scene);
        assert_eq!(cam.following(), None);
    }

    #[test]
    fn visibility_uses_view_extent() {
        let mut cam = camera();
        cam.position = Vec2::new(200.0, 150.0);
        assert!(cam.is_visible(Vec2::new(240.0, 180.0)));
        assert!(!cam.is_visible(Vec2::new(260.0, 150.0)));
    }
}
