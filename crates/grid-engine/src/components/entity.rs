use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::collision::{self, CollisionRatios, LevelCollision, LevelHooks, PlatformHooks};
use crate::components::level::GameLevel;
use crate::components::motion::{FreeMotion, Motion};
use crate::components::sprite::SpriteComponent;
use crate::components::visual::Visual;
use crate::core::cooldown::CooldownComponent;
use crate::core::math::{cast_ray, dist};
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Collision strategy an entity's fixed step runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body {
    /// Moves without consulting the level.
    Free,
    /// Clamped against solid cells.
    Level(CollisionRatios),
    /// Clamped against solid cells, with gravity while airborne.
    Platform {
        ratios: CollisionRatios,
        has_gravity: bool,
    },
}

impl Body {
    pub fn level() -> Self {
        Body::Level(CollisionRatios::default())
    }

    pub fn platform() -> Self {
        Body::Platform {
            ratios: CollisionRatios::default(),
            has_gravity: true,
        }
    }

    pub fn ratios(&self) -> Option<&CollisionRatios> {
        match self {
            Body::Free => None,
            Body::Level(ratios) | Body::Platform { ratios, .. } => Some(ratios),
        }
    }

    pub fn ratios_mut(&mut self) -> Option<&mut CollisionRatios> {
        match self {
            Body::Free => None,
            Body::Level(ratios) | Body::Platform { ratios, .. } => Some(ratios),
        }
    }
}

/// Fat Entity: grid motion, visuals, a collision strategy and its own timers.
/// Games keep their behavior next to it and drive it by id through the `Scene`.
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    pub motion: Motion,
    pub visual: Visual,
    pub body: Body,
    pub cooldown: CooldownComponent,
    /// Contacts resolved during the last fixed step.
    collisions: Vec<LevelCollision>,
    destroyed: bool,
}

impl Entity {
    pub fn new(id: EntityId, grid_size: f32) -> Self {
        Self {
            id,
            tag: String::new(),
            motion: Motion::new(grid_size),
            visual: Visual::new(grid_size),
            body: Body::Free,
            cooldown: CooldownComponent::new(),
            collisions: Vec::new(),
            destroyed: false,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_grid_position(mut self, cx: i32, cy: i32, xr: f32, yr: f32) -> Self {
        self.motion.to_grid_position(cx, cy, xr, yr);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.visual.width = width;
        self.visual.height = height;
        self
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.visual.anchor_x = x;
        self.visual.anchor_y = y;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.visual.sprite = Some(sprite);
        self
    }

    // -- Lifecycle --

    /// Per-frame tick: advances this entity's timers.
    pub fn update(&mut self, dt: f32) {
        self.cooldown.update(dt);
    }

    /// One simulation step against `level`.
    pub fn fixed_update<L: GameLevel + ?Sized>(&mut self, level: &L) {
        self.collisions.clear();
        let height = self.visual.height;
        match self.body {
            Body::Free => self.motion.step(&mut FreeMotion),
            Body::Level(ratios) => {
                let mut hooks = LevelHooks::new(level, ratios, height, &mut self.collisions);
                self.motion.step(&mut hooks);
            }
            Body::Platform { ratios, has_gravity } => {
                let inner = LevelHooks::new(level, ratios, height, &mut self.collisions);
                self.motion.step(&mut PlatformHooks::new(inner, has_gravity));
            }
        }
    }

    /// Per-frame visual settle after all fixed steps ran.
    pub fn post_update(&mut self, dt: f32) {
        self.visual.post_update(dt);
    }

    pub fn set_progression_ratio(&mut self, ratio: f32) {
        self.motion.progression_ratio = ratio;
    }

    /// Mark the entity destroyed. Returns false if it already was.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        log::debug!("entity {:?} ({}) destroyed", self.id, self.tag);
        self.destroyed = true;
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Contacts resolved during the last fixed step, in order.
    pub fn collisions(&self) -> &[LevelCollision] {
        &self.collisions
    }

    /// Whether the body rests on the floor. Always false for free bodies.
    pub fn on_ground<L: GameLevel + ?Sized>(&self, level: &L) -> bool {
        self.body
            .ratios()
            .is_some_and(|ratios| collision::on_ground(&self.motion, level, ratios))
    }

    // -- Geometry --

    pub fn px(&self) -> f32 {
        self.motion.px()
    }

    pub fn py(&self) -> f32 {
        self.motion.py()
    }

    pub fn pixel(&self) -> Vec2 {
        self.motion.pixel()
    }

    pub fn attach_x(&self) -> f32 {
        self.motion.attach_x()
    }

    pub fn attach_y(&self) -> f32 {
        self.motion.attach_y()
    }

    pub fn center_x(&self) -> f32 {
        self.attach_x() + (0.5 - self.visual.anchor_x) * self.motion.grid_size
    }

    pub fn center_y(&self) -> f32 {
        self.attach_y() + (0.5 - self.visual.anchor_y) * self.motion.grid_size
    }

    pub fn left(&self) -> f32 {
        self.attach_x() - self.visual.anchor_x * self.visual.width
    }

    pub fn right(&self) -> f32 {
        self.attach_x() + (1.0 - self.visual.anchor_x) * self.visual.width
    }

    pub fn top(&self) -> f32 {
        self.attach_y() - self.visual.anchor_y * self.visual.height
    }

    pub fn bottom(&self) -> f32 {
        self.attach_y() + (1.0 - self.visual.anchor_y) * self.visual.height
    }

    // -- Queries --

    /// 1 if `x` lies right of this entity's center, else -1.
    pub fn dir_to(&self, x: f32) -> i32 {
        if x > self.center_x() {
            1
        } else {
            -1
        }
    }

    pub fn dir_to_entity(&self, other: &Entity) -> i32 {
        self.dir_to(other.center_x())
    }

    pub fn dist_grid_to(&self, other: &Entity) -> f32 {
        let m = &other.motion;
        self.motion.dist_grid_to(m.cx, m.cy, m.xr, m.yr)
    }

    pub fn dist_px_to(&self, other: &Entity) -> f32 {
        dist(self.px(), self.py(), other.px(), other.py())
    }

    pub fn angle_to(&self, other: &Entity) -> f32 {
        self.motion.angle_to(other.center_x(), other.center_y())
    }

    /// Whether every cell on the line to `(cx, cy)` passes `can_pass`.
    pub fn cast_ray_to(&self, cx: i32, cy: i32, can_pass: impl FnMut(i32, i32) -> bool) -> bool {
        cast_ray(self.motion.cx, self.motion.cy, cx, cy, can_pass)
    }

    /// Whether the two bounding boxes overlap. Touching edges do not count.
    pub fn is_colliding_with(&self, other: &Entity) -> bool {
        if self.left() >= other.right() || other.left() >= self.right() {
            return false;
        }
        !(self.top() >= other.bottom() || other.top() >= self.bottom())
    }

    pub fn is_colliding_with_inner_circle(&self, other: &Entity) -> bool {
        self.dist_px_to(other) <= self.visual.inner_radius()
    }

    pub fn is_colliding_with_outer_circle(&self, other: &Entity) -> bool {
        self.dist_px_to(other) <= self.visual.outer_radius()
    }

    // -- Rendering --

    /// Build the draw for this entity, if it is visible and has a sprite.
    pub fn render_instance(&self) -> Option<RenderInstance> {
        if !self.visual.visible {
            return None;
        }
        let sprite = self.visual.sprite.as_ref()?;
        Some(RenderInstance {
            x: self.px(),
            y: self.py(),
            origin_x: self.visual.anchor_x * sprite.width,
            origin_y: self.visual.anchor_y * sprite.height,
            scale_x: self.visual.scale_x,
            scale_y: self.visual.scale_y,
            sprite_col: sprite.col,
            atlas_row: sprite.row,
        })
    }

    pub fn render(&self, buffer: &mut RenderBuffer) {
        if let Some(instance) = self.render_instance() {
            if !buffer.push(instance) {
                log::warn!("entity {:?} not drawn: render buffer full", self.id);
            }
        }
    }
}
