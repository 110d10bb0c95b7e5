//! The player: a platform body steered by the keyboard.

use grid_engine::{
    keys, Body, CollisionRatios, EngineContext, Entity, EntityId, GameCamera, GameEvent, GameLevel,
    InputState, SoundEvent, SpriteComponent,
};

use crate::game::{game_events, sounds};

// Movement tuning, in cells per fixed step
const SPEED: f32 = 0.08;
const JUMP_HEIGHT: f32 = -1.35;
const GRAVITY: f32 = 0.075;
/// Horizontal velocity kept per step when no direction is held.
const STOP_DAMPING: f32 = 0.3;
/// Upward velocity kept when jump is released early.
const JUMP_CUT: f32 = 0.5;
const JUMP_STRETCH: f32 = 0.7;

/// Falls longer than this (pixels) end with a landing thud.
const LAND_FALL_PX: f32 = 25.0;
const LAND_SHAKE_DURATION: f32 = 0.025;
const LAND_SHAKE_POWER: f32 = 0.7;

// Timers (seconds)
const ON_GROUND_RECENTLY: &str = "on_ground_recently";
const ON_GROUND_RECENTLY_TIME: f32 = 0.15;
const FOOTSTEP: &str = "footstep";
const FOOTSTEP_TIME: f32 = 0.35;
const RUN_DUST: &str = "run_dust";
const RUN_DUST_TIME: f32 = 0.1;

pub const HERO_TAG: &str = "hero";

/// Controller state for the hero entity living in the scene.
#[derive(Debug, Clone)]
pub struct Hero {
    pub id: EntityId,
    move_dir: i32,
    jumping: bool,
    /// Pixel height the current fall is measured from.
    last_height: f32,
}

/// Side effects of one control pass, emitted once the entity borrow ends.
#[derive(Default)]
struct Cues {
    sounds: Vec<SoundEvent>,
    dust: Option<(f32, f32)>,
    landed: bool,
}

impl Hero {
    pub fn spawn(ctx: &mut EngineContext, cx: i32, cy: i32) -> Self {
        let ratios = CollisionRatios {
            top: 0.5,
            use_top_ratio: true,
            ..CollisionRatios::default()
        };
        let mut entity = ctx
            .create_entity()
            .with_tag(HERO_TAG)
            .with_body(Body::Platform {
                ratios,
                has_gravity: true,
            })
            .with_grid_position(cx, cy, 0.5, 1.0)
            .with_sprite(SpriteComponent::new(0.0, 0.0, 8.0, 8.0));
        entity.motion.gravity_y = GRAVITY;

        let last_height = entity.attach_y();
        let id = ctx.scene.spawn(entity);
        Self {
            id,
            move_dir: 0,
            jumping: false,
            last_height,
        }
    }

    pub fn move_dir(&self) -> i32 {
        self.move_dir
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    /// Per-frame input handling: landing, running and jumping.
    pub fn update<L: GameLevel + ?Sized>(
        &mut self,
        ctx: &mut EngineContext,
        input: &InputState,
        level: &L,
        camera: &mut GameCamera,
    ) {
        let Some(entity) = ctx.scene.get_mut(self.id) else {
            return;
        };

        let cues = self.control(entity, input, level);

        if cues.landed {
            camera.shake(LAND_SHAKE_DURATION, LAND_SHAKE_POWER);
        }
        for sound in cues.sounds {
            ctx.emit_sound(sound);
        }
        if let Some((x, y)) = cues.dust {
            ctx.emit_event(GameEvent {
                kind: game_events::RUN_DUST,
                a: x,
                b: y,
                c: 0.0,
            });
        }
    }

    fn control<L: GameLevel + ?Sized>(&mut self, hero: &mut Entity, input: &InputState, level: &L) -> Cues {
        let mut cues = Cues::default();
        self.move_dir = 0;

        let y = hero.attach_y();
        if hero.on_ground(level) {
            hero.cooldown.arm(ON_GROUND_RECENTLY, ON_GROUND_RECENTLY_TIME);
            if y - self.last_height > LAND_FALL_PX {
                cues.sounds.push(sounds::LAND);
                cues.landed = true;
            }
            self.last_height = y;
        } else if hero.motion.velocity_y < 0.0 {
            self.last_height = y;
        }

        self.run(hero, input, level, &mut cues);
        self.jump(hero, input);
        cues
    }

    fn run<L: GameLevel + ?Sized>(&mut self, hero: &mut Entity, input: &InputState, level: &L, cues: &mut Cues) {
        let right = input.is_key_down(keys::D) || input.is_key_down(keys::RIGHT);
        let left = input.is_key_down(keys::A) || input.is_key_down(keys::LEFT);
        if !right && !left {
            return;
        }

        let on_ground = hero.on_ground(level);
        if on_ground && !hero.cooldown.has(RUN_DUST) {
            hero.cooldown.arm(RUN_DUST, RUN_DUST_TIME);
            cues.dust = Some((hero.attach_x(), hero.attach_y()));
        }
        if on_ground && !hero.cooldown.has(FOOTSTEP) {
            hero.cooldown.arm(FOOTSTEP, FOOTSTEP_TIME);
            cues.sounds.push(sounds::FOOTSTEP);
        }

        let dir = if right { 1 } else { -1 };
        hero.visual.dir = dir;
        self.move_dir = dir;
    }

    fn jump(&mut self, hero: &mut Entity, input: &InputState) {
        if input.is_key_just_pressed(keys::SPACE) && hero.cooldown.has(ON_GROUND_RECENTLY) {
            hero.motion.velocity_y = JUMP_HEIGHT;
            hero.visual.set_stretch_x(JUMP_STRETCH);
            self.jumping = true;
        }

        // Releasing early cuts the jump short.
        if self.jumping && !input.is_key_down(keys::SPACE) {
            hero.motion.velocity_y *= JUMP_CUT;
            self.jumping = false;
        }
    }

    /// Apply run input after the hero's grid step.
    pub fn fixed_update(&self, ctx: &mut EngineContext) {
        let Some(hero) = ctx.scene.get_mut(self.id) else {
            return;
        };
        if self.move_dir != 0 {
            hero.motion.velocity_x += self.move_dir as f32 * SPEED;
        } else {
            hero.motion.velocity_x *= STOP_DAMPING;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_engine::{GameConfig, GridLevel, InputEvent};

    fn floor() -> GridLevel<()> {
        GridLevel::from_rows(8, &["........", "........", "........", "########"]).unwrap()
    }

    fn setup() -> (EngineContext, Hero, GridLevel<()>, GameCamera) {
        let mut ctx = EngineContext::new(&GameConfig::default());
        let hero = Hero::spawn(&mut ctx, 3, 2);
        (ctx, hero, floor(), GameCamera::new(64.0, 32.0))
    }

    fn input(events: &[InputEvent]) -> InputState {
        let mut state = InputState::new();
        state.begin_frame(events.iter().copied());
        state
    }

    #[test]
    fn spawned_hero_rests_on_the_floor() {
        let (ctx, hero, level, _) = setup();
        let entity = ctx.scene.get(hero.id).unwrap();
        assert_eq!(entity.tag, HERO_TAG);
        assert!(entity.on_ground(&level));
        assert_eq!(entity.motion.gravity_y, GRAVITY);
    }

    #[test]
    fn running_on_ground_steps_and_kicks_dust() {
        let (mut ctx, mut hero, level, mut camera) = setup();
        let held = input(&[InputEvent::KeyDown { key_code: keys::A }]);

        hero.update(&mut ctx, &held, &level, &mut camera);
        assert_eq!(hero.move_dir(), -1);
        assert_eq!(ctx.sounds, vec![sounds::FOOTSTEP]);
        assert_eq!(ctx.events.len(), 1);
        assert_eq!(ctx.events[0].kind, game_events::RUN_DUST);
        assert_eq!(ctx.scene.get(hero.id).unwrap().visual.dir, -1);

        // Footsteps wait for their timer.
        ctx.clear_frame_data();
        hero.update(&mut ctx, &held, &level, &mut camera);
        assert!(ctx.sounds.is_empty());

        hero.fixed_update(&mut ctx);
        assert!((ctx.scene.get(hero.id).unwrap().motion.velocity_x + SPEED).abs() < 1e-6);
    }

    #[test]
    fn idle_hero_brakes() {
        let (mut ctx, mut hero, level, mut camera) = setup();
        ctx.scene.get_mut(hero.id).unwrap().motion.velocity_x = 0.4;

        hero.update(&mut ctx, &InputState::new(), &level, &mut camera);
        hero.fixed_update(&mut ctx);

        assert_eq!(hero.move_dir(), 0);
        assert!((ctx.scene.get(hero.id).unwrap().motion.velocity_x - 0.12).abs() < 1e-6);
    }

    #[test]
    fn jump_requires_recent_ground_and_can_be_cut() {
        let (mut ctx, mut hero, level, mut camera) = setup();
        let press = input(&[InputEvent::KeyDown { key_code: keys::SPACE }]);

        hero.update(&mut ctx, &press, &level, &mut camera);
        assert!(hero.is_jumping());
        let entity = ctx.scene.get(hero.id).unwrap();
        assert_eq!(entity.motion.velocity_y, JUMP_HEIGHT);
        assert!((entity.visual.stretch_x() - JUMP_STRETCH).abs() < 1e-6);

        // Released on the next frame.
        let mut released = press;
        released.begin_frame([InputEvent::KeyUp { key_code: keys::SPACE }]);
        hero.update(&mut ctx, &released, &level, &mut camera);
        assert!(!hero.is_jumping());
        assert!((ctx.scene.get(hero.id).unwrap().motion.velocity_y - JUMP_HEIGHT * JUMP_CUT).abs() < 1e-6);
    }

    #[test]
    fn no_jump_without_ground() {
        let (mut ctx, mut hero, level, mut camera) = setup();
        ctx.scene.get_mut(hero.id).unwrap().motion.to_grid_position(3, 0, 0.5, 0.5);

        let press = input(&[InputEvent::KeyDown { key_code: keys::SPACE }]);
        hero.update(&mut ctx, &press, &level, &mut camera);

        assert!(!hero.is_jumping());
        assert_eq!(ctx.scene.get(hero.id).unwrap().motion.velocity_y, 0.0);
    }

    #[test]
    fn long_fall_lands_with_a_thud() {
        let (mut ctx, mut hero, level, mut camera) = setup();
        hero.last_height = -10.0;

        hero.update(&mut ctx, &InputState::new(), &level, &mut camera);

        assert_eq!(ctx.sounds, vec![sounds::LAND]);
        assert!(camera.is_shaking());
        assert_eq!(hero.last_height, ctx.scene.get(hero.id).unwrap().attach_y());
    }
}
