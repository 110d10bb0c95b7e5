//! Diamond pickups and the registry that tracks the ones still in play.

use grid_engine::{Body, EngineContext, Entity, EntityId, SpriteComponent};

pub const DIAMOND_TAG: &str = "diamond";

/// Spawn a diamond resting at the bottom of cell `(cx, cy)`.
pub fn spawn_diamond(ctx: &mut EngineContext, cx: i32, cy: i32) -> EntityId {
    let diamond = ctx
        .create_entity()
        .with_tag(DIAMOND_TAG)
        .with_body(Body::level())
        .with_grid_position(cx, cy, 0.5, 1.0)
        .with_sprite(SpriteComponent::new(1.0, 0.0, 8.0, 8.0));
    ctx.scene.spawn(diamond)
}

/// Diamonds still waiting to be picked up, in spawn order.
#[derive(Debug, Default, Clone)]
pub struct DiamondRegistry {
    ids: Vec<EntityId>,
}

impl DiamondRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: EntityId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Forget a diamond. Returns false if it was not registered.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.ids.iter().position(|&d| d == id) {
            Some(idx) => {
                self.ids.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().copied()
    }

    /// Registered diamonds the hero currently overlaps.
    pub fn touching(&self, ctx: &EngineContext, hero: &Entity) -> Vec<EntityId> {
        self.iter()
            .filter(|&id| {
                ctx.scene
                    .get(id)
                    .is_some_and(|d| !d.is_destroyed() && hero.is_colliding_with(d))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_ids_once() {
        let mut registry = DiamondRegistry::new();
        registry.register(EntityId(3));
        registry.register(EntityId(3));
        registry.register(EntityId(5));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(EntityId(3)));
        assert!(!registry.remove(EntityId(3)));
        assert!(!registry.contains(EntityId(3)));
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![EntityId(5)]);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn touching_uses_bounding_boxes() {
        let mut ctx = EngineContext::default();
        let mut registry = DiamondRegistry::new();
        let near = spawn_diamond(&mut ctx, 2, 1);
        let far = spawn_diamond(&mut ctx, 6, 1);
        registry.register(near);
        registry.register(far);

        let hero = ctx.create_entity().with_grid_position(2, 1, 0.9, 1.0);
        assert_eq!(registry.touching(&ctx, &hero), vec![near]);

        ctx.scene.destroy(near);
        assert!(registry.touching(&ctx, &hero).is_empty());
    }
}
