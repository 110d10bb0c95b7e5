use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::level::GameLevel;

/// Simple entity storage using a flat Vec.
/// Designed for small-to-medium entity counts (hundreds, not millions).
///
/// Destruction is deferred: `destroy` flags the entity and queues its id, and
/// `flush_destroyed` removes every queued entity once per frame, so entities are
/// never removed while the scene is being iterated.
#[derive(Debug)]
pub struct Scene {
    entities: Vec<Entity>,
    pending_destroy: Vec<EntityId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a scene with a specific entity capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            pending_destroy: Vec::new(),
        }
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        log::debug!("spawn {:?} ({})", id, entity.tag);
        self.entities.push(entity);
        id
    }

    /// Remove an entity by ID immediately. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        log::debug!("despawn {:?}", id);
        Some(self.entities.remove(idx))
    }

    /// Flag an entity destroyed and queue it for removal.
    /// Returns false if it is unknown or already destroyed.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let destroyed = self.get_mut(id).is_some_and(|e| e.destroy());
        if destroyed {
            self.pending_destroy.push(id);
        }
        destroyed
    }

    /// Remove every destroyed entity. Returns their ids in destruction order.
    pub fn flush_destroyed(&mut self) -> Vec<EntityId> {
        // Entities may also be flagged directly through `Entity::destroy`.
        for entity in &self.entities {
            if entity.is_destroyed() && !self.pending_destroy.contains(&entity.id) {
                self.pending_destroy.push(entity.id);
            }
        }
        self.entities.retain(|e| !e.is_destroyed());
        std::mem::take(&mut self.pending_destroy)
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Iterate over all entities, destroyed-but-unflushed ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Iterate over entities that are not destroyed.
    pub fn alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.is_destroyed())
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    /// Find the first entity with the given tag (mutable).
    pub fn find_by_tag_mut(&mut self, tag: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.tag == tag)
    }

    /// Find all entities with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.tag == tag).collect()
    }

    // -- Per-frame passes --

    /// Tick every entity's timers.
    pub fn update_all(&mut self, dt: f32) {
        for entity in self.entities.iter_mut().filter(|e| !e.is_destroyed()) {
            entity.update(dt);
        }
    }

    /// Run one fixed step for every live entity.
    pub fn fixed_update_all<L: GameLevel + ?Sized>(&mut self, level: &L) {
        for entity in self.entities.iter_mut().filter(|e| !e.is_destroyed()) {
            entity.fixed_update(level);
        }
    }

    /// Push the scheduler's interpolation ratio into every entity.
    pub fn set_progression_ratio(&mut self, ratio: f32) {
        for entity in &mut self.entities {
            entity.set_progression_ratio(ratio);
        }
    }

    pub fn post_update_all(&mut self, dt: f32) {
        for entity in self.entities.iter_mut().filter(|e| !e.is_destroyed()) {
            entity.post_update(dt);
        }
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Clear all entities, pending destruction included.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_destroy.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::level::OpenLevel;

    fn entity(id: u32) -> Entity {
        Entity::new(EntityId(id), 8.0)
    }

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        let id = scene.spawn(entity(1).with_grid_position(1, 2, 0.5, 0.5));
        let e = scene.get(id).unwrap();
        assert_eq!(e.attach_x(), 12.0);
        assert_eq!(e.attach_y(), 20.0);
    }

    #[test]
    fn despawn_removes_entity() {
        let mut scene = Scene::new();
        let id = scene.spawn(entity(1));
        assert_eq!(scene.len(), 1);
        assert!(scene.despawn(id).is_some());
        assert_eq!(scene.len(), 0);
        assert!(scene.despawn(id).is_none());
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        scene.spawn(entity(1).with_tag("hero"));
        scene.spawn(entity(2).with_tag("diamond"));
        scene.spawn(entity(3).with_tag("diamond"));
        assert_eq!(scene.find_by_tag("hero").unwrap().id, EntityId(1));
        assert_eq!(scene.find_all_by_tag("diamond").len(), 2);
    }

    #[test]
    fn destroy_defers_removal_until_flush() {
        let mut scene = Scene::new();
        scene.spawn(entity(1));
        scene.spawn(entity(2));

        assert!(scene.destroy(EntityId(1)));
        assert!(!scene.destroy(EntityId(1)), "second destroy is a no-op");
        assert!(!scene.destroy(EntityId(9)));
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.alive().count(), 1);

        assert_eq!(scene.flush_destroyed(), vec![EntityId(1)]);
        assert_eq!(scene.len(), 1);
        assert!(scene.flush_destroyed().is_empty());
    }

    #[test]
    fn flush_picks_up_entities_destroyed_directly() {
        let mut scene = Scene::new();
        scene.spawn(entity(1));
        scene.spawn(entity(2));
        scene.get_mut(EntityId(2)).unwrap().destroy();
        scene.destroy(EntityId(1));

        assert_eq!(scene.flush_destroyed(), vec![EntityId(1), EntityId(2)]);
        assert!(scene.is_empty());
    }

    #[test]
    fn destroyed_entities_skip_fixed_steps() {
        let mut scene = Scene::new();
        let mut moving = entity(1).with_grid_position(0, 0, 0.5, 0.5);
        moving.motion.velocity_x = 0.2;
        scene.spawn(moving);
        scene.destroy(EntityId(1));

        scene.fixed_update_all(&OpenLevel { grid_size: 8 });
        assert_eq!(scene.get(EntityId(1)).unwrap().motion.xr, 0.5);
    }

    #[test]
    fn progression_ratio_reaches_every_entity() {
        let mut scene = Scene::new();
        scene.spawn(entity(1));
        scene.spawn(entity(2));
        scene.set_progression_ratio(0.25);
        assert!(scene.iter().all(|e| e.motion.progression_ratio == 0.25));
    }
}
