mod entity;
mod quest;
mod rules;

use std::collections::HashMap;

use worldcore_shared::{ContentId, EntityId, Vec3};

pub use entity::{ActiveEffect, Entity};
pub use quest::{Objective, QuestState, QuestTracker};
pub use rules::{ExplicitTargets, WorldRules};

/// The entity table for one world (or map shard).
///
/// Ids are generated monotonically and never reused while the process runs,
/// so stale handles resolve to `None` instead of aliasing a new entity.
pub struct World {
    entities: HashMap<EntityId, Entity>,
    next_entity_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_entity_id: 1,
        }
    }

    pub fn spawn(&mut self, template_id: ContentId, position: Vec3, max_health: u32) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities
            .insert(id, Entity::new(id, template_id, position, max_health));
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(Entity::is_alive)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
