use std::collections::HashMap;

use worldcore_shared::{CastingId, ContentId, EntityId, Vec3};

use crate::world::quest::QuestTracker;

/// One effect currently attached to an entity, with the cast that applied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub effect_id: ContentId,
    pub casting_id: CastingId,
}

/// A live world entity: creature, player, or interactable object.
pub struct Entity {
    id: EntityId,
    template_id: ContentId,
    pub position: Vec3,
    health: u32,
    max_health: u32,
    alive: bool,
    effects: Vec<ActiveEffect>,
    quests: HashMap<ContentId, QuestTracker>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        template_id: ContentId,
        position: Vec3,
        max_health: u32,
    ) -> Self {
        Self {
            id,
            template_id,
            position,
            health: max_health,
            max_health,
            alive: true,
            effects: Vec::new(),
            quests: HashMap::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn template_id(&self) -> ContentId {
        self.template_id
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Sets health, clamped to max. Returns true if this drop reached zero
    /// and flipped the entity to dead; death hooks are the caller's job.
    pub fn set_health(&mut self, amount: u32) -> bool {
        self.health = amount.min(self.max_health);
        if self.health == 0 && self.alive {
            self.alive = false;
            return true;
        }
        false
    }

    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.set_health(self.health.saturating_sub(amount))
    }

    // Effects

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn has_effect(&self, effect_id: ContentId) -> bool {
        self.effects.iter().any(|e| e.effect_id == effect_id)
    }

    /// Attaches an effect unless this exact cast already applied it.
    pub fn add_effect(&mut self, effect_id: ContentId, casting_id: CastingId) -> bool {
        if self
            .effects
            .iter()
            .any(|e| e.effect_id == effect_id && e.casting_id == casting_id)
        {
            return false;
        }
        self.effects.push(ActiveEffect {
            effect_id,
            casting_id,
        });
        true
    }

    pub fn remove_effect(&mut self, effect_id: ContentId) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|e| e.effect_id == effect_id)?;
        Some(self.effects.remove(index))
    }

    // Quests

    pub fn quest(&self, quest_id: ContentId) -> Option<&QuestTracker> {
        self.quests.get(&quest_id)
    }

    pub fn quest_mut(&mut self, quest_id: ContentId) -> Option<&mut QuestTracker> {
        self.quests.get_mut(&quest_id)
    }

    pub(crate) fn insert_quest(&mut self, tracker: QuestTracker) {
        self.quests.insert(tracker.quest_id(), tracker);
    }

    pub fn quests(&self) -> impl Iterator<Item = &QuestTracker> {
        self.quests.values()
    }
}
