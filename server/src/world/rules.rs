use worldcore_shared::EntityId;

use crate::{effect::EffectCast, world::World};

/// World-query collaborator: game rules and spatial queries the engine
/// consumes but does not implement.
///
/// The engine treats these as opaque — geometry, pathing, and rule tables
/// live with the embedding game, not here.
pub trait WorldRules {
    /// Game-rule gate for an activation attempt against an interactable
    /// entity (prerequisites, faction, range).
    fn can_activate(&self, world: &World, entity: EntityId, activator: EntityId) -> bool;

    /// Raw target query for one phase of an in-flight cast. May return the
    /// same entity several times; the effect state machine deduplicates.
    fn resolve_targets(&self, world: &World, cast: &EffectCast, ordinal: u8) -> Vec<EntityId>;
}

/// Default rules: activation always allowed, phases hit the targets named
/// in the cast request.
pub struct ExplicitTargets;

impl WorldRules for ExplicitTargets {
    fn can_activate(&self, _world: &World, _entity: EntityId, _activator: EntityId) -> bool {
        true
    }

    fn resolve_targets(&self, world: &World, cast: &EffectCast, _ordinal: u8) -> Vec<EntityId> {
        cast.requested_targets()
            .iter()
            .copied()
            .filter(|&id| world.contains(id))
            .collect()
    }
}
