use worldcore_shared::{CastingId, EntityId};

/// Payloads carried by the world's scheduled event queue.
///
/// The queue stores these as plain data rather than captured closures so
/// pending work is inspectable and replay stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Advance an in-flight cast to the given phase ordinal
    EffectPhase {
        casting_id: CastingId,
        ordinal: u8,
    },
    /// Periodic per-entity pulse (health regeneration)
    EntityPulse { entity: EntityId },
    /// Remove a dead entity's corpse from the world
    CorpseDespawn { entity: EntityId },
}
