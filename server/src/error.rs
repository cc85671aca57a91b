use thiserror::Error;

use worldcore_shared::{ContentId, EntityId, ProtocolError};

use crate::persist::PersistenceError;

/// A script hook failed.
///
/// Caught and logged per invocation; sibling hooks and the triggering game
/// logic proceed unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The hook's game-rule precondition was not met
    #[error("Hook precondition failed: {reason}")]
    Precondition { reason: String },

    /// An entity the hook depends on no longer exists
    #[error("Entity {entity:?} no longer exists")]
    MissingEntity { entity: EntityId },

    /// A content table entry the hook depends on is missing
    #[error("Content entry {content_id:?} is not registered")]
    MissingContent { content_id: ContentId },

    /// Downstream store failure surfaced through the hook
    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// A programming-contract violation inside effect execution.
///
/// Logged loudly; the offending cast is force-cancelled and no further
/// phases run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectStateError {
    /// A phase handler was invoked with a casting id that has no in-flight cast
    #[error("No in-flight cast with casting id {casting_id}")]
    StaleCastingId { casting_id: u64 },

    /// A transition would decrease the phase ordinal
    #[error("Cast {casting_id} phase would regress from {current} to {requested}")]
    PhaseRegression {
        casting_id: u64,
        current: u8,
        requested: u8,
    },

    /// A transition was requested out of a terminal state
    #[error("Cast {casting_id} is already terminal and cannot transition")]
    AlreadyTerminal { casting_id: u64 },

    /// A phase handler was invoked with an ordinal the definition never declared
    #[error("Cast {casting_id} has no declared phase {ordinal}")]
    UndeclaredPhase { casting_id: u64, ordinal: u8 },

    /// The effect definition for an in-flight cast disappeared or declares no phases
    #[error("Effect {effect_id:?} has no usable definition")]
    MissingDefinition { effect_id: ContentId },
}

/// Top-level error type surfaced by the world server.
#[derive(Debug, Error)]
pub enum WorldServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Effect state error: {0}")]
    EffectState(#[from] EffectStateError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}
