//! # Worldcore Server
//! World simulation core: a per-world scheduled event queue, the phased
//! effect execution state machine, and content-keyed script dispatch, with
//! entity state changes synced to connected sessions over the worldcore
//! wire protocol.
//!
//! Everything for one world advances on a single logical tick thread; the
//! per-session outbound packet queue is the only synchronization boundary.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use worldcore_shared::{
        read_commands, write_commands, BitReader, BitWrite, BitWriter, CastingId, CommandKinds,
        ConstBitLength, ContentId, EntityCommand, EntityId, EntityState, PacketType, Protocol,
        ProtocolError, Serde, SerdeErr, ServerMessage, Tick, UnsignedInteger, Vec3,
    };
}

mod effect;
mod error;
mod events;
mod persist;
mod schedule;
mod script;
mod server;
mod session;
mod world;

pub use effect::{
    CastRequest, CastState, CompletionCallback, EffectCast, EffectDefinition, EffectManager,
    EffectPhaseDef, PhaseOp,
};
pub use error::{EffectStateError, ScriptError, WorldServerError};
pub use events::EngineEvent;
pub use persist::{DeferredTask, DeferredTaskQueue, PersistenceError, RealmStore, TaskOutcome};
pub use schedule::{CallbackId, EventQueue};
pub use script::{
    ActivateEvent, ContentScript, CreateEvent, DeathEvent, EnterRangeEvent, ExecuteEvent, HookKind,
    HookSet, ObjectiveUpdateEvent, QuestStateEvent, ScriptAction, ScriptContext, ScriptRegistry,
};
pub use server::{ServerConfig, WorldServer};
pub use session::{Session, SessionKey};
pub use world::{
    ActiveEffect, Entity, ExplicitTargets, Objective, QuestState, QuestTracker, World, WorldRules,
};
