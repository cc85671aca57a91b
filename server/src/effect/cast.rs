use std::collections::HashMap;

use worldcore_shared::{CastingId, ContentId, EntityId};

use crate::{error::EffectStateError, schedule::CallbackId, world::World};

/// Where an in-flight cast sits in its lifecycle.
///
/// `Initiated → Resolving(p) → Executing(p) → … → Completed`, with
/// `Cancelled` reachable from any non-terminal state. Phase ordinals only
/// increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastState {
    Initiated,
    Resolving { phase: u8 },
    Executing { phase: u8 },
    Completed,
    Cancelled,
}

impl CastState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn phase(&self) -> Option<u8> {
        match self {
            Self::Resolving { phase } | Self::Executing { phase } => Some(*phase),
            _ => None,
        }
    }
}

/// Callback fired exactly once when a cast reaches its terminal phase.
pub type CompletionCallback = Box<dyn FnOnce(&mut World, CastingId)>;

/// One live effect execution.
///
/// The caster and targets are entity-table handles, never owning
/// references — a cast must not keep its caster alive, and entity
/// destruction must not require walking in-flight casts.
pub struct EffectCast {
    casting_id: CastingId,
    effect_id: ContentId,
    caster: EntityId,
    proxy: bool,
    state: CastState,
    requested_targets: Vec<EntityId>,
    targets: Vec<EntityId>,
    aux: HashMap<String, i64>,
    pub(crate) completion: Option<CompletionCallback>,
    pub(crate) pending_phase: Option<CallbackId>,
}

impl EffectCast {
    pub(crate) fn new(
        casting_id: CastingId,
        effect_id: ContentId,
        caster: EntityId,
        requested_targets: Vec<EntityId>,
        proxy: bool,
        completion: Option<CompletionCallback>,
    ) -> Self {
        Self {
            casting_id,
            effect_id,
            caster,
            proxy,
            state: CastState::Initiated,
            requested_targets,
            targets: Vec::new(),
            aux: HashMap::new(),
            completion,
            pending_phase: None,
        }
    }

    pub fn casting_id(&self) -> CastingId {
        self.casting_id
    }

    pub fn effect_id(&self) -> ContentId {
        self.effect_id
    }

    pub fn caster(&self) -> EntityId {
        self.caster
    }

    /// True for casts initiated by handler logic rather than a player action.
    pub fn is_proxy(&self) -> bool {
        self.proxy
    }

    pub fn state(&self) -> CastState {
        self.state
    }

    pub fn requested_targets(&self) -> &[EntityId] {
        &self.requested_targets
    }

    /// Unique target set resolved for the current phase.
    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    pub(crate) fn set_targets(&mut self, targets: Vec<EntityId>) {
        self.targets = targets;
    }

    /// Validates and applies a state transition.
    pub(crate) fn transition(&mut self, next: CastState) -> Result<(), EffectStateError> {
        if self.state.is_terminal() {
            return Err(EffectStateError::AlreadyTerminal {
                casting_id: self.casting_id.0,
            });
        }
        if let (Some(current), Some(requested)) = (self.state.phase(), next.phase()) {
            if requested < current {
                return Err(EffectStateError::PhaseRegression {
                    casting_id: self.casting_id.0,
                    current,
                    requested,
                });
            }
        }
        self.state = next;
        Ok(())
    }

    // Per-cast auxiliary state, keyed by this casting id for as long as the
    // cast lives. Scripts use it to stash phase-local values; the terminal
    // phase discards it.

    /// Records a marker. Returns true the first time, false if it was
    /// already set — the double-application guard for secondary effects.
    pub fn mark(&mut self, key: &str) -> bool {
        if self.aux.contains_key(key) {
            return false;
        }
        self.aux.insert(key.to_string(), 1);
        true
    }

    pub fn is_marked(&self, key: &str) -> bool {
        self.aux.contains_key(key)
    }

    pub fn set_aux(&mut self, key: &str, value: i64) {
        self.aux.insert(key.to_string(), value);
    }

    pub fn aux(&self, key: &str) -> Option<i64> {
        self.aux.get(key).copied()
    }

    pub(crate) fn clear_aux(&mut self) {
        self.aux.clear();
    }
}
