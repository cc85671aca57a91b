use std::time::Duration;

use worldcore_shared::{ContentId, EntityCommand, EntityId};

use crate::{effect::CastRequest, events::EngineEvent};

/// A world mutation requested by a script hook.
///
/// Hooks never hold `&mut World`; they buffer actions here and the server
/// applies them after dispatch returns. Applied actions may dispatch
/// further hooks, whose actions join the same queue.
pub enum ScriptAction {
    /// Begin a new effect cast (proxy or otherwise)
    StartCast(CastRequest),
    /// Set an entity's health (death processing included when it hits zero)
    SetHealth { entity: EntityId, amount: u32 },
    /// Kill an entity outright
    Kill {
        entity: EntityId,
        killer: Option<EntityId>,
    },
    /// Detach an active effect from an entity
    FinishEffect {
        entity: EntityId,
        effect_id: ContentId,
    },
    /// Replicate a command to sessions subscribed to the entity
    SendCommand {
        entity: EntityId,
        command: EntityCommand,
    },
    /// Apply a quest objective increment
    UpdateObjective {
        entity: EntityId,
        quest_id: ContentId,
        objective_index: usize,
        delta: u32,
    },
    /// Grant a reward through the deferred persistence queue
    GrantReward {
        entity: EntityId,
        reward_table: ContentId,
    },
    /// Schedule a follow-up engine event
    Schedule {
        delay: Duration,
        event: EngineEvent,
    },
}

/// Buffered action list handed to every hook invocation.
#[derive(Default)]
pub struct ScriptContext {
    actions: Vec<ScriptAction>,
}

impl ScriptContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_cast(&mut self, request: CastRequest) {
        self.actions.push(ScriptAction::StartCast(request));
    }

    pub fn set_health(&mut self, entity: EntityId, amount: u32) {
        self.actions.push(ScriptAction::SetHealth { entity, amount });
    }

    pub fn kill(&mut self, entity: EntityId, killer: Option<EntityId>) {
        self.actions.push(ScriptAction::Kill { entity, killer });
    }

    pub fn finish_effect(&mut self, entity: EntityId, effect_id: ContentId) {
        self.actions
            .push(ScriptAction::FinishEffect { entity, effect_id });
    }

    pub fn send_command(&mut self, entity: EntityId, command: EntityCommand) {
        self.actions
            .push(ScriptAction::SendCommand { entity, command });
    }

    pub fn update_objective(
        &mut self,
        entity: EntityId,
        quest_id: ContentId,
        objective_index: usize,
        delta: u32,
    ) {
        self.actions.push(ScriptAction::UpdateObjective {
            entity,
            quest_id,
            objective_index,
            delta,
        });
    }

    pub fn grant_reward(&mut self, entity: EntityId, reward_table: ContentId) {
        self.actions
            .push(ScriptAction::GrantReward {
                entity,
                reward_table,
            });
    }

    pub fn schedule(&mut self, delay: Duration, event: EngineEvent) {
        self.actions.push(ScriptAction::Schedule { delay, event });
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn take_actions(&mut self) -> Vec<ScriptAction> {
        std::mem::take(&mut self.actions)
    }
}
