use crate::{
    effect::EffectCast,
    error::ScriptError,
    script::{
        context::ScriptContext,
        events::{
            ActivateEvent, CreateEvent, DeathEvent, EnterRangeEvent, ExecuteEvent,
            ObjectiveUpdateEvent, QuestStateEvent,
        },
        hooks::HookSet,
    },
    world::World,
};

/// Behavior hooks bound to one or more content ids.
///
/// Every hook defaults to a no-op; a concrete script implements only what
/// it needs and names those hooks in [`ContentScript::capabilities`] so
/// dispatch can skip it everywhere else. Hooks read the world and buffer
/// mutations through the [`ScriptContext`]; a returned error is logged and
/// isolated to that one invocation.
///
/// Instances are registered once at startup and shared process-wide, so a
/// script holds no mutable state of its own — per-cast values belong in the
/// cast's auxiliary map, per-entity values in the world.
pub trait ContentScript: Send + Sync {
    /// Hook kinds this script overrides.
    fn capabilities(&self) -> HookSet;

    fn on_create(
        &self,
        _world: &World,
        _event: &CreateEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_activate_success(
        &self,
        _world: &World,
        _event: &ActivateEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_activate_fail(
        &self,
        _world: &World,
        _event: &ActivateEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_enter_range(
        &self,
        _world: &World,
        _event: &EnterRangeEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_death_reward(
        &self,
        _world: &World,
        _event: &DeathEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_objective_update(
        &self,
        _world: &World,
        _event: &ObjectiveUpdateEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    fn on_quest_state_change(
        &self,
        _world: &World,
        _event: &QuestStateEvent,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Invoked for each executing phase of a cast whose effect id this
    /// script is bound to. The cast's auxiliary map is available for
    /// phase-local state keyed by the casting id.
    fn on_execute(
        &self,
        _world: &World,
        _event: &ExecuteEvent,
        _cast: &mut EffectCast,
        _ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        Ok(())
    }
}
