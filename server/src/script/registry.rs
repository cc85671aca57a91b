use std::{collections::HashMap, sync::Arc};

use log::warn;

use worldcore_shared::ContentId;

use crate::{
    effect::EffectCast,
    script::{
        context::ScriptContext,
        events::{
            ActivateEvent, CreateEvent, DeathEvent, EnterRangeEvent, ExecuteEvent,
            ObjectiveUpdateEvent, QuestStateEvent,
        },
        hooks::HookKind,
        script::ContentScript,
    },
    world::World,
};

/// Build-time table binding content ids to ordered hook implementations.
///
/// Populated by explicit registration at startup, then locked: read-only
/// for the rest of the process, so dispatch needs no synchronization.
/// Several bindings may share one id (a quest step and its companion NPC
/// script), and one instance may be bound under several ids; within an id,
/// hooks fire in registration order.
pub struct ScriptRegistry {
    bindings: HashMap<ContentId, Vec<Arc<dyn ContentScript>>>,
    locked: bool,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            locked: false,
        }
    }

    pub fn register(&mut self, content_id: ContentId, script: Arc<dyn ContentScript>) {
        self.check_lock();
        if script.capabilities().is_empty() {
            warn!("script bound to content id {content_id:?} overrides no hooks");
        }
        self.bindings.entry(content_id).or_default().push(script);
    }

    /// Binds one instance under several related content ids.
    pub fn register_many(&mut self, content_ids: &[ContentId], script: Arc<dyn ContentScript>) {
        for &content_id in content_ids {
            self.register(content_id, script.clone());
        }
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn check_lock(&self) {
        if self.locked {
            panic!("ScriptRegistry already locked!");
        }
    }

    pub fn binding_count(&self, content_id: ContentId) -> usize {
        self.bindings.get(&content_id).map_or(0, Vec::len)
    }

    /// Ordered hooks bound to `content_id` that declare `kind`; instances
    /// with only default implementations are skipped.
    fn hooks(
        &self,
        content_id: ContentId,
        kind: HookKind,
    ) -> impl Iterator<Item = &Arc<dyn ContentScript>> {
        self.bindings
            .get(&content_id)
            .into_iter()
            .flatten()
            .filter(move |script| script.capabilities().contains(kind))
    }

    pub fn has_hook(&self, content_id: ContentId, kind: HookKind) -> bool {
        self.hooks(content_id, kind).next().is_some()
    }
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Dispatch: one entry point per event kind. A failing hook is logged and
// skipped; sibling hooks and the triggering game logic proceed.
macro_rules! dispatch {
    ($name:ident, $kind:expr, $method:ident, $event_type:ty) => {
        pub fn $name(
            &self,
            world: &World,
            content_id: ContentId,
            event: &$event_type,
            ctx: &mut ScriptContext,
        ) {
            for script in self.hooks(content_id, $kind) {
                if let Err(error) = script.$method(world, event, ctx) {
                    warn!(
                        "script hook {:?} for content id {content_id:?} failed: {error}",
                        $kind
                    );
                }
            }
        }
    };
}

impl ScriptRegistry {
    dispatch!(dispatch_create, HookKind::Create, on_create, CreateEvent);
    dispatch!(
        dispatch_activate_success,
        HookKind::ActivateSuccess,
        on_activate_success,
        ActivateEvent
    );
    dispatch!(
        dispatch_activate_fail,
        HookKind::ActivateFail,
        on_activate_fail,
        ActivateEvent
    );
    dispatch!(
        dispatch_enter_range,
        HookKind::EnterRange,
        on_enter_range,
        EnterRangeEvent
    );
    dispatch!(
        dispatch_death_reward,
        HookKind::DeathReward,
        on_death_reward,
        DeathEvent
    );
    dispatch!(
        dispatch_objective_update,
        HookKind::ObjectiveUpdate,
        on_objective_update,
        ObjectiveUpdateEvent
    );
    dispatch!(
        dispatch_quest_state_change,
        HookKind::QuestStateChange,
        on_quest_state_change,
        QuestStateEvent
    );

    /// `OnExecute` carries the in-flight cast for auxiliary-map access, so
    /// it cannot share the macro above.
    pub fn dispatch_execute(
        &self,
        world: &World,
        content_id: ContentId,
        event: &ExecuteEvent,
        cast: &mut EffectCast,
        ctx: &mut ScriptContext,
    ) {
        for script in self.hooks(content_id, HookKind::Execute) {
            if let Err(error) = script.on_execute(world, event, cast, ctx) {
                warn!(
                    "script hook {:?} for content id {content_id:?} failed: {error}",
                    HookKind::Execute
                );
            }
        }
    }
}
