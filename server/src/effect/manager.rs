use std::collections::{HashMap, HashSet};

use log::{debug, error, warn};

use worldcore_shared::{CastingId, ContentId, EntityId, ServerMessage};

use crate::{
    effect::{
        cast::{CastState, CompletionCallback, EffectCast},
        definition::{EffectDefinition, PhaseOp},
    },
    error::EffectStateError,
    events::EngineEvent,
    schedule::EventQueue,
    script::{ExecuteEvent, ScriptAction, ScriptContext, ScriptRegistry},
    world::{World, WorldRules},
};

/// Parameters for initiating one effect cast.
pub struct CastRequest {
    pub effect_id: ContentId,
    pub caster: EntityId,
    pub targets: Vec<EntityId>,
    pub proxy: bool,
    pub completion: Option<CompletionCallback>,
}

impl CastRequest {
    pub fn new(effect_id: ContentId, caster: EntityId, targets: Vec<EntityId>) -> Self {
        Self {
            effect_id,
            caster,
            targets,
            proxy: false,
            completion: None,
        }
    }

    /// Marks this cast as initiated by handler logic, not a player action.
    pub fn proxy(mut self) -> Self {
        self.proxy = true;
        self
    }

    pub fn on_completion(mut self, callback: CompletionCallback) -> Self {
        self.completion = Some(callback);
        self
    }
}

/// Owns every in-flight [`EffectCast`] for one world and drives their
/// phase transitions off the scheduled event queue.
pub struct EffectManager {
    definitions: HashMap<ContentId, EffectDefinition>,
    casts: HashMap<CastingId, EffectCast>,
    next_casting_id: u64,
}

impl EffectManager {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            casts: HashMap::new(),
            next_casting_id: 1,
        }
    }

    /// Registers a content-table effect definition. Startup-time only.
    pub fn register_effect(&mut self, definition: EffectDefinition) {
        let effect_id = definition.effect_id;
        if self.definitions.insert(effect_id, definition).is_some() {
            panic!("Effect {effect_id:?} registered twice!");
        }
    }

    pub fn definition(&self, effect_id: ContentId) -> Option<&EffectDefinition> {
        self.definitions.get(&effect_id)
    }

    pub fn cast(&self, casting_id: CastingId) -> Option<&EffectCast> {
        self.casts.get(&casting_id)
    }

    pub fn cast_mut(&mut self, casting_id: CastingId) -> Option<&mut EffectCast> {
        self.casts.get_mut(&casting_id)
    }

    pub fn active_casts(&self) -> usize {
        self.casts.len()
    }

    pub fn casts(&self) -> impl Iterator<Item = &EffectCast> {
        self.casts.values()
    }

    /// Validates the request and initiates a cast: emits `SpellStart` and
    /// schedules the first phase. An invalid caster or unknown effect
    /// degrades to a logged no-op.
    pub fn start_cast(
        &mut self,
        world: &World,
        queue: &mut EventQueue<EngineEvent>,
        messages: &mut Vec<ServerMessage>,
        request: CastRequest,
    ) -> Option<CastingId> {
        let Some(definition) = self.definitions.get(&request.effect_id) else {
            warn!("cast of unregistered effect {:?} ignored", request.effect_id);
            return None;
        };
        let Some(first_phase) = definition.phase_at(0) else {
            warn!("effect {:?} declares no phases; cast ignored", request.effect_id);
            return None;
        };
        if !world.is_alive(request.caster) {
            debug!(
                "cast of {:?} ignored: caster {:?} is not alive",
                request.effect_id, request.caster
            );
            return None;
        }

        let casting_id = CastingId(self.next_casting_id);
        self.next_casting_id += 1;

        messages.push(ServerMessage::SpellStart {
            casting_id,
            caster: request.caster,
            spell_id: request.effect_id,
        });

        let mut cast = EffectCast::new(
            casting_id,
            request.effect_id,
            request.caster,
            request.targets,
            request.proxy,
            request.completion,
        );
        cast.pending_phase = Some(queue.schedule(
            first_phase.delay,
            EngineEvent::EffectPhase {
                casting_id,
                ordinal: first_phase.ordinal,
            },
        ));
        self.casts.insert(casting_id, cast);

        Some(casting_id)
    }

    /// Runs one phase of an in-flight cast:
    /// `Resolving(ordinal) → Executing(ordinal)`, then either schedules the
    /// next phase or completes the cast.
    ///
    /// Contract violations are logged loudly, force-cancel the cast, and
    /// surface as errors. Caster/target invalidation is not an error: the
    /// cast is quietly cancelled and no further phases run.
    pub fn run_phase(
        &mut self,
        casting_id: CastingId,
        ordinal: u8,
        world: &mut World,
        rules: &dyn WorldRules,
        scripts: &ScriptRegistry,
        queue: &mut EventQueue<EngineEvent>,
        messages: &mut Vec<ServerMessage>,
    ) -> Result<Vec<ScriptAction>, EffectStateError> {
        match self.try_run_phase(casting_id, ordinal, world, rules, scripts, queue, messages) {
            Ok(actions) => Ok(actions),
            Err(error) => {
                error!("effect contract violation: {error}; force-cancelling cast");
                self.cancel(casting_id, queue);
                Err(error)
            }
        }
    }

    fn try_run_phase(
        &mut self,
        casting_id: CastingId,
        ordinal: u8,
        world: &mut World,
        rules: &dyn WorldRules,
        scripts: &ScriptRegistry,
        queue: &mut EventQueue<EngineEvent>,
        messages: &mut Vec<ServerMessage>,
    ) -> Result<Vec<ScriptAction>, EffectStateError> {
        let Some(cast) = self.casts.get_mut(&casting_id) else {
            return Err(EffectStateError::StaleCastingId {
                casting_id: casting_id.0,
            });
        };

        // a phase already executed may be re-invoked; side effects below are
        // guarded per casting id, no follow-up phase is rescheduled, and any
        // genuinely pending callback stays tracked
        let repeat =
            matches!(cast.state(), CastState::Executing { phase } if phase >= ordinal);
        if !repeat {
            cast.pending_phase = None;
        }

        let effect_id = cast.effect_id();
        let Some(definition) = self.definitions.get(&effect_id).cloned() else {
            return Err(EffectStateError::MissingDefinition { effect_id });
        };
        let Some(phase_position) = definition
            .phases
            .iter()
            .position(|phase| phase.ordinal == ordinal)
        else {
            return Err(EffectStateError::UndeclaredPhase {
                casting_id: casting_id.0,
                ordinal,
            });
        };
        let phase = definition.phases[phase_position];

        if !world.is_alive(cast.caster()) {
            debug!(
                "cast {casting_id:?} cancelled: caster {:?} is gone",
                cast.caster()
            );
            self.cancel(casting_id, queue);
            return Ok(Vec::new());
        }

        cast.transition(CastState::Resolving { phase: ordinal })?;

        // targets may be discovered multiple times within one phase; each
        // identifier reaches effect logic at most once
        let raw_targets = rules.resolve_targets(world, cast, ordinal);
        let mut seen = HashSet::new();
        let targets: Vec<EntityId> = raw_targets
            .into_iter()
            .filter(|&id| world.contains(id))
            .filter(|&id| seen.insert(id))
            .collect();

        if targets.is_empty() {
            debug!("cast {casting_id:?} cancelled: no valid targets for phase {ordinal}");
            self.cancel(casting_id, queue);
            return Ok(Vec::new());
        }

        cast.set_targets(targets.clone());
        cast.transition(CastState::Executing { phase: ordinal })?;

        messages.push(ServerMessage::SpellGo {
            casting_id,
            targets: targets.clone(),
        });

        let mut actions = Vec::new();
        if cast.mark(&format!("op:{ordinal}")) {
            apply_phase_op(world, effect_id, casting_id, phase.op, &targets, &mut actions);
        }

        let event = ExecuteEvent {
            casting_id,
            effect_id,
            caster: cast.caster(),
            phase: ordinal,
            targets,
        };
        let mut ctx = ScriptContext::new();
        scripts.dispatch_execute(world, effect_id, &event, cast, &mut ctx);
        actions.extend(ctx.take_actions());

        if repeat {
            return Ok(actions);
        }

        let terminal = phase_position + 1 == definition.phases.len();
        if terminal {
            // auxiliary state is discarded before the completion callback,
            // then the cast itself is destroyed
            cast.clear_aux();
            cast.transition(CastState::Completed)?;
            messages.push(ServerMessage::SpellFinish { casting_id });

            let mut finished = self
                .casts
                .remove(&casting_id)
                .expect("cast present above");
            if let Some(completion) = finished.completion.take() {
                completion(world, casting_id);
            }
        } else {
            let next = definition.phases[phase_position + 1];
            cast.pending_phase = Some(queue.schedule(
                next.delay,
                EngineEvent::EffectPhase {
                    casting_id,
                    ordinal: next.ordinal,
                },
            ));
        }

        Ok(actions)
    }

    /// Cancels an in-flight cast: pending phases are removed and the
    /// completion callback never fires. Cancellation is cooperative — a
    /// handler already executing is never interrupted.
    pub fn cancel(&mut self, casting_id: CastingId, queue: &mut EventQueue<EngineEvent>) -> bool {
        let Some(mut cast) = self.casts.remove(&casting_id) else {
            return false;
        };
        if let Some(pending) = cast.pending_phase.take() {
            queue.cancel(pending);
        }
        let _ = cast.transition(CastState::Cancelled);
        true
    }
}

impl Default for EffectManager {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_phase_op(
    world: &mut World,
    effect_id: ContentId,
    casting_id: CastingId,
    op: PhaseOp,
    targets: &[EntityId],
    actions: &mut Vec<ScriptAction>,
) {
    match op {
        PhaseOp::None => {}
        PhaseOp::ApplyEffect => {
            for &target in targets {
                if let Some(entity) = world.entity_mut(target) {
                    entity.add_effect(effect_id, casting_id);
                }
            }
        }
        PhaseOp::RemoveEffect => {
            for &target in targets {
                if let Some(entity) = world.entity_mut(target) {
                    entity.remove_effect(effect_id);
                }
            }
        }
        PhaseOp::DealDamage { amount } => {
            for &target in targets {
                if let Some(entity) = world.entity_mut(target) {
                    if entity.apply_damage(amount) {
                        // freshly dead: death processing happens after this
                        // phase finishes, alongside script actions
                        actions.push(ScriptAction::Kill {
                            entity: target,
                            killer: None,
                        });
                    }
                }
            }
        }
    }
}
