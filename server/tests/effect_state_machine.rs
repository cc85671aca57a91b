/// Integration tests for the effect execution state machine, driven through
/// the `EffectManager` directly: phase monotonicity, completion-callback
/// cadence, target deduplication, idempotent re-invocation, and
/// cancellation on caster invalidation.
use std::{cell::RefCell, rc::Rc, time::Duration};

use worldcore_server::{
    CastRequest, EffectDefinition, EffectManager, EffectPhaseDef, EffectStateError, EngineEvent,
    EventQueue, ExplicitTargets, HookKind, HookSet, PhaseOp, ScriptRegistry, WorldRules,
};
use worldcore_server::shared::{CastingId, ContentId, EntityId, ServerMessage, Vec3};
use worldcore_server::{ContentScript, EffectCast, ExecuteEvent, ScriptContext, World};
use worldcore_server::ScriptError;

const EFFECT: ContentId = ContentId(6012);

fn two_stage_definition() -> EffectDefinition {
    // observed two-stage shape: an opening phase and a sparse terminal phase 3
    EffectDefinition::new(
        EFFECT,
        vec![
            EffectPhaseDef {
                ordinal: 0,
                delay: Duration::ZERO,
                op: PhaseOp::ApplyEffect,
            },
            EffectPhaseDef {
                ordinal: 3,
                delay: Duration::from_secs(2),
                op: PhaseOp::None,
            },
        ],
    )
}

struct Harness {
    world: World,
    queue: EventQueue<EngineEvent>,
    effects: EffectManager,
    scripts: ScriptRegistry,
    messages: Vec<ServerMessage>,
}

impl Harness {
    fn new(definition: EffectDefinition) -> Self {
        let mut scripts = ScriptRegistry::new();
        scripts.lock();
        let mut effects = EffectManager::new();
        effects.register_effect(definition);
        Self {
            world: World::new(),
            queue: EventQueue::new(),
            effects,
            scripts,
            messages: Vec::new(),
        }
    }

    fn with_script(definition: EffectDefinition, script: std::sync::Arc<dyn ContentScript>) -> Self {
        let mut harness = Self::new(definition);
        let mut scripts = ScriptRegistry::new();
        scripts.register(EFFECT, script);
        scripts.lock();
        harness.scripts = scripts;
        harness
    }

    fn spawn(&mut self, health: u32) -> EntityId {
        self.world.spawn(ContentId(1), Vec3::ZERO, health)
    }

    fn start(&mut self, request: CastRequest) -> CastingId {
        self.effects
            .start_cast(&self.world, &mut self.queue, &mut self.messages, request)
            .expect("cast should start")
    }

    fn pump(&mut self, elapsed: Duration) -> Vec<Result<(), EffectStateError>> {
        let mut results = Vec::new();
        for event in self.queue.advance(elapsed) {
            let EngineEvent::EffectPhase {
                casting_id,
                ordinal,
            } = event
            else {
                continue;
            };
            results.push(
                self.effects
                    .run_phase(
                        casting_id,
                        ordinal,
                        &mut self.world,
                        &ExplicitTargets,
                        &self.scripts,
                        &mut self.queue,
                        &mut self.messages,
                    )
                    .map(|_| ()),
            );
        }
        results
    }
}

#[test]
fn completion_callback_fires_exactly_once() {
    let mut harness = Harness::new(two_stage_definition());
    let caster = harness.spawn(100);
    let target = harness.spawn(100);

    let completions = Rc::new(RefCell::new(0u32));
    let counter = completions.clone();
    let request = CastRequest::new(EFFECT, caster, vec![target]).on_completion(Box::new(
        move |_world, _casting_id| {
            *counter.borrow_mut() += 1;
        },
    ));

    harness.start(request);
    assert_eq!(harness.effects.active_casts(), 1);

    harness.pump(Duration::ZERO); // phase 0
    assert_eq!(*completions.borrow(), 0);
    assert!(harness.world.entity(target).unwrap().has_effect(EFFECT));

    harness.pump(Duration::from_secs(2)); // terminal phase 3
    assert_eq!(*completions.borrow(), 1);
    assert_eq!(harness.effects.active_casts(), 0);
    assert!(harness.queue.is_empty());

    // SpellStart, SpellGo x2, SpellFinish
    assert!(matches!(harness.messages[0], ServerMessage::SpellStart { .. }));
    assert!(matches!(
        harness.messages.last(),
        Some(ServerMessage::SpellFinish { .. })
    ));
}

#[test]
fn cancelled_cast_never_completes() {
    let mut harness = Harness::new(two_stage_definition());
    let caster = harness.spawn(100);
    let target = harness.spawn(100);

    let completions = Rc::new(RefCell::new(0u32));
    let counter = completions.clone();
    let request = CastRequest::new(EFFECT, caster, vec![target]).on_completion(Box::new(
        move |_world, _casting_id| {
            *counter.borrow_mut() += 1;
        },
    ));

    let casting_id = harness.start(request);
    harness.pump(Duration::ZERO); // phase 0

    assert!(harness.effects.cancel(casting_id, &mut harness.queue));
    assert_eq!(harness.effects.active_casts(), 0);
    assert!(harness.queue.is_empty(), "pending phase callback is removed");

    // nothing left to fire, and the completion callback stayed silent
    assert!(harness.pump(Duration::from_secs(5)).is_empty());
    assert_eq!(*completions.borrow(), 0);
}

#[test]
fn caster_death_cancels_quietly() {
    let mut harness = Harness::new(two_stage_definition());
    let caster = harness.spawn(100);
    let target = harness.spawn(100);

    harness.start(CastRequest::new(EFFECT, caster, vec![target]));
    harness.pump(Duration::ZERO);
    assert_eq!(harness.effects.active_casts(), 1);

    harness.world.entity_mut(caster).unwrap().set_health(0);

    let results = harness.pump(Duration::from_secs(2));
    assert_eq!(results, vec![Ok(())], "invalidation is not a contract error");
    assert_eq!(harness.effects.active_casts(), 0);
}

#[test]
fn stale_casting_id_is_a_contract_error() {
    let mut harness = Harness::new(two_stage_definition());
    let caster = harness.spawn(100);

    let result = harness.effects.run_phase(
        CastingId(999),
        0,
        &mut harness.world,
        &ExplicitTargets,
        &harness.scripts,
        &mut harness.queue,
        &mut harness.messages,
    );
    assert_eq!(
        result.map(|_| ()),
        Err(EffectStateError::StaleCastingId { casting_id: 999 })
    );
    let _ = caster;
}

#[test]
fn phase_regression_force_cancels() {
    let definition = EffectDefinition::new(
        EFFECT,
        vec![
            EffectPhaseDef {
                ordinal: 0,
                delay: Duration::ZERO,
                op: PhaseOp::None,
            },
            EffectPhaseDef {
                ordinal: 2,
                delay: Duration::from_secs(1),
                op: PhaseOp::None,
            },
            EffectPhaseDef {
                ordinal: 4,
                delay: Duration::from_secs(1),
                op: PhaseOp::None,
            },
        ],
    );
    let mut harness = Harness::new(definition);
    let caster = harness.spawn(100);
    let casting_id = harness.start(CastRequest::new(EFFECT, caster, vec![caster]));

    harness.pump(Duration::ZERO); // phase 0
    harness.pump(Duration::from_secs(1)); // phase 2

    let result = harness.effects.run_phase(
        casting_id,
        0,
        &mut harness.world,
        &ExplicitTargets,
        &harness.scripts,
        &mut harness.queue,
        &mut harness.messages,
    );
    assert_eq!(
        result.map(|_| ()),
        Err(EffectStateError::PhaseRegression {
            casting_id: casting_id.0,
            current: 2,
            requested: 0,
        })
    );
    assert_eq!(harness.effects.active_casts(), 0, "offending cast is force-cancelled");
    assert!(harness.queue.is_empty(), "its pending phase 4 is removed");
}

struct DuplicatingRules;

impl WorldRules for DuplicatingRules {
    fn can_activate(&self, _world: &World, _entity: EntityId, _activator: EntityId) -> bool {
        true
    }

    fn resolve_targets(&self, _world: &World, cast: &EffectCast, _ordinal: u8) -> Vec<EntityId> {
        // discover every requested target three times over
        let mut raw = Vec::new();
        for _ in 0..3 {
            raw.extend_from_slice(cast.requested_targets());
        }
        raw
    }
}

#[test]
fn raw_target_discoveries_are_deduplicated() {
    let mut harness = Harness::new(two_stage_definition());
    let caster = harness.spawn(100);
    let target_a = harness.spawn(100);
    let target_b = harness.spawn(100);

    let casting_id = harness.start(CastRequest::new(EFFECT, caster, vec![target_a, target_b]));

    for event in harness.queue.advance(Duration::ZERO) {
        let EngineEvent::EffectPhase {
            casting_id: id,
            ordinal,
        } = event
        else {
            continue;
        };
        harness
            .effects
            .run_phase(
                id,
                ordinal,
                &mut harness.world,
                &DuplicatingRules,
                &harness.scripts,
                &mut harness.queue,
                &mut harness.messages,
            )
            .unwrap();
    }

    let cast = harness.effects.cast(casting_id).unwrap();
    assert_eq!(cast.targets(), &[target_a, target_b]);

    let spell_go = harness
        .messages
        .iter()
        .find_map(|message| match message {
            ServerMessage::SpellGo { targets, .. } => Some(targets.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(spell_go, vec![target_a, target_b]);
}

/// Marks the casting id on phase 0 and applies a secondary effect only the
/// first time; the terminal phase discards the marker with the cast.
struct SecondaryEffectScript;

impl ContentScript for SecondaryEffectScript {
    fn capabilities(&self) -> HookSet {
        HookSet::new().with(HookKind::Execute)
    }

    fn on_execute(
        &self,
        _world: &World,
        event: &ExecuteEvent,
        cast: &mut EffectCast,
        ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        if event.phase == 0 && cast.mark("secondary_applied") {
            for &target in &event.targets {
                ctx.set_health(target, 10);
            }
        }
        Ok(())
    }
}

#[test]
fn secondary_effect_is_idempotent_per_casting_id() {
    let mut harness =
        Harness::with_script(two_stage_definition(), std::sync::Arc::new(SecondaryEffectScript));
    let caster = harness.spawn(100);
    let target = harness.spawn(100);

    let casting_id = harness.start(CastRequest::new(EFFECT, caster, vec![target]));

    // first execution of phase 0 applies the secondary effect
    harness.pump(Duration::ZERO);
    let first = harness
        .effects
        .run_phase(
            casting_id,
            0,
            &mut harness.world,
            &ExplicitTargets,
            &harness.scripts,
            &mut harness.queue,
            &mut harness.messages,
        )
        .unwrap();
    assert!(
        first.is_empty(),
        "re-invoking phase 0 for the same casting id applies nothing"
    );

    // terminal phase discards the cast and its auxiliary state...
    harness.pump(Duration::from_secs(2));
    assert_eq!(harness.effects.active_casts(), 0);

    // ...so a fresh casting id applies the secondary effect again
    harness.start(CastRequest::new(EFFECT, caster, vec![target]));
    let mut reapplied = 0;
    for event in harness.queue.advance(Duration::ZERO) {
        let EngineEvent::EffectPhase {
            casting_id: id,
            ordinal,
        } = event
        else {
            continue;
        };
        reapplied += harness
            .effects
            .run_phase(
                id,
                ordinal,
                &mut harness.world,
                &ExplicitTargets,
                &harness.scripts,
                &mut harness.queue,
                &mut harness.messages,
            )
            .unwrap()
            .len();
    }
    assert_eq!(reapplied, 1);
}
