/// End-to-end trap interaction scenario:
/// - an activator without the penalty effect fails the activation; the
///   trap's fail hook launches a proxy cast that lands the penalty effect
///   on the activator;
/// - an activator already carrying the penalty effect succeeds; the success
///   hook finishes the existing effect and drops the trap's health to zero.
use std::{sync::Arc, time::Duration};

use worldcore_server::shared::{
    BitReader, ContentId, EntityId, PacketType, Protocol, ServerMessage, Vec3,
};
use worldcore_server::{
    ActivateEvent, CastRequest, ContentScript, EffectDefinition, HookKind, HookSet,
    PersistenceError, QuestState, RealmStore, ScriptContext, ScriptError, ScriptRegistry,
    ServerConfig, World, WorldRules, WorldServer,
};

const TRAP_TEMPLATE: ContentId = ContentId(7001);
const PLAYER_TEMPLATE: ContentId = ContentId(100);
const PENALTY_EFFECT: ContentId = ContentId(6001);

struct NullStore;

impl RealmStore for NullStore {
    fn grant_reward(
        &mut self,
        _entity: EntityId,
        _reward_table: ContentId,
        _roll: u32,
    ) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn save_quest_state(
        &mut self,
        _entity: EntityId,
        _quest_id: ContentId,
        _state: QuestState,
    ) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Activation succeeds only for activators already carrying the penalty.
struct PenaltyGate;

impl WorldRules for PenaltyGate {
    fn can_activate(&self, world: &World, _entity: EntityId, activator: EntityId) -> bool {
        world
            .entity(activator)
            .is_some_and(|e| e.has_effect(PENALTY_EFFECT))
    }

    fn resolve_targets(
        &self,
        world: &World,
        cast: &worldcore_server::EffectCast,
        _ordinal: u8,
    ) -> Vec<EntityId> {
        cast.requested_targets()
            .iter()
            .copied()
            .filter(|&id| world.contains(id))
            .collect()
    }
}

struct TrapScript;

impl ContentScript for TrapScript {
    fn capabilities(&self) -> HookSet {
        HookSet::new()
            .with(HookKind::ActivateSuccess)
            .with(HookKind::ActivateFail)
    }

    fn on_activate_fail(
        &self,
        _world: &World,
        event: &ActivateEvent,
        ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        // the trap, not the player, is the caster of the penalty
        ctx.start_cast(
            CastRequest::new(PENALTY_EFFECT, event.entity, vec![event.activator]).proxy(),
        );
        Ok(())
    }

    fn on_activate_success(
        &self,
        _world: &World,
        event: &ActivateEvent,
        ctx: &mut ScriptContext,
    ) -> Result<(), ScriptError> {
        ctx.finish_effect(event.activator, PENALTY_EFFECT);
        ctx.set_health(event.entity, 0);
        Ok(())
    }
}

fn build_server() -> WorldServer {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut scripts = ScriptRegistry::new();
    scripts.register(TRAP_TEMPLATE, Arc::new(TrapScript));
    scripts.lock();

    let mut server = WorldServer::new(
        Protocol::builder().build(),
        ServerConfig::default(),
        Arc::new(scripts),
        Box::new(PenaltyGate),
    );
    server.register_effect(EffectDefinition::instant_aura(PENALTY_EFFECT));
    server
}

#[test]
fn failed_activation_applies_penalty_through_proxy_cast() {
    let mut server = build_server();
    let trap = server.spawn_entity(TRAP_TEMPLATE, Vec3::ZERO, 100);
    let player = server.spawn_entity(PLAYER_TEMPLATE, Vec3::ZERO, 50);

    server.activate_entity(trap, player);

    // the fail hook launched a proxy cast, caster distinct from the player
    let cast = server.effects().casts().next().expect("one in-flight cast");
    assert!(cast.is_proxy());
    assert_eq!(cast.caster(), trap);

    // the instant phase fires on the next tick and attaches the effect
    server.advance(Duration::ZERO, &mut NullStore);
    assert!(server
        .world()
        .entity(player)
        .unwrap()
        .has_effect(PENALTY_EFFECT));
    assert_eq!(server.effects().active_casts(), 0);
}

#[test]
fn successful_activation_finishes_effect_and_destroys_trap() {
    let mut server = build_server();
    let trap = server.spawn_entity(TRAP_TEMPLATE, Vec3::ZERO, 100);
    let player = server.spawn_entity(PLAYER_TEMPLATE, Vec3::ZERO, 50);

    // first attempt fails and applies the penalty
    server.activate_entity(trap, player);
    server.advance(Duration::ZERO, &mut NullStore);
    assert!(server
        .world()
        .entity(player)
        .unwrap()
        .has_effect(PENALTY_EFFECT));

    // second attempt succeeds: effect finished, trap drained
    server.activate_entity(trap, player);
    let player_entity = server.world().entity(player).unwrap();
    assert!(!player_entity.has_effect(PENALTY_EFFECT));

    let trap_entity = server.world().entity(trap).unwrap();
    assert_eq!(trap_entity.health(), 0);
    assert!(!trap_entity.is_alive());
}

#[test]
fn activation_outcomes_reach_sessions() {
    let mut server = build_server();
    let (_key, receiver) = server.open_session();

    let trap = server.spawn_entity(TRAP_TEMPLATE, Vec3::ZERO, 100);
    let player = server.spawn_entity(PLAYER_TEMPLATE, Vec3::ZERO, 50);

    server.activate_entity(trap, player); // fail
    server.advance(Duration::ZERO, &mut NullStore);
    server.activate_entity(trap, player); // success
    server.advance(Duration::ZERO, &mut NullStore);

    let mut results = Vec::new();
    while let Ok(packet) = receiver.try_recv() {
        let mut reader = BitReader::new(&packet);
        if PacketType::de(&mut reader).unwrap() == PacketType::Message {
            if let ServerMessage::ActivateResult { entity, success } =
                ServerMessage::de(&mut reader).unwrap()
            {
                results.push((entity, success));
            }
        }
    }
    assert_eq!(results, vec![(trap, false), (trap, true)]);
}
