use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use log::warn;

use worldcore_shared::{
    CastingId, ContentId, EntityCommand, EntityId, EntityState, Protocol, ServerMessage, Vec3,
};

use crate::{
    effect::{CastRequest, EffectDefinition, EffectManager},
    events::EngineEvent,
    persist::{DeferredTask, DeferredTaskQueue, PersistenceError, RealmStore, TaskOutcome},
    schedule::{CallbackId, EventQueue},
    script::{
        ActivateEvent, CreateEvent, DeathEvent, EnterRangeEvent, ObjectiveUpdateEvent,
        QuestStateEvent, ScriptAction, ScriptContext, ScriptRegistry,
    },
    server::server_config::ServerConfig,
    session::{encode_command_packet, encode_message_packet, Session, SessionKey},
    world::{Entity, QuestState, QuestTracker, World, WorldRules},
};

/// The simulation host for one world (or map shard).
///
/// All entity mutation, scheduled-callback advancement, and script-hook
/// invocation happen on the single logical thread that calls
/// [`WorldServer::advance`]; per-session outbound queues are the only
/// synchronization boundary.
pub struct WorldServer {
    protocol: Protocol,
    config: ServerConfig,
    world: World,
    queue: EventQueue<EngineEvent>,
    effects: EffectManager,
    scripts: Arc<ScriptRegistry>,
    rules: Box<dyn WorldRules>,
    sessions: HashMap<SessionKey, Session>,
    next_session_key: u64,
    pulses: HashMap<EntityId, CallbackId>,
    deferred: DeferredTaskQueue,
    outbound_messages: Vec<ServerMessage>,
    outbound_commands: Vec<(EntityId, EntityCommand)>,
}

impl WorldServer {
    pub fn new(
        mut protocol: Protocol,
        config: ServerConfig,
        scripts: Arc<ScriptRegistry>,
        rules: Box<dyn WorldRules>,
    ) -> Self {
        if !protocol.is_locked() {
            protocol.lock();
        }
        if !scripts.is_locked() {
            panic!("ScriptRegistry must be locked before the world server starts!");
        }

        Self {
            protocol,
            config,
            world: World::new(),
            queue: EventQueue::new(),
            effects: EffectManager::new(),
            scripts,
            rules,
            sessions: HashMap::new(),
            next_session_key: 0,
            pulses: HashMap::new(),
            deferred: DeferredTaskQueue::new(),
            outbound_messages: Vec::new(),
            outbound_commands: Vec::new(),
        }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn scheduled_events(&self) -> usize {
        self.queue.pending()
    }

    pub fn deferred_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Registers a content-table effect definition. Startup-time only.
    pub fn register_effect(&mut self, definition: EffectDefinition) {
        self.effects.register_effect(definition);
    }

    // Sessions

    /// Opens a session and hands back the receiving end of its outbound
    /// queue, to be drained by an I/O-bound writer.
    pub fn open_session(&mut self) -> (SessionKey, flume::Receiver<Box<[u8]>>) {
        let key = SessionKey(self.next_session_key);
        self.next_session_key += 1;
        let (session, receiver) = Session::new(key);
        self.sessions.insert(key, session);
        (key, receiver)
    }

    pub fn close_session(&mut self, key: SessionKey) -> bool {
        self.sessions.remove(&key).is_some()
    }

    pub fn subscribe(&mut self, key: SessionKey, entity: EntityId) {
        if let Some(session) = self.sessions.get_mut(&key) {
            session.subscribe(entity);
        }
    }

    pub fn unsubscribe(&mut self, key: SessionKey, entity: EntityId) {
        if let Some(session) = self.sessions.get_mut(&key) {
            session.unsubscribe(entity);
        }
    }

    // Entities

    /// Spawns an entity and fires its `OnCreate` hooks.
    pub fn spawn_entity(
        &mut self,
        template_id: ContentId,
        position: Vec3,
        max_health: u32,
    ) -> EntityId {
        let entity = self.world.spawn(template_id, position, max_health);

        let event = CreateEvent {
            entity,
            template_id,
        };
        let mut ctx = ScriptContext::new();
        self.scripts
            .dispatch_create(&self.world, template_id, &event, &mut ctx);
        self.apply_actions(ctx.take_actions());

        entity
    }

    /// Removes an entity; callbacks it owns are cancelled with it.
    pub fn despawn_entity(&mut self, entity: EntityId) {
        if let Some(pulse) = self.pulses.remove(&entity) {
            self.queue.cancel(pulse);
        }
        self.world.despawn(entity);
    }

    /// Starts the periodic regeneration pulse for an entity.
    pub fn schedule_entity_pulse(&mut self, entity: EntityId) {
        if !self.world.contains(entity) || self.pulses.contains_key(&entity) {
            return;
        }
        let id = self.queue.schedule_repeating(
            self.config.entity_pulse_interval,
            self.config.entity_pulse_interval,
            EngineEvent::EntityPulse { entity },
        );
        self.pulses.insert(entity, id);
    }

    /// Buffers a command for replication to sessions subscribed to `entity`.
    pub fn send_command(&mut self, entity: EntityId, command: EntityCommand) {
        self.outbound_commands.push((entity, command));
    }

    pub fn send_message(&mut self, message: ServerMessage) {
        self.outbound_messages.push(message);
    }

    // Effects

    /// Initiates an effect cast. Returns `None` when the request degrades
    /// to a no-op (unknown effect, dead caster).
    pub fn start_cast(&mut self, request: CastRequest) -> Option<CastingId> {
        self.effects.start_cast(
            &self.world,
            &mut self.queue,
            &mut self.outbound_messages,
            request,
        )
    }

    pub fn cancel_cast(&mut self, casting_id: CastingId) -> bool {
        self.effects.cancel(casting_id, &mut self.queue)
    }

    // Interaction

    /// Resolves an activation attempt against an interactable entity and
    /// fires the matching success/fail hooks. Failure is a degraded no-op
    /// with a client-visible indicator, never an error.
    pub fn activate_entity(&mut self, entity: EntityId, activator: EntityId) {
        let success = self.world.contains(entity)
            && self.world.is_alive(activator)
            && self.rules.can_activate(&self.world, entity, activator);

        self.outbound_messages
            .push(ServerMessage::ActivateResult { entity, success });

        let Some(template_id) = self.world.entity(entity).map(Entity::template_id) else {
            return;
        };

        let event = ActivateEvent { entity, activator };
        let mut ctx = ScriptContext::new();
        if success {
            self.scripts
                .dispatch_activate_success(&self.world, template_id, &event, &mut ctx);
        } else {
            self.scripts
                .dispatch_activate_fail(&self.world, template_id, &event, &mut ctx);
        }
        self.apply_actions(ctx.take_actions());
    }

    /// Reports that `actor` came into range of `entity`; range detection
    /// itself belongs to the embedding world loop.
    pub fn notify_enter_range(&mut self, entity: EntityId, actor: EntityId) {
        let Some(template_id) = self.world.entity(entity).map(Entity::template_id) else {
            return;
        };
        let event = EnterRangeEvent { entity, actor };
        let mut ctx = ScriptContext::new();
        self.scripts
            .dispatch_enter_range(&self.world, template_id, &event, &mut ctx);
        self.apply_actions(ctx.take_actions());
    }

    /// Applies damage, replicating the new health and processing death if
    /// it drops to zero.
    pub fn damage_entity(&mut self, entity: EntityId, amount: u32, attacker: Option<EntityId>) {
        let Some(e) = self.world.entity_mut(entity) else {
            return;
        };
        let died = e.apply_damage(amount);
        let health = e.health();
        self.outbound_commands
            .push((entity, EntityCommand::SetHealth { amount: health }));
        if died {
            let actions = self.process_death(entity, attacker);
            self.apply_actions(actions);
        }
    }

    pub fn kill_entity(&mut self, entity: EntityId, killer: Option<EntityId>) {
        let actions = self.kill_internal(entity, killer);
        self.apply_actions(actions);
    }

    // Quests

    pub fn quest_accept(&mut self, entity: EntityId, quest_id: ContentId, required: &[u32]) {
        {
            let Some(e) = self.world.entity_mut(entity) else {
                return;
            };
            e.insert_quest(QuestTracker::new(quest_id, required));
        }
        let actions = self.quest_transition_internal(entity, quest_id, QuestState::Accepted);
        self.apply_actions(actions);
    }

    /// Applies one objective increment: the objective-update hook fires for
    /// this increment, and the quest-state-change hook fires only if the
    /// increment finishes the quest.
    pub fn quest_progress(
        &mut self,
        entity: EntityId,
        quest_id: ContentId,
        objective_index: usize,
        delta: u32,
    ) {
        let actions = self.quest_progress_internal(entity, quest_id, objective_index, delta);
        self.apply_actions(actions);
    }

    /// Marks a turn-in quest as completed (awaiting achievement).
    pub fn quest_complete(&mut self, entity: EntityId, quest_id: ContentId) {
        let actions = self.quest_transition_internal(entity, quest_id, QuestState::Completed);
        self.apply_actions(actions);
    }

    pub fn quest_achieve(&mut self, entity: EntityId, quest_id: ContentId) {
        let actions = self.quest_transition_internal(entity, quest_id, QuestState::Achieved);
        self.apply_actions(actions);
    }

    // Tick

    /// Advances the simulation by `elapsed`: due callbacks fire in order,
    /// deferred realm tasks drain against `store`, and buffered state
    /// changes flush to session queues.
    pub fn advance(&mut self, elapsed: Duration, store: &mut dyn RealmStore) {
        let fired = self.queue.advance(elapsed);
        for event in fired {
            self.handle_event(event);
        }

        self.deferred.run(store);
        self.sessions.retain(|_, session| session.is_connected());
        self.flush_outbound();
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::EffectPhase {
                casting_id,
                ordinal,
            } => {
                // contract violations are logged and force-cancelled by the
                // effect manager; there is nothing further to do here
                if let Ok(actions) = self.effects.run_phase(
                    casting_id,
                    ordinal,
                    &mut self.world,
                    self.rules.as_ref(),
                    &self.scripts,
                    &mut self.queue,
                    &mut self.outbound_messages,
                ) {
                    self.apply_actions(actions);
                }
            }
            EngineEvent::EntityPulse { entity } => self.handle_pulse(entity),
            EngineEvent::CorpseDespawn { entity } => self.despawn_entity(entity),
        }
    }

    fn handle_pulse(&mut self, entity: EntityId) {
        if !self.world.contains(entity) {
            if let Some(pulse) = self.pulses.remove(&entity) {
                self.queue.cancel(pulse);
            }
            return;
        }
        let regen = self.config.pulse_regen;
        let Some(e) = self.world.entity_mut(entity) else {
            return;
        };
        if e.is_alive() && e.health() < e.max_health() {
            let amount = (e.health() + regen).min(e.max_health());
            e.set_health(amount);
            self.outbound_commands
                .push((entity, EntityCommand::SetHealth { amount }));
        }
    }

    /// Applies buffered script actions; actions that trigger further hooks
    /// feed the same queue until it drains.
    fn apply_actions(&mut self, actions: Vec<ScriptAction>) {
        let mut pending = VecDeque::from(actions);
        while let Some(action) = pending.pop_front() {
            match action {
                ScriptAction::StartCast(request) => {
                    self.start_cast(request);
                }
                ScriptAction::SetHealth { entity, amount } => {
                    let Some(e) = self.world.entity_mut(entity) else {
                        continue;
                    };
                    let died = e.set_health(amount);
                    let health = e.health();
                    self.outbound_commands
                        .push((entity, EntityCommand::SetHealth { amount: health }));
                    if died {
                        pending.extend(self.process_death(entity, None));
                    }
                }
                ScriptAction::Kill { entity, killer } => {
                    pending.extend(self.kill_internal(entity, killer));
                }
                ScriptAction::FinishEffect { entity, effect_id } => {
                    if let Some(e) = self.world.entity_mut(entity) {
                        e.remove_effect(effect_id);
                    }
                }
                ScriptAction::SendCommand { entity, command } => {
                    self.outbound_commands.push((entity, command));
                }
                ScriptAction::UpdateObjective {
                    entity,
                    quest_id,
                    objective_index,
                    delta,
                } => {
                    pending.extend(self.quest_progress_internal(
                        entity,
                        quest_id,
                        objective_index,
                        delta,
                    ));
                }
                ScriptAction::GrantReward {
                    entity,
                    reward_table,
                } => {
                    self.push_reward_task(entity, reward_table);
                }
                ScriptAction::Schedule { delay, event } => {
                    self.queue.schedule(delay, event);
                }
            }
        }
    }

    fn kill_internal(&mut self, entity: EntityId, killer: Option<EntityId>) -> Vec<ScriptAction> {
        let Some(e) = self.world.entity_mut(entity) else {
            return Vec::new();
        };
        if !e.set_health(0) {
            // already dead; death hooks fired when it first died
            return Vec::new();
        }
        self.process_death(entity, killer)
    }

    /// Death side effects for a freshly dead entity: state replication,
    /// reward hooks, corpse cleanup.
    fn process_death(&mut self, entity: EntityId, killer: Option<EntityId>) -> Vec<ScriptAction> {
        self.outbound_commands.push((
            entity,
            EntityCommand::SetState {
                state: EntityState::Dead,
            },
        ));

        let Some(template_id) = self.world.entity(entity).map(Entity::template_id) else {
            return Vec::new();
        };

        let event = DeathEvent { entity, killer };
        let mut ctx = ScriptContext::new();
        self.scripts
            .dispatch_death_reward(&self.world, template_id, &event, &mut ctx);

        self.queue.schedule(
            self.config.corpse_despawn_delay,
            EngineEvent::CorpseDespawn { entity },
        );

        ctx.take_actions()
    }

    fn quest_progress_internal(
        &mut self,
        entity: EntityId,
        quest_id: ContentId,
        objective_index: usize,
        delta: u32,
    ) -> Vec<ScriptAction> {
        let (progress, required, all_met) = {
            let Some(e) = self.world.entity_mut(entity) else {
                return Vec::new();
            };
            let Some(tracker) = e.quest_mut(quest_id) else {
                warn!("objective update for unaccepted quest {quest_id:?} on {entity:?}");
                return Vec::new();
            };
            if tracker.state() != QuestState::Accepted {
                return Vec::new();
            }
            let Some(objective) = tracker.objective_mut(objective_index) else {
                warn!("quest {quest_id:?} has no objective index {objective_index}");
                return Vec::new();
            };
            let progress = objective.apply(delta);
            let required = objective.required();
            (progress, required, tracker.all_objectives_met())
        };

        let event = ObjectiveUpdateEvent {
            entity,
            quest_id,
            objective_index,
            delta,
            progress,
            required,
        };
        let mut ctx = ScriptContext::new();
        self.scripts
            .dispatch_objective_update(&self.world, quest_id, &event, &mut ctx);
        let mut actions = ctx.take_actions();

        if all_met {
            actions.extend(self.quest_transition_internal(entity, quest_id, QuestState::Achieved));
        }
        actions
    }

    fn quest_transition_internal(
        &mut self,
        entity: EntityId,
        quest_id: ContentId,
        next: QuestState,
    ) -> Vec<ScriptAction> {
        let previous = {
            let Some(e) = self.world.entity_mut(entity) else {
                return Vec::new();
            };
            let Some(tracker) = e.quest_mut(quest_id) else {
                return Vec::new();
            };
            let Some(previous) = tracker.transition(next) else {
                return Vec::new();
            };
            previous
        };

        let event = QuestStateEvent {
            entity,
            quest_id,
            previous,
            current: next,
        };
        let mut ctx = ScriptContext::new();
        self.scripts
            .dispatch_quest_state_change(&self.world, quest_id, &event, &mut ctx);

        self.deferred.push(DeferredTask::new(
            "save quest state",
            move |store| match store.save_quest_state(entity, quest_id, next) {
                Ok(()) => TaskOutcome::Complete,
                Err(PersistenceError::Unavailable { .. }) => TaskOutcome::Retry,
                Err(PersistenceError::Rejected { .. }) => TaskOutcome::Failed,
            },
        ));

        ctx.take_actions()
    }

    fn push_reward_task(&mut self, entity: EntityId, reward_table: ContentId) {
        let roll = fastrand::u32(0..100);
        self.deferred.push(DeferredTask::new(
            "grant death reward",
            move |store| match store.grant_reward(entity, reward_table, roll) {
                Ok(()) => TaskOutcome::Complete,
                Err(PersistenceError::Unavailable { .. }) => TaskOutcome::Retry,
                Err(PersistenceError::Rejected { .. }) => TaskOutcome::Failed,
            },
        ));
    }

    // Outbound

    fn flush_outbound(&mut self) {
        // spell/interaction messages are shard-visible announcements
        for message in std::mem::take(&mut self.outbound_messages) {
            let packet = encode_message_packet(&message);
            for session in self.sessions.values() {
                session.enqueue(packet.clone());
            }
        }

        // commands batch per entity, preserving emission order, and reach
        // only sessions subscribed to that entity
        let commands = std::mem::take(&mut self.outbound_commands);
        let mut batches: Vec<(EntityId, Vec<EntityCommand>)> = Vec::new();
        for (entity, command) in commands {
            match batches.iter_mut().find(|(id, _)| *id == entity) {
                Some((_, batch)) => batch.push(command),
                None => batches.push((entity, vec![command])),
            }
        }
        for (entity, batch) in batches {
            let packet = encode_command_packet(entity, &batch);
            for session in self.sessions.values() {
                if session.is_subscribed(entity) {
                    session.enqueue(packet.clone());
                }
            }
        }
    }
}
