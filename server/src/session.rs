use std::collections::HashSet;

use log::warn;

use worldcore_shared::{
    write_commands, BitWriter, EntityCommand, EntityId, PacketType, Serde, ServerMessage,
};

/// Key identifying one connected session.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SessionKey(pub(crate) u64);

/// One connected session's server-side state.
///
/// The outbound queue is the engine's single synchronization boundary: the
/// tick thread enqueues serialized packets here, and an I/O-bound writer
/// on the session's own thread drains and flushes them.
pub struct Session {
    key: SessionKey,
    outbound: flume::Sender<Box<[u8]>>,
    subscriptions: HashSet<EntityId>,
}

impl Session {
    pub(crate) fn new(key: SessionKey) -> (Self, flume::Receiver<Box<[u8]>>) {
        let (outbound, receiver) = flume::unbounded();
        (
            Self {
                key,
                outbound,
                subscriptions: HashSet::new(),
            },
            receiver,
        )
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn subscribe(&mut self, entity: EntityId) -> bool {
        self.subscriptions.insert(entity)
    }

    pub fn unsubscribe(&mut self, entity: EntityId) -> bool {
        self.subscriptions.remove(&entity)
    }

    pub fn is_subscribed(&self, entity: EntityId) -> bool {
        self.subscriptions.contains(&entity)
    }

    pub(crate) fn enqueue(&self, payload: Box<[u8]>) {
        if self.outbound.send(payload).is_err() {
            // writer side hung up; the disconnect sweep will reap this session
            warn!("session {:?} outbound queue is disconnected", self.key);
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.outbound.is_disconnected()
    }
}

/// Serializes one command batch for an entity into an outbound packet.
pub(crate) fn encode_command_packet(entity: EntityId, commands: &[EntityCommand]) -> Box<[u8]> {
    let mut writer = BitWriter::new();
    PacketType::EntityCommands.ser(&mut writer);
    entity.ser(&mut writer);
    write_commands(&mut writer, commands);
    writer.to_bytes()
}

/// Serializes one server message into an outbound packet.
pub(crate) fn encode_message_packet(message: &ServerMessage) -> Box<[u8]> {
    let mut writer = BitWriter::new();
    PacketType::Message.ser(&mut writer);
    message.ser(&mut writer);
    writer.to_bytes()
}
