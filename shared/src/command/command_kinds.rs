use std::collections::HashMap;

use worldcore_serde::{BitReader, BitWrite, SerdeErr};

use crate::{
    command::entity_command::{EntityCommand, COMMAND_TAG_BITS},
    protocol::ProtocolError,
};

type CommandDeserializer = fn(&mut BitReader) -> Result<EntityCommand, SerdeErr>;

/// Registry mapping wire tags to entity command deserializers.
///
/// Populated by an explicit registration step at protocol build time and
/// exhaustive over all declared tags; an unrecognized tag on read is a
/// protocol error for the caller to handle, never a crash.
pub struct CommandKinds {
    kinds: HashMap<u8, CommandDeserializer>,
    locked: bool,
}

impl CommandKinds {
    pub(crate) fn new() -> Self {
        Self {
            kinds: HashMap::new(),
            locked: false,
        }
    }

    pub(crate) fn register(&mut self, tag: u8, deserializer: CommandDeserializer) {
        if self.locked {
            panic!("CommandKinds already locked!");
        }
        if self.kinds.insert(tag, deserializer).is_some() {
            panic!("Command tag {tag} registered twice!");
        }
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub fn has(&self, tag: u8) -> bool {
        self.kinds.contains_key(&tag)
    }

    /// Reads the next command off the stream: leading tag, then the payload
    /// dispatched through the registered deserializer.
    pub fn read(&self, reader: &mut BitReader) -> Result<EntityCommand, ProtocolError> {
        let tag = reader.read_uint(COMMAND_TAG_BITS)? as u8;
        let Some(deserializer) = self.kinds.get(&tag) else {
            return Err(ProtocolError::UnknownCommandTag { tag });
        };
        Ok(deserializer(reader)?)
    }
}

/// Writes a command batch: each command prefixed with a continue flag, then
/// a terminating `false`.
pub fn write_commands(writer: &mut dyn BitWrite, commands: &[EntityCommand]) {
    for command in commands {
        writer.write_flag(true);
        command.ser(writer);
    }
    writer.write_flag(false);
}

/// Reads a command batch written by [`write_commands`].
pub fn read_commands(
    kinds: &CommandKinds,
    reader: &mut BitReader,
) -> Result<Vec<EntityCommand>, ProtocolError> {
    let mut commands = Vec::new();
    loop {
        let command_continue = reader.read_flag()?;
        if !command_continue {
            break;
        }
        commands.push(kinds.read(reader)?);
    }
    Ok(commands)
}
