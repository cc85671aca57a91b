mod command_kinds;
mod entity_command;

pub use command_kinds::{read_commands, write_commands, CommandKinds};
pub use entity_command::{EntityCommand, EntityState, COMMAND_TAG_BITS};
