use std::time::Duration;

use crate::command::{CommandKinds, EntityCommand};

pub mod error;
pub use error::ProtocolError;

/// Shared protocol description: the command registry plus simulation-wide
/// wire settings. Built once at startup, locked, then read-only.
pub struct Protocol {
    pub command_kinds: CommandKinds,
    /// The duration between each simulation tick
    pub tick_interval: Duration,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        let mut command_kinds = CommandKinds::new();

        // the registry must be exhaustive over every declared command tag
        command_kinds.register(EntityCommand::SET_POSITION, EntityCommand::de_set_position);
        command_kinds.register(EntityCommand::SET_ROTATION, EntityCommand::de_set_rotation);
        command_kinds.register(EntityCommand::SET_VELOCITY, EntityCommand::de_set_velocity);
        command_kinds.register(EntityCommand::SET_STATE, EntityCommand::de_set_state);
        command_kinds.register(EntityCommand::SET_HEALTH, EntityCommand::de_set_health);
        command_kinds.register(
            EntityCommand::PLAY_EFFECT_VISUAL,
            EntityCommand::de_play_effect_visual,
        );

        Self {
            command_kinds,
            tick_interval: Duration::from_millis(50),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn tick_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.tick_interval = duration;
        self
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.command_kinds.lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
