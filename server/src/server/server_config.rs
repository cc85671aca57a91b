use std::time::Duration;

/// Contains world-simulation parameters that are not part of the protocol.
#[derive(Clone)]
pub struct ServerConfig {
    /// Delay between an entity's death and its corpse leaving the world
    pub corpse_despawn_delay: Duration,
    /// Interval of the per-entity periodic pulse (health regeneration)
    pub entity_pulse_interval: Duration,
    /// Health restored per pulse to living, wounded entities
    pub pulse_regen: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            corpse_despawn_delay: Duration::from_secs(30),
            entity_pulse_interval: Duration::from_secs(5),
            pulse_regen: 1,
        }
    }
}
