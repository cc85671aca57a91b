use worldcore_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{types::ContentId, vector::Vec3};

/// Width of the wire tag leading every entity command.
pub const COMMAND_TAG_BITS: u32 = 5;

const STATE_BITS: u32 = 3;

/// Movement/animation state replicated to sessions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityState {
    Standing,
    Sitting,
    Sleeping,
    Dead,
}

impl EntityState {
    fn to_wire(self) -> u64 {
        match self {
            Self::Standing => 0,
            Self::Sitting => 1,
            Self::Sleeping => 2,
            Self::Dead => 3,
        }
    }

    fn from_wire(value: u64) -> Self {
        match value {
            1 => Self::Sitting,
            2 => Self::Sleeping,
            3 => Self::Dead,
            _ => Self::Standing,
        }
    }
}

/// Typed, self-describing unit of entity state change, synced host → session.
///
/// Commands are value types: constructed, serialized or applied, discarded.
/// Each variant owns a stable numeric tag used as both the wire
/// discriminator and the dispatch key; payload field order and widths are
/// fixed per tag and must be reproduced bit-exactly by counterpart
/// implementations.
#[derive(Clone, PartialEq, Debug)]
pub enum EntityCommand {
    SetPosition { position: Vec3, blend: bool },
    SetRotation { rotation: Vec3, blend: bool },
    SetVelocity { velocity: Vec3, blend: bool },
    SetState { state: EntityState },
    SetHealth { amount: u32 },
    PlayEffectVisual { effect_id: ContentId },
}

impl EntityCommand {
    pub const SET_POSITION: u8 = 0;
    pub const SET_ROTATION: u8 = 1;
    pub const SET_VELOCITY: u8 = 2;
    pub const SET_STATE: u8 = 3;
    pub const SET_HEALTH: u8 = 4;
    pub const PLAY_EFFECT_VISUAL: u8 = 5;

    pub fn tag(&self) -> u8 {
        match self {
            Self::SetPosition { .. } => Self::SET_POSITION,
            Self::SetRotation { .. } => Self::SET_ROTATION,
            Self::SetVelocity { .. } => Self::SET_VELOCITY,
            Self::SetState { .. } => Self::SET_STATE,
            Self::SetHealth { .. } => Self::SET_HEALTH,
            Self::PlayEffectVisual { .. } => Self::PLAY_EFFECT_VISUAL,
        }
    }

    /// Writes the tag, then the payload.
    pub fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_uint(self.tag() as u64, COMMAND_TAG_BITS);
        match self {
            Self::SetPosition { position, blend } => {
                position.ser(writer);
                writer.write_flag(*blend);
            }
            Self::SetRotation { rotation, blend } => {
                rotation.ser(writer);
                writer.write_flag(*blend);
            }
            Self::SetVelocity { velocity, blend } => {
                velocity.ser(writer);
                writer.write_flag(*blend);
            }
            Self::SetState { state } => {
                writer.write_uint(state.to_wire(), STATE_BITS);
            }
            Self::SetHealth { amount } => {
                amount.ser(writer);
            }
            Self::PlayEffectVisual { effect_id } => {
                effect_id.ser(writer);
            }
        }
    }

    // Per-tag payload deserializers, registered with `CommandKinds` at
    // protocol build time. The tag itself has already been consumed.

    pub fn de_set_position(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::SetPosition {
            position: Vec3::de(reader)?,
            blend: reader.read_flag()?,
        })
    }

    pub fn de_set_rotation(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::SetRotation {
            rotation: Vec3::de(reader)?,
            blend: reader.read_flag()?,
        })
    }

    pub fn de_set_velocity(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::SetVelocity {
            velocity: Vec3::de(reader)?,
            blend: reader.read_flag()?,
        })
    }

    pub fn de_set_state(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::SetState {
            state: EntityState::from_wire(reader.read_uint(STATE_BITS)?),
        })
    }

    pub fn de_set_health(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::SetHealth {
            amount: u32::de(reader)?,
        })
    }

    pub fn de_play_effect_visual(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::PlayEffectVisual {
            effect_id: ContentId::de(reader)?,
        })
    }
}
