use worldcore_serde::{BitReader, BitWrite, Serde};

use crate::{
    protocol::ProtocolError,
    types::{CastingId, ContentId, EntityId},
};

/// Width of the wire tag leading every server message.
pub const MESSAGE_TAG_BITS: u32 = 4;

const TARGET_COUNT_BITS: u32 = 8;

/// Session-directed protocol messages emitted by effect execution and
/// entity interaction.
///
/// Like entity commands, messages are a closed set: leading tag, then a
/// payload with fixed field order and widths.
#[derive(Clone, PartialEq, Debug)]
pub enum ServerMessage {
    /// An effect cast has been initiated by `caster`
    SpellStart {
        casting_id: CastingId,
        caster: EntityId,
        spell_id: ContentId,
    },
    /// One phase of an in-flight cast has landed on its resolved targets
    SpellGo {
        casting_id: CastingId,
        targets: Vec<EntityId>,
    },
    /// An effect cast has reached its terminal phase
    SpellFinish { casting_id: CastingId },
    /// Outcome of an entity activation attempt; `success: false` is the
    /// client-visible indicator for a degraded no-op
    ActivateResult { entity: EntityId, success: bool },
}

impl ServerMessage {
    pub const SPELL_START: u8 = 0;
    pub const SPELL_GO: u8 = 1;
    pub const SPELL_FINISH: u8 = 2;
    pub const ACTIVATE_RESULT: u8 = 3;

    pub fn tag(&self) -> u8 {
        match self {
            Self::SpellStart { .. } => Self::SPELL_START,
            Self::SpellGo { .. } => Self::SPELL_GO,
            Self::SpellFinish { .. } => Self::SPELL_FINISH,
            Self::ActivateResult { .. } => Self::ACTIVATE_RESULT,
        }
    }

    pub fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_uint(self.tag() as u64, MESSAGE_TAG_BITS);
        match self {
            Self::SpellStart {
                casting_id,
                caster,
                spell_id,
            } => {
                casting_id.ser(writer);
                caster.ser(writer);
                spell_id.ser(writer);
            }
            Self::SpellGo {
                casting_id,
                targets,
            } => {
                casting_id.ser(writer);
                writer.write_uint(targets.len() as u64, TARGET_COUNT_BITS);
                for target in targets {
                    target.ser(writer);
                }
            }
            Self::SpellFinish { casting_id } => {
                casting_id.ser(writer);
            }
            Self::ActivateResult { entity, success } => {
                entity.ser(writer);
                writer.write_flag(*success);
            }
        }
    }

    pub fn de(reader: &mut BitReader) -> Result<Self, ProtocolError> {
        let tag = reader.read_uint(MESSAGE_TAG_BITS)? as u8;
        match tag {
            Self::SPELL_START => Ok(Self::SpellStart {
                casting_id: CastingId::de(reader)?,
                caster: EntityId::de(reader)?,
                spell_id: ContentId::de(reader)?,
            }),
            Self::SPELL_GO => {
                let casting_id = CastingId::de(reader)?;
                let count = reader.read_uint(TARGET_COUNT_BITS)? as usize;
                let mut targets = Vec::with_capacity(count);
                for _ in 0..count {
                    targets.push(EntityId::de(reader)?);
                }
                Ok(Self::SpellGo {
                    casting_id,
                    targets,
                })
            }
            Self::SPELL_FINISH => Ok(Self::SpellFinish {
                casting_id: CastingId::de(reader)?,
            }),
            Self::ACTIVATE_RESULT => Ok(Self::ActivateResult {
                entity: EntityId::de(reader)?,
                success: reader.read_flag()?,
            }),
            _ => Err(ProtocolError::UnknownMessageTag { tag }),
        }
    }
}
