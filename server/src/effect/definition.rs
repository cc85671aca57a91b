use std::time::Duration;

use worldcore_shared::ContentId;

/// Baseline behavior the engine applies to each resolved target when a
/// phase executes, before script hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOp {
    /// No built-in behavior; scripts drive this phase
    None,
    /// Attach this effect to each target's effect list
    ApplyEffect,
    /// Detach this effect from each target
    RemoveEffect,
    /// Deduct health from each target
    DealDamage { amount: u32 },
}

/// One declared phase of an effect: an ordinal, the delay before it runs
/// (measured from the previous phase, or from cast initiation for the
/// first), and its baseline operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectPhaseDef {
    pub ordinal: u8,
    pub delay: Duration,
    pub op: PhaseOp,
}

/// Static description of an effect, loaded from content tables at startup.
///
/// Ordinals may be sparse (a two-stage effect can declare phases 0 and 3);
/// the highest declared ordinal is the terminal phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDefinition {
    pub effect_id: ContentId,
    pub phases: Vec<EffectPhaseDef>,
}

impl EffectDefinition {
    pub fn new(effect_id: ContentId, mut phases: Vec<EffectPhaseDef>) -> Self {
        phases.sort_by_key(|phase| phase.ordinal);
        Self { effect_id, phases }
    }

    /// Single instant phase applying the effect as an aura.
    pub fn instant_aura(effect_id: ContentId) -> Self {
        Self::new(
            effect_id,
            vec![EffectPhaseDef {
                ordinal: 0,
                delay: Duration::ZERO,
                op: PhaseOp::ApplyEffect,
            }],
        )
    }

    pub fn phase_at(&self, index: usize) -> Option<&EffectPhaseDef> {
        self.phases.get(index)
    }

    pub fn terminal_ordinal(&self) -> Option<u8> {
        self.phases.last().map(|phase| phase.ordinal)
    }
}
