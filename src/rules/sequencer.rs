//! Night phase sequencing.
//!
//! Walks `NightPhase::ORDER` from just after the current step and stops at
//! the first phase whose precondition holds. The walk only moves forward over
//! a fixed list, so it always terminates and never revisits a phase within
//! one night.

use crate::core::{GameSettings, GameState, NightPhase, PlayerId};
use crate::roles::RoleRegistry;

/// Result of asking for the next night step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextPhase {
    Phase(NightPhase),
    /// No step left; resolve the night.
    Resolve,
}

impl NextPhase {
    /// Deadline for the step. Passive steps and `Resolve` get none.
    #[must_use]
    pub fn deadline(self, settings: &GameSettings, now_ms: i64) -> Option<i64> {
        match self {
            NextPhase::Phase(phase) if phase.passive_action().is_none() => {
                Some(now_ms + settings.night_phase_ms())
            }
            NextPhase::Phase(_) | NextPhase::Resolve => None,
        }
    }
}

/// Living players who wake in `phase`.
#[must_use]
pub fn eligible_actors(phase: NightPhase, state: &GameState, registry: &RoleRegistry) -> Vec<PlayerId> {
    state
        .alive()
        .filter(|p| {
            registry
                .for_player(p)
                .is_some_and(|c| c.is_wake_up_phase(phase))
        })
        .map(|p| p.id.clone())
        .collect()
}

/// Whether `phase` should run at all.
#[must_use]
pub fn phase_precondition(phase: NightPhase, state: &GameState, registry: &RoleRegistry) -> bool {
    let one_shot_open = match phase {
        NightPhase::CupidLink => state.lovers.is_none(),
        NightPhase::DoppelgangerCopy => state.doppelganger_target.is_none(),
        _ => true,
    };
    one_shot_open && !eligible_actors(phase, state, registry).is_empty()
}

/// The next active phase strictly after `current` (`None` = start of night).
#[must_use]
pub fn next_night_phase(
    current: Option<NightPhase>,
    state: &GameState,
    registry: &RoleRegistry,
) -> NextPhase {
    let start = current.map_or(0, |p| p.position() + 1);
    NightPhase::ORDER
        .iter()
        .skip(start)
        .copied()
        .find(|&phase| phase_precondition(phase, state, registry))
        .map_or(NextPhase::Resolve, NextPhase::Phase)
}

/// Whether every eligible actor has committed in `phase`.
#[must_use]
pub fn phase_complete(phase: NightPhase, state: &GameState, registry: &RoleRegistry) -> bool {
    eligible_actors(phase, state, registry)
        .iter()
        .all(|actor| state.night_actions.has_acted(phase, actor))
}

/// Every phase a night would visit, in order. Used for diagnostics and tests.
#[must_use]
pub fn night_plan(state: &GameState, registry: &RoleRegistry) -> Vec<NightPhase> {
    let mut plan = Vec::new();
    let mut current = None;
    while let NextPhase::Phase(phase) = next_night_phase(current, state, registry) {
        plan.push(phase);
        current = Some(phase);
    }
    plan
}
