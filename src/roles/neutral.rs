//! Roles that win on their own terms.

use crate::core::{NightAction, NightActionPatch, NightActionState, NightPhase, Player, PlayerId};
use crate::rules::win::WinContext;

use super::capability::{executed, RoleCapability, RoleId};

/// Wins by getting voted out.
#[derive(Debug, Default)]
pub struct Tanner;

impl RoleCapability for Tanner {
    fn id(&self) -> RoleId {
        RoleId::Tanner
    }

    fn weight(&self) -> i32 {
        -2
    }

    fn wants_execution(&self) -> bool {
        true
    }

    fn check_win(&self, player: &Player, ctx: &WinContext<'_>) -> bool {
        executed(player, ctx.recent_death)
    }
}

/// Picks a player on the first night and becomes them when they die.
#[derive(Debug, Default)]
pub struct Doppelganger;

impl RoleCapability for Doppelganger {
    fn id(&self) -> RoleId {
        RoleId::Doppelganger
    }

    fn weight(&self) -> i32 {
        -2
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::DoppelgangerCopy)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::DoppelgangerPick(target) if target != actor => {
                Some(NightActionPatch::DoppelgangerPick {
                    actor: actor.clone(),
                    target: target.clone(),
                })
            }
            _ => None,
        }
    }

    fn copies_on_death(&self) -> bool {
        true
    }
}
