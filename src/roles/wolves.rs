//! Werewolf-team roles.

use crate::core::{NightAction, NightActionPatch, NightActionState, NightPhase, Player, PlayerId, Roster};

use super::capability::{
    others_with_role, Alignment, NightOutcomeContext, OutcomeStage, RoleCapability, RoleId,
};
use super::village::looks_like_seer;

/// Votes each night on a victim.
#[derive(Debug, Default)]
pub struct Werewolf;

impl RoleCapability for Werewolf {
    fn id(&self) -> RoleId {
        RoleId::Werewolf
    }

    fn weight(&self) -> i32 {
        -6
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::WerewolfKill)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::WerewolfVote(target) => Some(NightActionPatch::WerewolfVote {
                actor: actor.clone(),
                target: target.clone(),
            }),
            _ => None,
        }
    }

    fn visible_teammates(&self, player: &Player, roster: &Roster) -> Vec<PlayerId> {
        others_with_role(player, roster, RoleId::Werewolf)
    }

    fn is_pack_member(&self) -> bool {
        true
    }
}

/// Knows the pack; the pack does not know the minion.
#[derive(Debug, Default)]
pub struct Minion;

impl RoleCapability for Minion {
    fn id(&self) -> RoleId {
        RoleId::Minion
    }

    fn weight(&self) -> i32 {
        -6
    }

    fn visible_teammates(&self, player: &Player, roster: &Roster) -> Vec<PlayerId> {
        others_with_role(player, roster, RoleId::Werewolf)
    }

    fn seen_role(&self, viewer: RoleId) -> Option<RoleId> {
        (viewer == RoleId::Seer).then_some(RoleId::Villager)
    }

    fn seen_alignment(&self, viewer: RoleId) -> Option<Alignment> {
        (viewer == RoleId::Seer).then_some(Alignment::Good)
    }
}

/// Searches for the Seer each night.
#[derive(Debug, Default)]
pub struct Sorcerer;

impl RoleCapability for Sorcerer {
    fn id(&self) -> RoleId {
        RoleId::Sorcerer
    }

    fn weight(&self) -> i32 {
        -3
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::SorcererCheck)
    }

    fn outcome_stage(&self) -> Option<OutcomeStage> {
        Some(OutcomeStage::Investigate)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::SorcererCheck(target) => Some(NightActionPatch::SorcererCheck {
                actor: actor.clone(),
                target: target.clone(),
            }),
            _ => None,
        }
    }

    fn apply_night_outcome(&self, ctx: &mut NightOutcomeContext<'_>) {
        let night = ctx.night;
        for (actor, target) in night.sorcerer_check.iter() {
            let target_role = ctx.players.get(target).and_then(|p| p.role);
            let Some(capability) = target_role.and_then(|r| ctx.registry.get(r)) else {
                tracing::warn!(%actor, %target, "sorcerer target has no known role");
                continue;
            };

            if looks_like_seer(capability, RoleId::Sorcerer) {
                if let Some(sorcerer) = ctx.players.get_mut(actor) {
                    sorcerer.flags.found_seer = true;
                    tracing::debug!(%actor, "sorcerer found the seer");
                }
            }
        }
    }

    fn seen_role(&self, viewer: RoleId) -> Option<RoleId> {
        (viewer == RoleId::Seer).then_some(RoleId::Villager)
    }

    fn seen_alignment(&self, viewer: RoleId) -> Option<Alignment> {
        (viewer == RoleId::Seer).then_some(Alignment::Good)
    }
}
