//! Village-team roles.

use crate::core::{NightAction, NightActionPatch, NightActionState, NightPhase, Player, PlayerId, Roster};

use super::capability::{
    apparent_role, others_with_role, Alignment, NightOutcomeContext, OutcomeStage, RoleCapability,
    RoleId,
};

#[derive(Debug, Default)]
pub struct Villager;

impl RoleCapability for Villager {
    fn id(&self) -> RoleId {
        RoleId::Villager
    }

    fn weight(&self) -> i32 {
        1
    }
}

/// Learns one player's alignment each night.
#[derive(Debug, Default)]
pub struct Seer;

impl RoleCapability for Seer {
    fn id(&self) -> RoleId {
        RoleId::Seer
    }

    fn weight(&self) -> i32 {
        7
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::SeerInvestigate)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::SeerCheck(target) => Some(NightActionPatch::SeerCheck {
                actor: actor.clone(),
                target: target.clone(),
            }),
            _ => None,
        }
    }
}

/// Protects one player from tonight's kills.
#[derive(Debug, Default)]
pub struct Doctor;

impl RoleCapability for Doctor {
    fn id(&self) -> RoleId {
        RoleId::Doctor
    }

    fn weight(&self) -> i32 {
        5
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::DoctorProtect)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::Protect(target) => Some(NightActionPatch::Protect {
                actor: actor.clone(),
                target: target.clone(),
            }),
            _ => None,
        }
    }
}

/// Dealt as a pair; masons know each other.
#[derive(Debug, Default)]
pub struct Mason;

impl RoleCapability for Mason {
    fn id(&self) -> RoleId {
        RoleId::Mason
    }

    fn weight(&self) -> i32 {
        2
    }

    fn slots(&self) -> usize {
        2
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::MasonAcknowledge)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::MasonReady => Some(NightActionPatch::MasonReady { actor: actor.clone() }),
            _ => None,
        }
    }

    fn visible_teammates(&self, player: &Player, roster: &Roster) -> Vec<PlayerId> {
        others_with_role(player, roster, RoleId::Mason)
    }
}

/// A villager who looks like a werewolf to the Seer.
#[derive(Debug, Default)]
pub struct Lycan;

impl RoleCapability for Lycan {
    fn id(&self) -> RoleId {
        RoleId::Lycan
    }

    fn weight(&self) -> i32 {
        -1
    }

    fn seen_role(&self, viewer: RoleId) -> Option<RoleId> {
        (viewer == RoleId::Seer).then_some(RoleId::Werewolf)
    }

    fn seen_alignment(&self, viewer: RoleId) -> Option<Alignment> {
        (viewer == RoleId::Seer).then_some(Alignment::Evil)
    }
}

/// Day ballot counts twice.
#[derive(Debug, Default)]
pub struct Mayor;

impl RoleCapability for Mayor {
    fn id(&self) -> RoleId {
        RoleId::Mayor
    }

    fn weight(&self) -> i32 {
        2
    }

    fn vote_weight(&self) -> u32 {
        2
    }
}

/// Takes someone down when dying.
#[derive(Debug, Default)]
pub struct Hunter;

impl RoleCapability for Hunter {
    fn id(&self) -> RoleId {
        RoleId::Hunter
    }

    fn weight(&self) -> i32 {
        3
    }

    fn has_revenge(&self) -> bool {
        true
    }
}

/// Limited ammunition; shoots after the werewolves.
#[derive(Debug, Default)]
pub struct Vigilante;

impl RoleCapability for Vigilante {
    fn id(&self) -> RoleId {
        RoleId::Vigilante
    }

    fn weight(&self) -> i32 {
        3
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::VigilanteShoot)
    }

    fn outcome_stage(&self) -> Option<OutcomeStage> {
        Some(OutcomeStage::IndependentKill)
    }

    fn process_night_action(
        &self,
        _night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            NightAction::VigilanteShoot(target) => Some(NightActionPatch::VigilanteTarget {
                actor: actor.clone(),
                target: target.clone(),
            }),
            _ => None,
        }
    }

    fn apply_night_outcome(&self, ctx: &mut NightOutcomeContext<'_>) {
        let night = ctx.night;
        for (shooter, target) in night.vigilante_target.iter() {
            let Some(target) = target else { continue };

            let ammo = ctx.vigilante_ammo.get(shooter).copied().unwrap_or(0);
            if ammo == 0 {
                tracing::debug!(%shooter, "vigilante out of ammo");
                continue;
            }
            ctx.vigilante_ammo.insert(shooter.clone(), ammo - 1);

            if ctx.kill(target) {
                tracing::debug!(%shooter, victim = %target, "vigilante shot landed");
            }
        }
    }
}

/// Links two players as lovers on the first night.
#[derive(Debug, Default)]
pub struct Cupid;

impl RoleCapability for Cupid {
    fn id(&self) -> RoleId {
        RoleId::Cupid
    }

    fn weight(&self) -> i32 {
        -3
    }

    fn night_phase(&self) -> Option<NightPhase> {
        Some(NightPhase::CupidLink)
    }

    fn process_night_action(
        &self,
        night: &NightActionState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Option<NightActionPatch> {
        match action {
            // One pair per night, whichever cupid gets there first.
            NightAction::CupidLink(a, b) if a != b && night.cupid_links.is_empty() => {
                Some(NightActionPatch::CupidLinks {
                    actor: actor.clone(),
                    pair: (a.clone(), b.clone()),
                })
            }
            _ => None,
        }
    }
}

/// Whether a viewer holding `viewer` would take `target` for a Seer.
pub(crate) fn looks_like_seer(target: &dyn RoleCapability, viewer: RoleId) -> bool {
    apparent_role(target, viewer) == RoleId::Seer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster_of;
    use crate::roles::capability::apparent_alignment;

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    #[test]
    fn test_seer_only_accepts_checks() {
        let night = NightActionState::new();
        assert!(Seer
            .process_night_action(&night, &pid("s"), &NightAction::SeerCheck(pid("x")))
            .is_some());
        assert!(Seer
            .process_night_action(&night, &pid("s"), &NightAction::WerewolfVote(pid("x")))
            .is_none());
    }

    #[test]
    fn test_lycan_appears_evil_only_to_seer() {
        assert_eq!(apparent_alignment(&Lycan, RoleId::Seer), Alignment::Evil);
        assert_eq!(apparent_alignment(&Lycan, RoleId::Sorcerer), Alignment::Good);
        assert_eq!(apparent_role(&Lycan, RoleId::Seer), RoleId::Werewolf);
        assert_eq!(apparent_role(&Lycan, RoleId::Doctor), RoleId::Lycan);
    }

    #[test]
    fn test_masons_see_each_other() {
        let roster = roster_of(vec![
            Player::new("m1", "M1").with_role(RoleId::Mason),
            Player::new("m2", "M2").with_role(RoleId::Mason),
            Player::new("v", "V").with_role(RoleId::Villager),
        ]);
        let m1 = &roster[&pid("m1")];
        assert_eq!(Mason.visible_teammates(m1, &roster), vec![pid("m2")]);
        assert_eq!(Mason.slots(), 2);
    }

    #[test]
    fn test_cupid_rejects_self_pair_and_second_link() {
        let mut night = NightActionState::new();
        assert!(Cupid
            .process_night_action(&night, &pid("c"), &NightAction::CupidLink(pid("a"), pid("a")))
            .is_none());

        let patch = Cupid
            .process_night_action(&night, &pid("c"), &NightAction::CupidLink(pid("a"), pid("b")))
            .unwrap();
        night.apply(patch);

        assert!(Cupid
            .process_night_action(&night, &pid("c2"), &NightAction::CupidLink(pid("x"), pid("y")))
            .is_none());
    }

    #[test]
    fn test_mayor_and_hunter_flags() {
        assert_eq!(Mayor.vote_weight(), 2);
        assert_eq!(Villager.vote_weight(), 1);
        assert!(Hunter.has_revenge());
        assert!(!Villager.has_revenge());
    }
}
