//! The role capability interface.
//!
//! Every role is one immutable descriptor implementing `RoleCapability`.
//! Most methods have defaults that describe a plain villager, so each role
//! only overrides what makes it special.

use im::{OrdMap, OrdSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{
    NightAction, NightActionPatch, NightActionState, NightPhase, Player, PlayerId, Roster,
};
use crate::rules::win::{RecentDeath, WinContext};

use super::registry::RoleRegistry;

/// What an investigator learns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Good,
    Evil,
    Neutral,
}

/// Which side a player wins with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Village,
    Werewolf,
    Neutral,
}

/// Closed set of roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleId {
    Villager,
    Werewolf,
    Minion,
    Sorcerer,
    Seer,
    Doctor,
    Mason,
    Lycan,
    Mayor,
    Hunter,
    Vigilante,
    Cupid,
    Tanner,
    Doppelganger,
}

impl RoleId {
    /// Every role, in declaration order.
    pub const ALL: [RoleId; 14] = [
        RoleId::Villager,
        RoleId::Werewolf,
        RoleId::Minion,
        RoleId::Sorcerer,
        RoleId::Seer,
        RoleId::Doctor,
        RoleId::Mason,
        RoleId::Lycan,
        RoleId::Mayor,
        RoleId::Hunter,
        RoleId::Vigilante,
        RoleId::Cupid,
        RoleId::Tanner,
        RoleId::Doppelganger,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            RoleId::Villager => "Villager",
            RoleId::Werewolf => "Werewolf",
            RoleId::Minion => "Minion",
            RoleId::Sorcerer => "Sorcerer",
            RoleId::Seer => "Seer",
            RoleId::Doctor => "Doctor",
            RoleId::Mason => "Mason",
            RoleId::Lycan => "Lycan",
            RoleId::Mayor => "Mayor",
            RoleId::Hunter => "Hunter",
            RoleId::Vigilante => "Vigilante",
            RoleId::Cupid => "Cupid",
            RoleId::Tanner => "Tanner",
            RoleId::Doppelganger => "Doppelganger",
        }
    }

    /// Base team printed on the card.
    #[must_use]
    pub const fn team(self) -> Team {
        match self {
            RoleId::Werewolf | RoleId::Minion | RoleId::Sorcerer => Team::Werewolf,
            RoleId::Tanner | RoleId::Doppelganger => Team::Neutral,
            _ => Team::Village,
        }
    }

    /// Base alignment printed on the card.
    #[must_use]
    pub const fn alignment(self) -> Alignment {
        match self.team() {
            Team::Village => Alignment::Good,
            Team::Werewolf => Alignment::Evil,
            Team::Neutral => Alignment::Neutral,
        }
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// When a role's night outcome runs relative to the werewolf kill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutcomeStage {
    /// Before the kill; may only set flags.
    Investigate,
    /// After the kill; an independent kill subject to protection.
    IndependentKill,
}

/// Deaths in the order they happened.
pub type Deaths = SmallVec<[PlayerId; 4]>;

/// Mutable view handed to `apply_night_outcome`.
pub struct NightOutcomeContext<'a> {
    pub registry: &'a RoleRegistry,
    pub players: &'a mut Roster,
    pub night: &'a NightActionState,
    pub deaths: &'a mut Deaths,
    pub vigilante_ammo: &'a mut OrdMap<PlayerId, u32>,
    pub protected: &'a OrdSet<PlayerId>,
}

impl NightOutcomeContext<'_> {
    /// Kill `target` unless it is unknown, already dead, or protected.
    ///
    /// Returns whether the target died.
    pub fn kill(&mut self, target: &PlayerId) -> bool {
        if self.protected.contains(target) {
            tracing::debug!(victim = %target, "kill blocked by protection");
            return false;
        }
        match self.players.get_mut(target) {
            Some(player) if player.alive => {
                player.alive = false;
                self.deaths.push(target.clone());
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!(victim = %target, "kill target is not in the roster");
                false
            }
        }
    }
}

/// Per-role behavior.
pub trait RoleCapability: Send + Sync + std::fmt::Debug {
    /// Role this descriptor implements.
    fn id(&self) -> RoleId;

    fn alignment(&self) -> Alignment {
        self.id().alignment()
    }

    fn team(&self) -> Team {
        self.id().team()
    }

    /// Balance weight; positive favors the village.
    fn weight(&self) -> i32;

    /// Seats occupied when the role is picked once.
    fn slots(&self) -> usize {
        1
    }

    /// The night step in which holders of this role wake.
    fn night_phase(&self) -> Option<NightPhase> {
        None
    }

    fn is_wake_up_phase(&self, phase: NightPhase) -> bool {
        self.night_phase() == Some(phase)
    }

    /// When `apply_night_outcome` runs, if at all.
    fn outcome_stage(&self) -> Option<OutcomeStage> {
        None
    }

    /// Reduce an intent to a state patch. `None` rejects the intent.
    ///
    /// Pure: must not look beyond its arguments.
    fn process_night_action(
        &self,
        _night: &NightActionState,
        _actor: &PlayerId,
        _action: &NightAction,
    ) -> Option<NightActionPatch> {
        None
    }

    /// Apply this role's part of the resolved night.
    fn apply_night_outcome(&self, _ctx: &mut NightOutcomeContext<'_>) {}

    /// Personal win condition evaluated ahead of the team strategies.
    fn check_win(&self, _player: &Player, _ctx: &WinContext<'_>) -> bool {
        false
    }

    /// Players this role learns about at role reveal.
    fn visible_teammates(&self, _player: &Player, _roster: &Roster) -> Vec<PlayerId> {
        Vec::new()
    }

    /// Role shown to a viewer holding `viewer`, if different from the real one.
    fn seen_role(&self, _viewer: RoleId) -> Option<RoleId> {
        None
    }

    /// Alignment shown to a viewer holding `viewer`, if different.
    fn seen_alignment(&self, _viewer: RoleId) -> Option<Alignment> {
        None
    }

    /// Weight of this role's day ballot.
    fn vote_weight(&self) -> u32 {
        1
    }

    /// Gets a revenge shot when it dies.
    fn has_revenge(&self) -> bool {
        false
    }

    /// Wins by being executed.
    fn wants_execution(&self) -> bool {
        false
    }

    /// Takes over the identity of its chosen target when the target dies.
    fn copies_on_death(&self) -> bool {
        false
    }

    /// Counts toward the werewolf pack for parity and village victory.
    fn is_pack_member(&self) -> bool {
        false
    }
}

/// Role `target` presents to a viewer.
pub fn apparent_role(target: &dyn RoleCapability, viewer: RoleId) -> RoleId {
    target.seen_role(viewer).unwrap_or_else(|| target.id())
}

/// Alignment `target` presents to a viewer.
pub fn apparent_alignment(target: &dyn RoleCapability, viewer: RoleId) -> Alignment {
    target
        .seen_alignment(viewer)
        .unwrap_or_else(|| target.alignment())
}

/// Other players in `roster` holding `role`.
pub(crate) fn others_with_role(player: &Player, roster: &Roster, role: RoleId) -> Vec<PlayerId> {
    roster
        .values()
        .filter(|p| p.id != player.id && p.has_role(role))
        .map(|p| p.id.clone())
        .collect()
}

/// Whether `death` is the execution of `player`.
pub(crate) fn executed(player: &Player, death: Option<&RecentDeath>) -> bool {
    matches!(death, Some(RecentDeath::Execution(id)) if *id == player.id)
}
