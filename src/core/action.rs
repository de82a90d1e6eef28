//! Night intents and the state they accumulate into.
//!
//! Actors submit a `NightAction`. The actor's role capability reduces it to a
//! `NightActionPatch`, which `NightActionState::apply` merges in. The state
//! is only read once, by the night resolver, after the last phase.

use im::{OrdMap, OrdSet};
use serde::{Deserialize, Serialize};

use super::phase::NightPhase;
use super::player::PlayerId;

/// An intent submitted by one actor during the night.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NightAction {
    /// Werewolf ballot for tonight's kill.
    WerewolfVote(PlayerId),
    /// Doctor protection.
    Protect(PlayerId),
    /// Seer investigation.
    SeerCheck(PlayerId),
    /// Sorcerer looking for the Seer.
    SorcererCheck(PlayerId),
    /// Cupid links two players.
    CupidLink(PlayerId, PlayerId),
    /// Doppelganger chooses whom to become.
    DoppelgangerPick(PlayerId),
    /// Vigilante shot; `None` holds fire.
    VigilanteShoot(Option<PlayerId>),
    /// Mason acknowledges the other masons.
    MasonReady,
}

impl NightAction {
    /// Players this action points at.
    #[must_use]
    pub fn targets(&self) -> Vec<&PlayerId> {
        match self {
            NightAction::WerewolfVote(t)
            | NightAction::Protect(t)
            | NightAction::SeerCheck(t)
            | NightAction::SorcererCheck(t)
            | NightAction::DoppelgangerPick(t) => vec![t],
            NightAction::CupidLink(a, b) => vec![a, b],
            NightAction::VigilanteShoot(t) => t.iter().collect(),
            NightAction::MasonReady => vec![],
        }
    }
}

/// Partial update produced by a role reducer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NightActionPatch {
    WerewolfVote { actor: PlayerId, target: PlayerId },
    Protect { actor: PlayerId, target: PlayerId },
    SeerCheck { actor: PlayerId, target: PlayerId },
    SorcererCheck { actor: PlayerId, target: PlayerId },
    CupidLinks { actor: PlayerId, pair: (PlayerId, PlayerId) },
    DoppelgangerPick { actor: PlayerId, target: PlayerId },
    VigilanteTarget { actor: PlayerId, target: Option<PlayerId> },
    MasonReady { actor: PlayerId },
}

impl NightActionPatch {
    /// The submitting actor.
    #[must_use]
    pub fn actor(&self) -> &PlayerId {
        match self {
            NightActionPatch::WerewolfVote { actor, .. }
            | NightActionPatch::Protect { actor, .. }
            | NightActionPatch::SeerCheck { actor, .. }
            | NightActionPatch::SorcererCheck { actor, .. }
            | NightActionPatch::CupidLinks { actor, .. }
            | NightActionPatch::DoppelgangerPick { actor, .. }
            | NightActionPatch::VigilanteTarget { actor, .. }
            | NightActionPatch::MasonReady { actor } => actor,
        }
    }

    /// The night phase this patch belongs to.
    #[must_use]
    pub fn phase(&self) -> NightPhase {
        match self {
            NightActionPatch::WerewolfVote { .. } => NightPhase::WerewolfKill,
            NightActionPatch::Protect { .. } => NightPhase::DoctorProtect,
            NightActionPatch::SeerCheck { .. } => NightPhase::SeerInvestigate,
            NightActionPatch::SorcererCheck { .. } => NightPhase::SorcererCheck,
            NightActionPatch::CupidLinks { .. } => NightPhase::CupidLink,
            NightActionPatch::DoppelgangerPick { .. } => NightPhase::DoppelgangerCopy,
            NightActionPatch::VigilanteTarget { .. } => NightPhase::VigilanteShoot,
            NightActionPatch::MasonReady { .. } => NightPhase::MasonAcknowledge,
        }
    }
}

/// Everything submitted during one night, keyed by actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightActionState {
    pub werewolf_votes: OrdMap<PlayerId, PlayerId>,
    pub doctor_protect: OrdMap<PlayerId, PlayerId>,
    pub seer_check: OrdMap<PlayerId, PlayerId>,
    pub sorcerer_check: OrdMap<PlayerId, PlayerId>,
    pub cupid_links: OrdMap<PlayerId, (PlayerId, PlayerId)>,
    pub doppelganger_pick: OrdMap<PlayerId, PlayerId>,
    pub vigilante_target: OrdMap<PlayerId, Option<PlayerId>>,
    pub masons_ready: OrdSet<PlayerId>,
    /// Who has committed in which phase.
    pub acted: OrdSet<(NightPhase, PlayerId)>,
}

impl NightActionState {
    /// Create an empty night.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a reducer patch and record the actor as committed.
    pub fn apply(&mut self, patch: NightActionPatch) {
        self.acted.insert((patch.phase(), patch.actor().clone()));
        match patch {
            NightActionPatch::WerewolfVote { actor, target } => {
                self.werewolf_votes.insert(actor, target);
            }
            NightActionPatch::Protect { actor, target } => {
                self.doctor_protect.insert(actor, target);
            }
            NightActionPatch::SeerCheck { actor, target } => {
                self.seer_check.insert(actor, target);
            }
            NightActionPatch::SorcererCheck { actor, target } => {
                self.sorcerer_check.insert(actor, target);
            }
            NightActionPatch::CupidLinks { actor, pair } => {
                self.cupid_links.insert(actor, pair);
            }
            NightActionPatch::DoppelgangerPick { actor, target } => {
                self.doppelganger_pick.insert(actor, target);
            }
            NightActionPatch::VigilanteTarget { actor, target } => {
                self.vigilante_target.insert(actor, target);
            }
            NightActionPatch::MasonReady { actor } => {
                self.masons_ready.insert(actor);
            }
        }
    }

    /// Check if `actor` has already committed in `phase`.
    #[must_use]
    pub fn has_acted(&self, phase: NightPhase, actor: &PlayerId) -> bool {
        self.acted.contains(&(phase, actor.clone()))
    }

    /// Everyone protected tonight.
    #[must_use]
    pub fn protected(&self) -> OrdSet<PlayerId> {
        self.doctor_protect.values().cloned().collect()
    }

    /// Check if `player` is protected tonight.
    #[must_use]
    pub fn is_protected(&self, player: &PlayerId) -> bool {
        self.doctor_protect.values().any(|p| p == player)
    }
}
