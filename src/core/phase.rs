//! Game phases.
//!
//! Exactly one `Phase` is active at a time. Night is subdivided into
//! `NightPhase` steps, walked in `NightPhase::ORDER` by the sequencer.

use serde::{Deserialize, Serialize};

use super::action::NightAction;
use super::player::PlayerId;

/// A step of the night in which one role category acts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NightPhase {
    CupidLink,
    DoppelgangerCopy,
    WerewolfKill,
    SorcererCheck,
    SeerInvestigate,
    DoctorProtect,
    MasonAcknowledge,
    VigilanteShoot,
}

impl NightPhase {
    /// Wake order for every night.
    pub const ORDER: [NightPhase; 8] = [
        NightPhase::CupidLink,
        NightPhase::DoppelgangerCopy,
        NightPhase::WerewolfKill,
        NightPhase::SorcererCheck,
        NightPhase::SeerInvestigate,
        NightPhase::DoctorProtect,
        NightPhase::MasonAcknowledge,
        NightPhase::VigilanteShoot,
    ];

    /// Position in `ORDER`.
    #[must_use]
    pub fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|p| *p == self)
            .unwrap_or(Self::ORDER.len())
    }

    /// Setup phases that only run until their choice has been made once.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, NightPhase::CupidLink | NightPhase::DoppelgangerCopy)
    }

    /// The action taken for every actor in a step with no choice to make.
    ///
    /// Passive steps get no timer and complete as soon as they are entered.
    #[must_use]
    pub fn passive_action(self) -> Option<NightAction> {
        match self {
            NightPhase::MasonAcknowledge => Some(NightAction::MasonReady),
            _ => None,
        }
    }
}

impl std::fmt::Display for NightPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NightPhase::CupidLink => "cupid-link",
            NightPhase::DoppelgangerCopy => "doppelganger-copy",
            NightPhase::WerewolfKill => "werewolf-kill",
            NightPhase::SorcererCheck => "sorcerer-check",
            NightPhase::SeerInvestigate => "seer-investigate",
            NightPhase::DoctorProtect => "doctor-protect",
            NightPhase::MasonAcknowledge => "mason-acknowledge",
            NightPhase::VigilanteShoot => "vigilante-shoot",
        };
        f.write_str(name)
    }
}

/// The active step of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Seating players, before roles are dealt.
    #[default]
    Lobby,
    /// Roles dealt; waiting for everyone to mark ready.
    RoleReveal,
    /// Between day and night; host starts the night from here.
    NightIntro,
    Night(NightPhase),
    /// Night deaths announced; discussion.
    DayReveal,
    DayVote,
    /// A revenge role died and owes a shot.
    HunterRevenge,
    GameOver,
}

impl Phase {
    /// Check if the phase is any night step.
    #[must_use]
    pub fn is_night(self) -> bool {
        matches!(self, Phase::Night(_))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Lobby => f.write_str("lobby"),
            Phase::RoleReveal => f.write_str("role-reveal"),
            Phase::NightIntro => f.write_str("night-intro"),
            Phase::Night(step) => write!(f, "night:{}", step),
            Phase::DayReveal => f.write_str("day-reveal"),
            Phase::DayVote => f.write_str("day-vote"),
            Phase::HunterRevenge => f.write_str("hunter-revenge"),
            Phase::GameOver => f.write_str("game-over"),
        }
    }
}

/// Revenge shots owed by dead players, taken one at a time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRevenge {
    /// The dead player who gets to shoot.
    pub shooter: PlayerId,
    /// Shooters waiting behind the current one.
    #[serde(default)]
    pub queued: Vec<PlayerId>,
    /// Phase to continue with once the last shot is resolved.
    pub resume: Phase,
    /// The day's executed player, when an execution started the shots.
    #[serde(default)]
    pub executed: Option<PlayerId>,
}

impl PendingRevenge {
    /// Queue `shooters` in order. `None` when nobody is owed a shot.
    #[must_use]
    pub fn from_shooters(
        shooters: impl IntoIterator<Item = PlayerId>,
        resume: Phase,
        executed: Option<PlayerId>,
    ) -> Option<Self> {
        let mut shooters = shooters.into_iter();
        let shooter = shooters.next()?;
        Some(Self {
            shooter,
            queued: shooters.collect(),
            resume,
            executed,
        })
    }
}
