//! Error types.

use thiserror::Error;

use super::phase::Phase;
use super::player::PlayerId;

/// Why a game cannot start. Rendered as a list to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("At least {min} players are needed to start (have {actual})")]
    TooFewPlayers { min: usize, actual: usize },

    #[error("The game needs at least one werewolf")]
    NoWerewolves,

    #[error("Not enough seats for the chosen roles: {needed} needed, {available} players")]
    InsufficientSlots { needed: usize, available: usize },

    #[error("Too many on the werewolf team: {werewolves} of {players} players is half or more")]
    TooManyWerewolves { werewolves: usize, players: usize },
}

/// A rejected intent or failed resolution step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Action not allowed during {actual}")]
    WrongPhase { actual: Phase },

    #[error("Player {0} is not in this game")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} is dead")]
    PlayerDead(PlayerId),

    #[error("Player {0} has no role in the registry")]
    UnknownRole(PlayerId),

    #[error("Player {0} cannot act now")]
    NotEligible(PlayerId),

    #[error("Player {0} already committed")]
    AlreadyCommitted(PlayerId),

    #[error("Invalid target {target} for {actor}")]
    InvalidTarget { actor: PlayerId, target: PlayerId },

    #[error("Setup is invalid: {}", format_setup(.0))]
    Setup(Vec<SetupError>),

    #[error("The game is over")]
    GameOver,
}

fn format_setup(errors: &[SetupError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
