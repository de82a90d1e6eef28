//! Core engine types: players, phases, night intents, state, RNG, settings.
//!
//! Everything here is plain data. Behavior lives in `roles` (per-role
//! capabilities) and `rules` (resolution).

pub mod player;
pub mod phase;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;
pub mod error;

pub use player::{alive_players, roster_of, Player, PlayerFlags, PlayerId, Roster};
pub use phase::{NightPhase, PendingRevenge, Phase};
pub use rng::{FixedRandom, GameRng, RandomSource};
pub use config::GameSettings;
pub use action::{NightAction, NightActionPatch, NightActionState};
pub use state::{GameState, VoteTarget};
pub use error::{EngineError, SetupError};
