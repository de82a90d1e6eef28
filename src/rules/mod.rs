//! Match rules.
//!
//! - `setup`: validation and dealing
//! - `sequencer`: which night step comes next
//! - `night`: resolving a night from the collected intents
//! - `cascade`: secondary effects of deaths
//! - `voting`: the day vote
//! - `revenge`: shots owed by dead revenge roles
//! - `win`: the win strategy chain
//! - `engine`: `GameEngine`, one method per UI intent
//!
//! Everything here is pure: a snapshot goes in and a new one comes out.

pub mod setup;
pub mod sequencer;
pub mod night;
pub mod cascade;
pub mod voting;
pub mod revenge;
pub mod win;
pub mod engine;

pub use cascade::{run_cascade, CascadeReport, Transformation};
pub use engine::{GameEngine, Investigation};
pub use night::{choose_wolf_target, night_rng, resolve_night, NightResolution};
pub use revenge::{owed_shots, resolve_revenge, RevengeResolution};
pub use sequencer::{next_night_phase, phase_complete, NextPhase};
pub use setup::{assign_roles, balance_score, validate_setup};
pub use voting::{resolve_votes, tally_votes, VoteOutcome, VoteResolution, VoteTally};
pub use win::{
    LoversStrategy, PersonalWinStrategy, RecentDeath, VillageStrategy, WerewolfStrategy,
    WinContext, WinEvaluator, WinOutcome, WinResult, WinStrategy,
};
