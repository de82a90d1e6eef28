//! # werewolf-engine
//!
//! A deterministic rules engine for Werewolf-style social deduction games.
//!
//! ## Design Principles
//!
//! 1. **Roles are data plus behavior**: each role is a stateless
//!    `RoleCapability` looked up in a `RoleRegistry`. Resolvers never match
//!    on role names.
//!
//! 2. **Snapshot in, snapshot out**: every rule takes a `GameState` by
//!    reference and returns a new one. Nothing is committed until a whole
//!    resolution succeeds.
//!
//! 3. **Replayable anywhere**: randomness is derived from the persisted seed
//!    and round, so any client taking over as host reproduces the same
//!    outcomes.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` for working
//!   copies of the state.
//!
//! - **Ordered Maps**: rosters and ballots are `OrdMap`s keyed by
//!   `PlayerId`, which fixes iteration order for tallies and tie-breaks.
//!
//! ## Modules
//!
//! - `core`: Players, phases, night intents, state, RNG, settings, errors
//! - `roles`: Role capabilities and the registry
//! - `rules`: Setup, sequencing, night resolution, cascade, voting, wins
//! - `host`: Room store, clocks, and the host session

pub mod core;
pub mod roles;
pub mod rules;
pub mod host;

// Re-export commonly used types
pub use crate::core::{
    EngineError, FixedRandom, GameRng, GameSettings, GameState, NightAction, NightActionState,
    NightPhase, Phase, Player, PlayerId, RandomSource, Roster, SetupError, VoteTarget,
};

pub use crate::roles::{Alignment, RoleCapability, RoleId, RoleRegistry, Team};

pub use crate::rules::{
    CascadeReport, GameEngine, NextPhase, NightResolution, RecentDeath, WinEvaluator, WinResult,
    WinStrategy,
};

pub use crate::host::{Clock, Host, InMemoryRoomStore, Intent, RoomStore, StatePatch, SystemClock};
