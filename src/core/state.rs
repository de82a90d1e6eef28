//! Game state: the single snapshot persisted in the room store.
//!
//! ## GameState
//!
//! Everything needed to continue a match from any host:
//! - Phase, round, seed
//! - Roster, night intents, day ballots
//! - Lovers pair, copy target, vigilante ammo
//! - Winners (append-only) and the day log
//!
//! Uses `im` persistent data structures so resolution steps can clone the
//! whole state in O(1) and only swap in the copy when every step succeeds.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::action::NightActionState;
use super::config::GameSettings;
use super::error::EngineError;
use super::phase::{PendingRevenge, Phase};
use super::player::{alive_players, Player, PlayerId, Roster};

/// A day ballot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoteTarget {
    Player(PlayerId),
    Skip,
}

/// Complete match state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Identity ===
    pub room_id: String,
    /// Root seed; every random stream is derived from it.
    pub seed: u64,
    pub settings: GameSettings,
    /// Client currently authoritative for running the engine.
    pub host_id: Option<PlayerId>,

    // === Progression ===
    pub phase: Phase,
    /// Night counter, starts at 0 and increments when a night begins.
    pub round: u32,
    /// Epoch milliseconds at which the current phase auto-advances.
    pub phase_end_time: Option<i64>,

    // === Players ===
    pub players: Roster,

    // === Night ===
    pub night_actions: NightActionState,
    pub lovers: Option<(PlayerId, PlayerId)>,
    pub doppelganger_target: Option<PlayerId>,
    pub vigilante_ammo: OrdMap<PlayerId, u32>,
    pub pending_revenge: Option<PendingRevenge>,

    // === Day ===
    pub votes: OrdMap<PlayerId, VoteTarget>,
    pub locked_votes: OrdSet<PlayerId>,

    // === Outcome ===
    /// Append-only.
    pub winners: Vector<PlayerId>,
    pub day_log: Vector<String>,
}

impl GameState {
    /// Create an empty lobby.
    #[must_use]
    pub fn new(room_id: impl Into<String>, seed: u64, settings: GameSettings) -> Self {
        Self {
            room_id: room_id.into(),
            seed,
            settings,
            host_id: None,
            phase: Phase::Lobby,
            round: 0,
            phase_end_time: None,
            players: Roster::new(),
            night_actions: NightActionState::new(),
            lovers: None,
            doppelganger_target: None,
            vigilante_ammo: OrdMap::new(),
            pending_revenge: None,
            votes: OrdMap::new(),
            locked_votes: OrdSet::new(),
            winners: Vector::new(),
            day_log: Vector::new(),
        }
    }

    /// Builder: seat a player.
    #[must_use]
    pub fn with_player(mut self, player: Player) -> Self {
        self.players.insert(player.id.clone(), player);
        self
    }

    // === Players ===

    /// Look up a player.
    pub fn player(&self, id: &PlayerId) -> Result<&Player, EngineError> {
        self.players
            .get(id)
            .ok_or_else(|| EngineError::UnknownPlayer(id.clone()))
    }

    /// Look up a player that must be alive.
    pub fn living_player(&self, id: &PlayerId) -> Result<&Player, EngineError> {
        let player = self.player(id)?;
        if !player.alive {
            return Err(EngineError::PlayerDead(id.clone()));
        }
        Ok(player)
    }

    /// Check if a player exists and is alive.
    #[must_use]
    pub fn is_alive(&self, id: &PlayerId) -> bool {
        self.players.get(id).is_some_and(|p| p.alive)
    }

    /// Living players in id order.
    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        alive_players(&self.players)
    }

    /// Number of living players.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Display name for a player id, falling back to the id.
    #[must_use]
    pub fn name_of(&self, id: &PlayerId) -> String {
        self.players
            .get(id)
            .map_or_else(|| id.to_string(), |p| p.name.clone())
    }

    // === Lovers ===

    /// The other half of a lovers pair.
    #[must_use]
    pub fn partner_of(&self, id: &PlayerId) -> Option<&PlayerId> {
        match &self.lovers {
            Some((a, b)) if a == id => Some(b),
            Some((a, b)) if b == id => Some(a),
            _ => None,
        }
    }

    // === Outcome ===

    /// Union winners into the append-only list.
    pub fn add_winners<'a>(&mut self, ids: impl IntoIterator<Item = &'a PlayerId>) {
        for id in ids {
            if !self.winners.contains(id) {
                self.winners.push_back(id.clone());
            }
        }
    }

    /// Append a line to the day log.
    pub fn log(&mut self, line: impl Into<String>) {
        self.day_log.push_back(line.into());
    }

    /// Move to `phase`, optionally with a deadline.
    pub fn set_phase(&mut self, phase: Phase, phase_end_time: Option<i64>) {
        self.phase = phase;
        self.phase_end_time = phase_end_time;
    }

    /// Check if the current phase deadline has passed.
    #[must_use]
    pub fn deadline_passed(&self, now_ms: i64) -> bool {
        self.phase_end_time.is_some_and(|end| now_ms >= end)
    }

    // === Persistence ===

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode a stored snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
