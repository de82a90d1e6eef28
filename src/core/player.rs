//! Player identification and the per-match roster.
//!
//! ## PlayerId
//!
//! Opaque identifier handed out by the room store (an auth uid in practice).
//! Ordered, so every walk over the roster is deterministic.
//!
//! ## Roster
//!
//! `im::OrdMap` keyed by `PlayerId`. Cloning is O(1), which lets every
//! resolution step work on its own copy and swap it in on success.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use crate::roles::{Alignment, RoleId, Team};

/// Player identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Short-lived per-player flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFlags {
    /// Acknowledged their role card.
    pub ready: bool,
    /// Sorcerer has located the Seer.
    pub found_seer: bool,
}

/// A seated player.
///
/// Role, alignment and team are copied from the role capability when roles
/// are dealt. Only a transformation rewrites them afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// `None` until roles are dealt.
    pub role: Option<RoleId>,
    pub alive: bool,
    pub alignment: Alignment,
    pub team: Team,
    pub flags: PlayerFlags,
}

impl Player {
    /// Create a seated, living player without a role.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: None,
            alive: true,
            alignment: Alignment::Good,
            team: Team::Village,
            flags: PlayerFlags::default(),
        }
    }

    /// Builder: seat the player with a role already assigned.
    #[must_use]
    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self.alignment = role.alignment();
        self.team = role.team();
        self
    }

    /// Check whether the player currently holds `role`.
    #[must_use]
    pub fn has_role(&self, role: RoleId) -> bool {
        self.role == Some(role)
    }
}

/// All players of a match.
pub type Roster = OrdMap<PlayerId, Player>;

/// Build a roster from players, keyed by their ids.
pub fn roster_of(players: impl IntoIterator<Item = Player>) -> Roster {
    players.into_iter().map(|p| (p.id.clone(), p)).collect()
}

/// Iterate over living players in id order.
pub fn alive_players(roster: &Roster) -> impl Iterator<Item = &Player> {
    roster.values().filter(|p| p.alive)
}
