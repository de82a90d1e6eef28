//! Match configuration.

use serde::{Deserialize, Serialize};

use crate::roles::RoleId;

/// Host-chosen settings for a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Smallest roster that may start a game.
    pub min_players: usize,

    /// Number of werewolves dealt.
    pub werewolf_count: usize,

    /// Special roles dealt once each (a Mason entry seats a pair).
    /// Remaining seats are filled with villagers.
    pub special_roles: Vec<RoleId>,

    /// Whether targeted night actions may pick the actor themselves.
    pub allow_self_target: bool,

    /// Whether an executed Tanner ends the game or play continues.
    pub tanner_win_ends_game: bool,

    /// Shots each Vigilante starts with.
    pub vigilante_ammo: u32,

    /// Seconds each actor-input night phase stays open.
    pub night_phase_secs: u32,

    /// Seconds the day vote stays open.
    pub vote_secs: u32,

    /// Seconds a revenge role has to take its shot.
    pub revenge_secs: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_players: 5,
            werewolf_count: 1,
            special_roles: vec![RoleId::Seer, RoleId::Doctor],
            allow_self_target: false,
            tanner_win_ends_game: true,
            vigilante_ammo: 1,
            night_phase_secs: 30,
            vote_secs: 60,
            revenge_secs: 30,
        }
    }
}

impl GameSettings {
    /// Set the number of werewolves.
    pub fn with_werewolves(mut self, count: usize) -> Self {
        self.werewolf_count = count;
        self
    }

    /// Replace the special role list.
    pub fn with_special_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.special_roles = roles.into_iter().collect();
        self
    }

    /// Set the minimum roster size.
    pub fn with_min_players(mut self, min: usize) -> Self {
        self.min_players = min;
        self
    }

    /// Allow or forbid self-targeting.
    pub fn with_self_target(mut self, allowed: bool) -> Self {
        self.allow_self_target = allowed;
        self
    }

    /// Choose whether a Tanner win ends the game.
    pub fn with_tanner_ends_game(mut self, ends: bool) -> Self {
        self.tanner_win_ends_game = ends;
        self
    }

    /// Phase timer for a night step, in milliseconds.
    #[must_use]
    pub fn night_phase_ms(&self) -> i64 {
        i64::from(self.night_phase_secs) * 1000
    }

    /// Vote timer, in milliseconds.
    #[must_use]
    pub fn vote_ms(&self) -> i64 {
        i64::from(self.vote_secs) * 1000
    }

    /// Revenge timer, in milliseconds.
    #[must_use]
    pub fn revenge_ms(&self) -> i64 {
        i64::from(self.revenge_secs) * 1000
    }
}
