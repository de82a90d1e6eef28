//! The host: the one client allowed to run the engine for a room.
//!
//! Every intent follows the same path: read the snapshot, check that this
//! client still holds the room, run the engine, diff the old and new states,
//! commit the patch. Rejected intents never reach the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{EngineError, GameState, NightAction, Phase, PlayerId, VoteTarget};
use crate::rules::GameEngine;

use super::clock::Clock;
use super::store::{RoomStore, StatePatch, StoreError};

/// Inbound UI actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    StartGame,
    MarkReady(PlayerId),
    StartNightPhase,
    AdvanceNightPhase { actor: PlayerId, action: NightAction },
    BeginVoting,
    CastVote { voter: PlayerId, target: VoteTarget },
    LockVote(PlayerId),
    ResolveVoting,
    RevengeShot { shooter: PlayerId, target: Option<PlayerId> },
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Room is hosted by {current:?}")]
    NotHost { current: Option<PlayerId> },
}

/// Runs the engine for one room on behalf of one client.
pub struct Host<S: RoomStore, C: Clock> {
    store: Arc<S>,
    engine: Arc<GameEngine>,
    clock: C,
    room_id: String,
    host_id: PlayerId,
}

impl<S: RoomStore, C: Clock> std::fmt::Debug for Host<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("room_id", &self.room_id)
            .field("host_id", &self.host_id)
            .finish()
    }
}

impl<S: RoomStore, C: Clock> Host<S, C> {
    /// Take over a room and catch up on any deadline that expired meanwhile.
    ///
    /// Everything the engine needs lives in the snapshot, so a successor
    /// continues exactly where the previous host stopped.
    pub fn claim(
        store: Arc<S>,
        engine: Arc<GameEngine>,
        clock: C,
        room_id: impl Into<String>,
        host_id: PlayerId,
    ) -> Result<Self, HostError> {
        let host = Self {
            store,
            engine,
            clock,
            room_id: room_id.into(),
            host_id,
        };

        let state = host.store.snapshot(&host.room_id)?;
        if state.host_id.as_ref() != Some(&host.host_id) {
            let patch = StatePatch {
                host_id: Some(Some(host.host_id.clone())),
                ..StatePatch::default()
            };
            host.store.update(&host.room_id, patch)?;
            tracing::info!(room = %host.room_id, host = %host.host_id, "host claimed room");
        }
        host.tick()?;
        Ok(host)
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn host_id(&self) -> &PlayerId {
        &self.host_id
    }

    /// Current snapshot.
    pub fn state(&self) -> Result<GameState, HostError> {
        Ok(self.store.snapshot(&self.room_id)?)
    }

    fn held_snapshot(&self) -> Result<GameState, HostError> {
        let state = self.state()?;
        if state.host_id.as_ref() != Some(&self.host_id) {
            return Err(HostError::NotHost {
                current: state.host_id,
            });
        }
        Ok(state)
    }

    fn commit(&self, old: &GameState, new: &GameState) -> Result<GameState, HostError> {
        let patch = StatePatch::diff(old, new);
        if patch.is_empty() {
            return Ok(new.clone());
        }
        Ok(self.store.update(&self.room_id, patch)?)
    }

    /// Apply one intent and commit the result.
    pub fn dispatch(&self, intent: Intent) -> Result<GameState, HostError> {
        let state = self.held_snapshot()?;
        let now = self.clock.now_ms();

        let next = match self.apply(&state, &intent, now) {
            Ok(next) => next,
            Err(err) => {
                tracing::debug!(room = %self.room_id, ?intent, %err, "intent rejected");
                return Err(err.into());
            }
        };
        self.commit(&state, &next)
    }

    fn apply(&self, state: &GameState, intent: &Intent, now: i64) -> Result<GameState, EngineError> {
        let engine = &self.engine;
        match intent {
            Intent::StartGame => engine.start_game(state),
            Intent::MarkReady(player) => engine.mark_ready(state, player),
            Intent::StartNightPhase => engine.start_night_phase(state, now),
            Intent::AdvanceNightPhase { actor, action } => {
                engine.advance_night_phase(state, actor, action, now)
            }
            Intent::BeginVoting => engine.begin_voting(state, now),
            Intent::CastVote { voter, target } => engine.cast_vote(state, voter, target),
            Intent::LockVote(voter) => {
                let next = engine.lock_vote(state, voter)?;
                if engine.all_votes_locked(&next) {
                    return engine.resolve_voting(&next, now);
                }
                Ok(next)
            }
            Intent::ResolveVoting => engine.resolve_voting(state, now),
            Intent::RevengeShot { shooter, target } => {
                engine.handle_revenge_shot(state, shooter, target.as_ref(), now)
            }
        }
    }

    /// Enforce the phase deadline. Returns whether anything changed.
    pub fn tick(&self) -> Result<bool, HostError> {
        let state = self.held_snapshot()?;
        let now = self.clock.now_ms();
        if !state.deadline_passed(now) {
            return Ok(false);
        }

        tracing::debug!(room = %self.room_id, phase = %state.phase, "phase deadline passed");
        let next = self.engine.force_advance(&state, now)?;
        self.commit(&state, &next)?;
        Ok(true)
    }

    /// Check if the match has ended.
    pub fn is_over(&self) -> Result<bool, HostError> {
        Ok(self.state()?.phase == Phase::GameOver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameSettings, Player};
    use crate::host::clock::ManualClock;
    use crate::host::store::InMemoryRoomStore;

    fn seated_room(store: &InMemoryRoomStore) {
        let state = (0..5).fold(GameState::new("room", 21, GameSettings::default()), |s, i| {
            let id = format!("p{}", i);
            s.with_player(Player::new(id.as_str(), format!("Player {}", i)))
        });
        store.create(&state).unwrap();
    }

    #[test]
    fn test_dispatch_commits_and_rejects() {
        let store = Arc::new(InMemoryRoomStore::new());
        seated_room(&store);
        let host = Host::claim(
            Arc::clone(&store),
            Arc::new(GameEngine::standard()),
            ManualClock::at_ms(0),
            "room",
            PlayerId::new("p0"),
        )
        .unwrap();

        let state = host.dispatch(Intent::StartGame).unwrap();
        assert_eq!(state.phase, Phase::RoleReveal);
        assert_eq!(store.snapshot("room").unwrap(), state);

        let err = host.dispatch(Intent::StartGame).unwrap_err();
        assert!(matches!(err, HostError::Engine(EngineError::WrongPhase { .. })));
        assert_eq!(store.snapshot("room").unwrap(), state);
    }

    #[test]
    fn test_displaced_host_is_refused() {
        let store = Arc::new(InMemoryRoomStore::new());
        seated_room(&store);
        let engine = Arc::new(GameEngine::standard());
        let first = Host::claim(
            Arc::clone(&store),
            Arc::clone(&engine),
            ManualClock::at_ms(0),
            "room",
            PlayerId::new("p0"),
        )
        .unwrap();
        let _second = Host::claim(
            Arc::clone(&store),
            engine,
            ManualClock::at_ms(0),
            "room",
            PlayerId::new("p1"),
        )
        .unwrap();

        assert!(matches!(
            first.dispatch(Intent::StartGame),
            Err(HostError::NotHost { current: Some(id) }) if id == PlayerId::new("p1")
        ));
    }
}
