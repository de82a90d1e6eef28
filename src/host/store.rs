//! Room store: where snapshots live between intents.
//!
//! The store is the only shared resource. Writers send a `StatePatch`, a
//! shallow merge where every `Some` field replaces the whole top-level field
//! of the stored `GameState`. Subscribers receive the merged state after
//! every update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use im::{OrdMap, OrdSet, Vector};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    GameSettings, GameState, NightActionState, PendingRevenge, Phase, PlayerId, Roster, VoteTarget,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room already exists: {0}")]
    RoomExists(String),

    #[error("Snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Handle returned by `subscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked with every committed state.
pub type Subscriber = Arc<dyn Fn(&GameState) + Send + Sync>;

macro_rules! state_patch {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Shallow update of a stored `GameState`.
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        pub struct StatePatch {
            $(pub $field: Option<$ty>,)*
        }

        impl StatePatch {
            /// Fields of `new` that differ from `old`.
            #[must_use]
            pub fn diff(old: &GameState, new: &GameState) -> Self {
                Self {
                    $($field: (old.$field != new.$field).then(|| new.$field.clone()),)*
                }
            }

            /// Check if the patch changes nothing.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }

            /// Replace every field present in the patch.
            pub fn merge_into(self, state: &mut GameState) {
                $(if let Some(value) = self.$field {
                    state.$field = value;
                })*
            }
        }
    };
}

state_patch! {
    room_id: String,
    seed: u64,
    settings: GameSettings,
    host_id: Option<PlayerId>,
    phase: Phase,
    round: u32,
    phase_end_time: Option<i64>,
    players: Roster,
    night_actions: NightActionState,
    lovers: Option<(PlayerId, PlayerId)>,
    doppelganger_target: Option<PlayerId>,
    vigilante_ammo: OrdMap<PlayerId, u32>,
    pending_revenge: Option<PendingRevenge>,
    votes: OrdMap<PlayerId, VoteTarget>,
    locked_votes: OrdSet<PlayerId>,
    winners: Vector<PlayerId>,
    day_log: Vector<String>,
}

/// Persistence and change feed for rooms.
pub trait RoomStore: Send + Sync {
    /// Register a callback for every committed state of `room`.
    fn subscribe(&self, room: &str, callback: Subscriber) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);

    /// Current state of a room.
    fn snapshot(&self, room: &str) -> Result<GameState, StoreError>;

    /// Shallow-merge a patch and notify subscribers. Returns the merged state.
    fn update(&self, room: &str, patch: StatePatch) -> Result<GameState, StoreError>;
}

/// Process-local store holding bincode-encoded snapshots.
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: Mutex<FxHashMap<String, Vec<u8>>>,
    subscribers: Mutex<Vec<(SubscriptionId, String, Subscriber)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for InMemoryRoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRoomStore")
            .field("rooms", &self.rooms.lock().len())
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the initial state of a new room.
    pub fn create(&self, state: &GameState) -> Result<(), StoreError> {
        let bytes = state.to_bytes()?;
        let mut rooms = self.rooms.lock();
        if rooms.contains_key(&state.room_id) {
            return Err(StoreError::RoomExists(state.room_id.clone()));
        }
        rooms.insert(state.room_id.clone(), bytes);
        tracing::debug!(room = %state.room_id, "room created");
        Ok(())
    }

    fn notify(&self, room: &str, state: &GameState) {
        let callbacks: Vec<Subscriber> = self
            .subscribers
            .lock()
            .iter()
            .filter(|(_, r, _)| r == room)
            .map(|(_, _, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(state);
        }
    }
}

impl RoomStore for InMemoryRoomStore {
    fn subscribe(&self, room: &str, callback: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, room.to_string(), callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|(sub, _, _)| *sub != id);
    }

    fn snapshot(&self, room: &str) -> Result<GameState, StoreError> {
        let rooms = self.rooms.lock();
        let bytes = rooms
            .get(room)
            .ok_or_else(|| StoreError::RoomNotFound(room.to_string()))?;
        Ok(GameState::from_bytes(bytes)?)
    }

    fn update(&self, room: &str, patch: StatePatch) -> Result<GameState, StoreError> {
        let merged = {
            let mut rooms = self.rooms.lock();
            let bytes = rooms
                .get_mut(room)
                .ok_or_else(|| StoreError::RoomNotFound(room.to_string()))?;
            let mut state = GameState::from_bytes(bytes.as_slice())?;
            patch.merge_into(&mut state);
            *bytes = state.to_bytes()?;
            state
        };
        self.notify(room, &merged);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Player;

    fn lobby() -> GameState {
        GameState::new("room-1", 4, GameSettings::default())
            .with_player(Player::new("a", "Ann"))
            .with_player(Player::new("b", "Ben"))
    }

    #[test]
    fn test_diff_only_carries_changes() {
        let old = lobby();
        let mut new = old.clone();
        new.phase = Phase::RoleReveal;
        new.log("hello");

        let patch = StatePatch::diff(&old, &new);
        assert_eq!(patch.phase, Some(Phase::RoleReveal));
        assert!(patch.day_log.is_some());
        assert!(patch.players.is_none());
        assert!(StatePatch::diff(&new, &new).is_empty());
    }

    #[test]
    fn test_merge_reproduces_new_state() {
        let old = lobby();
        let mut new = old.clone();
        new.round = 3;
        new.lovers = Some((PlayerId::new("a"), PlayerId::new("b")));

        let mut merged = old.clone();
        StatePatch::diff(&old, &new).merge_into(&mut merged);
        assert_eq!(merged, new);
    }

    #[test]
    fn test_store_roundtrip_and_notifications() {
        let store = InMemoryRoomStore::new();
        store.create(&lobby()).unwrap();
        assert!(matches!(store.create(&lobby()), Err(StoreError::RoomExists(_))));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(
            "room-1",
            Arc::new(move |state: &GameState| sink.lock().push(state.round)),
        );

        let patch = StatePatch {
            round: Some(1),
            ..StatePatch::default()
        };
        let merged = store.update("room-1", patch.clone()).unwrap();
        assert_eq!(merged.round, 1);
        assert_eq!(store.snapshot("room-1").unwrap().round, 1);

        store.unsubscribe(id);
        store.update("room-1", StatePatch { round: Some(2), ..patch }).unwrap();
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_missing_room() {
        let store = InMemoryRoomStore::new();
        assert!(matches!(store.snapshot("nope"), Err(StoreError::RoomNotFound(_))));
        assert!(matches!(
            store.update("nope", StatePatch::default()),
            Err(StoreError::RoomNotFound(_))
        ));
    }
}
