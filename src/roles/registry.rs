//! Role registry for capability lookup.
//!
//! The `RoleRegistry` stores one capability per role. It is built once,
//! before a match starts, and only read afterwards; every resolver takes it
//! by reference.

use rustc_hash::FxHashMap;

use crate::core::{Player, PlayerId};

use super::capability::{OutcomeStage, RoleCapability, RoleId};
use super::neutral::{Doppelganger, Tanner};
use super::village::{Cupid, Doctor, Hunter, Lycan, Mason, Mayor, Seer, Vigilante, Villager};
use super::wolves::{Minion, Sorcerer, Werewolf};

/// Registry of role capabilities.
///
/// ## Example
///
/// ```
/// use werewolf_engine::roles::{RoleId, RoleRegistry};
///
/// let registry = RoleRegistry::standard();
///
/// let mayor = registry.get(RoleId::Mayor).unwrap();
/// assert_eq!(mayor.vote_weight(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: FxHashMap<RoleId, Box<dyn RoleCapability>>,
}

impl RoleRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in role.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Villager);
        registry.register(Werewolf);
        registry.register(Minion);
        registry.register(Sorcerer);
        registry.register(Seer);
        registry.register(Doctor);
        registry.register(Mason);
        registry.register(Lycan);
        registry.register(Mayor);
        registry.register(Hunter);
        registry.register(Vigilante);
        registry.register(Cupid);
        registry.register(Tanner);
        registry.register(Doppelganger);
        registry
    }

    /// Register a capability, replacing any previous one for the same role.
    ///
    /// Returns the replaced capability.
    pub fn register(
        &mut self,
        capability: impl RoleCapability + 'static,
    ) -> Option<Box<dyn RoleCapability>> {
        self.roles.insert(capability.id(), Box::new(capability))
    }

    /// Get the capability for a role.
    #[must_use]
    pub fn get(&self, id: RoleId) -> Option<&dyn RoleCapability> {
        self.roles.get(&id).map(|b| b.as_ref())
    }

    /// Capability of the role a player currently holds.
    ///
    /// `None` when the player has no role or the role is not registered.
    #[must_use]
    pub fn for_player(&self, player: &Player) -> Option<&dyn RoleCapability> {
        player.role.and_then(|id| self.get(id))
    }

    /// Capability lookup that logs a miss.
    ///
    /// A miss only affects the one player: callers skip them.
    #[must_use]
    pub fn for_player_or_warn(&self, player: &Player) -> Option<&dyn RoleCapability> {
        let capability = self.for_player(player);
        if capability.is_none() {
            tracing::warn!(player = %player.id, role = ?player.role, "no capability for player role");
        }
        capability
    }

    /// Check if a role is registered.
    #[must_use]
    pub fn contains(&self, id: RoleId) -> bool {
        self.roles.contains_key(&id)
    }

    /// Get the number of registered roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterate over capabilities in `RoleId` order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn RoleCapability> {
        let mut ids: Vec<_> = self.roles.keys().copied().collect();
        ids.sort();
        ids.into_iter().filter_map(move |id| self.get(id))
    }

    /// Capabilities whose night outcome runs at `stage`, in `RoleId` order.
    pub fn in_stage(&self, stage: OutcomeStage) -> impl Iterator<Item = &dyn RoleCapability> {
        self.iter().filter(move |c| c.outcome_stage() == Some(stage))
    }

    /// Check if a player counts toward the werewolf pack.
    #[must_use]
    pub fn is_pack_member(&self, player: &Player) -> bool {
        self.for_player(player).is_some_and(|c| c.is_pack_member())
    }

    /// Whether `player` could be the target of `viewer`'s pack vote.
    #[must_use]
    pub fn is_pack_target(&self, viewer: &PlayerId, target: &Player) -> bool {
        *viewer != target.id && !self.is_pack_member(target)
    }
}
