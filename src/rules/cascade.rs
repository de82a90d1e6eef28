//! Death cascade.
//!
//! Secondary effects of a death, repeated until a pass changes nothing:
//! - **Lover pact**: one lover dead, the other alive and unprotected, so the
//!   other dies too.
//! - **Transformation**: a living copy-on-death player whose chosen target
//!   is dead takes over the target's role, alignment and team.
//!
//! The cascade never revives anyone, never kills the dead again, and
//! transforms each player at most once per call.

use im::OrdSet;
use rustc_hash::FxHashSet;

use crate::core::{GameState, PlayerId};
use crate::roles::{RoleId, RoleRegistry};

/// A role change caused by the cascade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transformation {
    pub player: PlayerId,
    pub from: RoleId,
    pub to: RoleId,
}

/// Everything a cascade did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Deaths caused by the lover pact, in order.
    pub secondary_deaths: Vec<PlayerId>,
    pub transformations: Vec<Transformation>,
}

impl CascadeReport {
    /// Check if the cascade changed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secondary_deaths.is_empty() && self.transformations.is_empty()
    }
}

/// Run the cascade to a fixpoint on a working copy of the state.
pub fn run_cascade(
    state: &mut GameState,
    registry: &RoleRegistry,
    protected: &OrdSet<PlayerId>,
) -> CascadeReport {
    let mut report = CascadeReport::default();
    let mut transformed: FxHashSet<PlayerId> = FxHashSet::default();

    loop {
        let mut changed = false;

        if let Some(victim) = lover_pact_victim(state, protected) {
            if let Some(player) = state.players.get_mut(&victim) {
                player.alive = false;
                tracing::debug!(player = %victim, "lover died of a broken heart");
                report.secondary_deaths.push(victim);
                changed = true;
            }
        }

        for transformation in transform_copiers(state, registry, &mut transformed) {
            report.transformations.push(transformation);
            changed = true;
        }

        if !changed {
            break;
        }
    }

    report
}

/// The surviving lover who should follow their partner, if any.
fn lover_pact_victim(state: &GameState, protected: &OrdSet<PlayerId>) -> Option<PlayerId> {
    let (a, b) = state.lovers.as_ref()?;
    [a, b].into_iter().find_map(|dead| {
        let survivor = state.partner_of(dead)?;
        let dead_gone = state.players.get(dead).is_some_and(|p| !p.alive);
        let follows = dead_gone && state.is_alive(survivor) && !protected.contains(survivor);
        follows.then(|| survivor.clone())
    })
}

fn transform_copiers(
    state: &mut GameState,
    registry: &RoleRegistry,
    transformed: &mut FxHashSet<PlayerId>,
) -> Vec<Transformation> {
    let Some(target_id) = state.doppelganger_target.clone() else {
        return Vec::new();
    };
    let Some(target) = state.players.get(&target_id).cloned() else {
        tracing::warn!(target = %target_id, "copy target is not in the roster");
        return Vec::new();
    };
    let Some(new_role) = target.role else {
        return Vec::new();
    };
    if target.alive {
        return Vec::new();
    }

    let copiers: Vec<PlayerId> = state
        .alive()
        .filter(|p| !transformed.contains(&p.id))
        .filter(|p| registry.for_player(p).is_some_and(|c| c.copies_on_death()))
        .map(|p| p.id.clone())
        .collect();

    let mut done = Vec::new();
    for id in copiers {
        let Some(player) = state.players.get_mut(&id) else { continue };
        let Some(from) = player.role else { continue };

        player.role = Some(new_role);
        player.alignment = target.alignment;
        player.team = target.team;
        transformed.insert(id.clone());
        tracing::debug!(player = %id, %from, to = %new_role, "copy-on-death transformation");

        if new_role == RoleId::Vigilante {
            state
                .vigilante_ammo
                .insert(id.clone(), state.settings.vigilante_ammo);
        }
        done.push(Transformation {
            player: id,
            from,
            to: new_role,
        });
    }

    if !done.is_empty() {
        state.doppelganger_target = None;
    }
    done
}
