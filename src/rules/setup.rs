//! Game setup: validation and role dealing.

use crate::core::{GameRng, GameSettings, GameState, SetupError};
use crate::roles::{RoleId, RoleRegistry, Team};

fn slots_of(role: RoleId, registry: &RoleRegistry) -> usize {
    registry.get(role).map_or(1, |c| c.slots())
}

/// Check a roster size against the settings. Every problem is reported.
pub fn validate_setup(
    player_count: usize,
    settings: &GameSettings,
    registry: &RoleRegistry,
) -> Result<(), Vec<SetupError>> {
    let mut errors = Vec::new();

    if player_count < settings.min_players {
        errors.push(SetupError::TooFewPlayers {
            min: settings.min_players,
            actual: player_count,
        });
    }

    if settings.werewolf_count == 0 {
        errors.push(SetupError::NoWerewolves);
    }

    let needed = settings.werewolf_count
        + settings
            .special_roles
            .iter()
            .map(|role| slots_of(*role, registry))
            .sum::<usize>();
    if needed > player_count {
        errors.push(SetupError::InsufficientSlots {
            needed,
            available: player_count,
        });
    }

    let wolf_team = settings.werewolf_count
        + settings
            .special_roles
            .iter()
            .filter(|role| role.team() == Team::Werewolf)
            .map(|role| slots_of(*role, registry))
            .sum::<usize>();
    if settings.werewolf_count > 0 && wolf_team * 2 >= player_count {
        errors.push(SetupError::TooManyWerewolves {
            werewolves: wolf_team,
            players: player_count,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The unshuffled deck for `player_count` seats.
///
/// Specials first (expanded by their slot count), then werewolves, then
/// villagers to fill.
#[must_use]
pub fn build_deck(player_count: usize, settings: &GameSettings, registry: &RoleRegistry) -> Vec<RoleId> {
    let mut deck = Vec::with_capacity(player_count);
    for role in &settings.special_roles {
        deck.extend(std::iter::repeat(*role).take(slots_of(*role, registry)));
    }
    deck.extend(std::iter::repeat(RoleId::Werewolf).take(settings.werewolf_count));
    if deck.len() < player_count {
        deck.resize(player_count, RoleId::Villager);
    }
    deck.truncate(player_count);
    deck
}

/// Sum of role weights; positive favors the village.
#[must_use]
pub fn balance_score(deck: &[RoleId], registry: &RoleRegistry) -> i32 {
    deck.iter()
        .filter_map(|role| registry.get(*role))
        .map(|c| c.weight())
        .sum()
}

/// Validate, shuffle and deal one role per player in id order.
pub fn assign_roles(
    state: &GameState,
    registry: &RoleRegistry,
    rng: &mut GameRng,
) -> Result<GameState, Vec<SetupError>> {
    let count = state.players.len();
    validate_setup(count, &state.settings, registry)?;

    let mut deck = build_deck(count, &state.settings, registry);
    rng.shuffle(&mut deck);
    tracing::debug!(
        players = count,
        balance = balance_score(&deck, registry),
        "dealing roles"
    );

    let mut working = state.clone();
    let ids: Vec<_> = working.players.keys().cloned().collect();
    for (id, role) in ids.into_iter().zip(deck) {
        let Some(player) = working.players.get(&id).cloned() else { continue };
        let mut dealt = player.with_role(role);
        dealt.alive = true;
        dealt.flags = Default::default();
        if role == RoleId::Vigilante {
            working.vigilante_ammo.insert(id.clone(), working.settings.vigilante_ammo);
        }
        working.players.insert(id, dealt);
    }
    Ok(working)
}
