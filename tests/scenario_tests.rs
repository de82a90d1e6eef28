//! End-to-end match scenarios.
//!
//! Each test drives a match through `GameEngine` intents the way a host
//! would, then checks the resulting snapshot.

use werewolf_engine::core::{
    FixedRandom, GameSettings, GameState, NightAction, NightActionPatch, Phase, Player, PlayerId,
    VoteTarget,
};
use werewolf_engine::roles::{Alignment, RoleId, RoleRegistry, Team};
use werewolf_engine::rules::{resolve_night, GameEngine, WinEvaluator};

fn pid(s: &str) -> PlayerId {
    PlayerId::new(s)
}

/// A seated match at the night intro with roles already dealt.
fn match_with(roles: &[(&str, &str, RoleId)]) -> GameState {
    let mut state = roles.iter().fold(
        GameState::new("scenario", 77, GameSettings::default()),
        |state, (id, name, role)| state.with_player(Player::new(*id, *name).with_role(*role)),
    );
    state.phase = Phase::NightIntro;
    state
}

fn night_act(engine: &GameEngine, state: GameState, actor: &str, action: NightAction) -> GameState {
    engine
        .advance_night_phase(&state, &pid(actor), &action, 0)
        .unwrap_or_else(|e| panic!("{} could not act: {}", actor, e))
}

fn vote(engine: &GameEngine, state: GameState, voter: &str, target: &str) -> GameState {
    let state = engine
        .cast_vote(&state, &pid(voter), &VoteTarget::Player(pid(target)))
        .unwrap();
    engine.lock_vote(&state, &pid(voter)).unwrap()
}

/// Test that a unanimous pack vote kills its target.
#[test]
fn test_consensus_kill() {
    let engine = GameEngine::standard();
    let state = match_with(&[
        ("w1", "Wolf One", RoleId::Werewolf),
        ("w2", "Wolf Two", RoleId::Werewolf),
        ("a", "Ann", RoleId::Villager),
        ("b", "Ben", RoleId::Villager),
        ("c", "Cat", RoleId::Villager),
        ("d", "Dov", RoleId::Villager),
        ("x", "Xena", RoleId::Villager),
    ]);

    let state = engine.start_night_phase(&state, 0).unwrap();
    let state = night_act(&engine, state, "w1", NightAction::WerewolfVote(pid("x")));
    let state = night_act(&engine, state, "w2", NightAction::WerewolfVote(pid("x")));

    assert_eq!(state.phase, Phase::DayReveal);
    assert!(!state.is_alive(&pid("x")));
    assert_eq!(state.alive_count(), 6);
    assert!(state.day_log.iter().any(|line| line == "Xena died."));
}

/// Test that the mayor's double vote decides a split and can hand the wolves parity.
#[test]
fn test_mayor_tie_break_reaches_parity() {
    let engine = GameEngine::standard();
    let mut state = match_with(&[
        ("w1", "Wolf One", RoleId::Werewolf),
        ("w2", "Wolf Two", RoleId::Werewolf),
        ("m", "Mayor Mo", RoleId::Mayor),
        ("a", "Ann", RoleId::Villager),
        ("y", "Yan", RoleId::Villager),
    ]);
    state.phase = Phase::DayReveal;

    let state = engine.begin_voting(&state, 0).unwrap();
    let state = vote(&engine, state, "m", "y");
    let state = vote(&engine, state, "a", "y");
    let state = vote(&engine, state, "w1", "a");
    let state = vote(&engine, state, "w2", "m");
    let state = engine.resolve_voting(&state, 0).unwrap();

    assert!(!state.is_alive(&pid("y")));
    assert_eq!(state.day_log.back().map(String::as_str), Some("Yan was eliminated."));
    assert_eq!(state.phase, Phase::GameOver);
    let winners: Vec<PlayerId> = state.winners.iter().cloned().collect();
    assert_eq!(winners, vec![pid("w1"), pid("w2")]);
}

/// Test that a revenge shot at last night's protected player misses.
#[test]
fn test_revenge_on_protected_target() {
    let engine = GameEngine::standard();
    let state = match_with(&[
        ("w", "Wes", RoleId::Werewolf),
        ("h", "Hal", RoleId::Hunter),
        ("d", "Doc", RoleId::Doctor),
        ("p", "Pia", RoleId::Villager),
        ("a", "Ann", RoleId::Villager),
        ("b", "Ben", RoleId::Villager),
        ("c", "Cat", RoleId::Villager),
    ]);

    // Night: the wolf takes Ann, the doctor guards Pia.
    let state = engine.start_night_phase(&state, 0).unwrap();
    let state = night_act(&engine, state, "w", NightAction::WerewolfVote(pid("a")));
    let state = night_act(&engine, state, "d", NightAction::Protect(pid("p")));
    assert_eq!(state.phase, Phase::DayReveal);

    // Day: the village votes out the hunter.
    let state = engine.begin_voting(&state, 0).unwrap();
    let state = ["w", "d", "p", "b", "c"]
        .iter()
        .fold(state, |state, voter| vote(&engine, state, voter, "h"));
    let state = engine.resolve_voting(&state, 0).unwrap();
    assert_eq!(state.phase, Phase::HunterRevenge);

    let state = engine
        .handle_revenge_shot(&state, &pid("h"), Some(&pid("p")), 0)
        .unwrap();
    assert!(state.is_alive(&pid("p")));
    assert_eq!(state.day_log.back().map(String::as_str), Some("No one died."));
    assert_eq!(state.phase, Phase::NightIntro);
}

/// Test that a copy-on-death transformation changes only the copier and the victim.
#[test]
fn test_transformation_roster_diff() {
    let engine = GameEngine::standard();
    let before_night = match_with(&[
        ("w", "Wes", RoleId::Werewolf),
        ("g", "Gil", RoleId::Doppelganger),
        ("s", "Sia", RoleId::Seer),
        ("a", "Ann", RoleId::Villager),
        ("b", "Ben", RoleId::Villager),
        ("c", "Cat", RoleId::Villager),
    ]);

    let state = engine.start_night_phase(&before_night, 0).unwrap();
    assert_eq!(state.phase, Phase::Night(werewolf_engine::core::NightPhase::DoppelgangerCopy));
    let state = night_act(&engine, state, "g", NightAction::DoppelgangerPick(pid("s")));
    let state = night_act(&engine, state, "w", NightAction::WerewolfVote(pid("s")));
    let before = state.clone();
    let after = night_act(&engine, state, "s", NightAction::SeerCheck(pid("w")));

    let changed: Vec<&PlayerId> = before
        .players
        .iter()
        .filter(|(id, player)| after.players.get(*id) != Some(*player))
        .map(|(id, _)| id)
        .collect();
    assert_eq!(changed, vec![&pid("g"), &pid("s")]);

    let copier = &after.players[&pid("g")];
    assert_eq!(before.players[&pid("g")].role, Some(RoleId::Doppelganger));
    assert_eq!(copier.role, Some(RoleId::Seer));
    assert_eq!(copier.team, Team::Village);
    assert_eq!(copier.alignment, Alignment::Good);
    assert!(copier.alive);
    assert!(!after.players[&pid("s")].alive);
    assert_eq!(after.doppelganger_target, None);
}

/// Test that the day log names the pack's victim but not the lover who followed.
#[test]
fn test_lover_cascade_names_only_direct_death() {
    let engine = GameEngine::standard();
    let state = match_with(&[
        ("cu", "Cupid", RoleId::Cupid),
        ("w1", "Wolf One", RoleId::Werewolf),
        ("w2", "Wolf Two", RoleId::Werewolf),
        ("a", "Ann", RoleId::Villager),
        ("b", "Ben", RoleId::Villager),
        ("x", "Xia", RoleId::Villager),
        ("y", "Yul", RoleId::Villager),
    ]);

    let state = engine.start_night_phase(&state, 0).unwrap();
    let state = night_act(&engine, state, "cu", NightAction::CupidLink(pid("a"), pid("b")));
    let state = night_act(&engine, state, "w1", NightAction::WerewolfVote(pid("a")));
    let state = night_act(&engine, state, "w2", NightAction::WerewolfVote(pid("a")));

    assert!(!state.is_alive(&pid("a")));
    assert!(!state.is_alive(&pid("b")));
    assert_eq!(state.day_log.back().map(String::as_str), Some("Ann died."));
    assert_eq!(state.phase, Phase::DayReveal);
}

/// Test that a split pack vote with a minimal random draw takes the first target listed.
#[test]
fn test_split_vote_with_minimum_rng_takes_first_listed() {
    let mut state = match_with(&[
        ("w1", "Wolf One", RoleId::Werewolf),
        ("w2", "Wolf Two", RoleId::Werewolf),
        ("a", "Ann", RoleId::Villager),
        ("b", "Ben", RoleId::Villager),
        ("c", "Cat", RoleId::Villager),
        ("d", "Dov", RoleId::Villager),
    ]);
    state.night_actions.apply(NightActionPatch::WerewolfVote {
        actor: pid("w1"),
        target: pid("c"),
    });
    state.night_actions.apply(NightActionPatch::WerewolfVote {
        actor: pid("w2"),
        target: pid("a"),
    });

    let registry = RoleRegistry::standard();
    let evaluator = WinEvaluator::standard();
    for _ in 0..3 {
        let resolution = resolve_night(&state, &registry, &evaluator, &mut FixedRandom(0.0), 0);
        assert_eq!(resolution.direct_deaths, vec![pid("c")]);
        assert_eq!(resolution.summary, "Cat died.");
    }
}

/// Test that a match runs from the lobby to the first day on timeouts alone.
#[test]
fn test_full_match_from_lobby() {
    let engine = GameEngine::standard();
    let lobby = (0..6).fold(GameState::new("full", 5, GameSettings::default()), |state, i| {
        let id = format!("p{}", i);
        state.with_player(Player::new(id.as_str(), format!("Player {}", i)))
    });

    let mut state = engine.start_game(&lobby).unwrap();
    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        state = engine.mark_ready(&state, id).unwrap();
    }
    assert_eq!(state.phase, Phase::NightIntro);

    // Let every deadline lapse until the game ends or the vote opens.
    let mut now = 0;
    state = engine.start_night_phase(&state, now).unwrap();
    while state.phase.is_night() {
        now += 30_000;
        state = engine.force_advance(&state, now).unwrap();
    }
    assert_eq!(state.phase, Phase::DayReveal);
    assert_eq!(state.day_log.back().map(String::as_str), Some("No one died."));
    assert_eq!(state.round, 1);
}
