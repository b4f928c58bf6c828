//! End-to-end gameplay scenarios through the public API

use glam::Vec2;

use rocket_man::audio::SoundEffect;
use rocket_man::consts::{PLAYER_MAX_HP, SIM_DT};
use rocket_man::highscores::{FileScoreStore, HighScore, ScoreStore};
use rocket_man::input::{Control, InputEvent, InputState};
use rocket_man::sim::collision::{resolve_player_bullets, resolve_rocket_bullets};
use rocket_man::sim::effects::{ROCKET_BURST_LEN, SHIP_BURST_LEN};
use rocket_man::sim::{Bullet, GameEvent, GamePhase, GameState, Rocket, TickInput, menu, tick};

fn step(state: &mut GameState, events: Vec<InputEvent>) {
    let input = TickInput {
        held: InputState::default(),
        events,
        now_ms: 0,
    };
    tick(state, &input, SIM_DT);
}

fn press(control: Control) -> InputEvent {
    InputEvent::Press(control)
}

/// Title screen through name entry into a running game
fn start_game(name: &str) -> GameState {
    let mut state = GameState::new(800.0, 600.0, 99, HighScore::default());
    let mut events = vec![press(Control::Confirm)];
    events.extend(name.chars().map(InputEvent::Char));
    events.push(press(Control::Confirm));
    step(&mut state, events);
    assert_eq!(state.phase, GamePhase::Playing);
    // Keep random spawns out of the scenario
    state.rockets.clear();
    state.rocket_bullets.clear();
    state.spawn_timer = -1e6;
    state.drain_events();
    state
}

/// Put `bullet`'s centre on `target`
fn aim(mut bullet: Bullet, target: Vec2) -> Bullet {
    bullet.pos = target - Vec2::new(bullet.size, bullet.size / 4.0);
    bullet
}

#[test]
fn test_tenth_kill_restores_health() {
    let mut state = start_game("ACE");
    state.score = 9;
    state.player.hp = 5.0;

    let mut rocket = Rocket::spawn(300.0);
    rocket.pos.y = 200.0;
    rocket.hp = 1.0;
    let target = rocket.center();
    state.rockets.push(rocket);
    state.bullets.push(aim(Bullet::small(Vec2::ZERO, 0.0), target));

    resolve_player_bullets(&mut state);

    assert_eq!(state.score, 10);
    assert_eq!(state.player.hp, PLAYER_MAX_HP);
    assert!(state.rockets.is_empty());
    assert!(state.bullets.is_empty());
    // Hit spark plus the burst
    assert_eq!(state.effects.len(), 1 + ROCKET_BURST_LEN);
    assert_eq!(
        state.drain_events(),
        vec![
            GameEvent::Sound(SoundEffect::Hit),
            GameEvent::Sound(SoundEffect::Destroy),
        ]
    );
}

#[test]
fn test_enemy_bullet_ends_game() {
    let mut state = start_game("ACE");
    state.player.hp = 5.0;
    let target = state.player.center();
    state.rocket_bullets.push(aim(Bullet::enemy(Vec2::ZERO), target));

    resolve_rocket_bullets(&mut state);

    assert!(!state.player.alive);
    assert_eq!(state.player.hp, 0.0);
    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.effects.len(), SHIP_BURST_LEN);
    let events = state.drain_events();
    assert!(events.contains(&GameEvent::Sound(SoundEffect::Destroy)));
    assert!(events.contains(&GameEvent::MusicStop));
}

#[test]
fn test_declined_quit_freezes_then_resumes() {
    let mut state = start_game("ACE");
    let mut rocket = Rocket::spawn(100.0);
    rocket.pos.y = 120.0;
    state.rockets.push(rocket);
    state.bullets.push(Bullet::small(Vec2::new(400.0, 400.0), 270.0));

    step(&mut state, vec![press(Control::Quit)]);
    assert_eq!(state.phase, GamePhase::ConfirmQuit);
    let rockets_before: Vec<Vec2> = state.rockets.iter().map(|r| r.pos).collect();
    let bullets_before: Vec<Vec2> = state.bullets.iter().map(|b| b.pos).collect();

    for _ in 0..50 {
        step(&mut state, Vec::new());
    }
    step(&mut state, vec![press(Control::No)]);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.rockets.iter().map(|r| r.pos).collect::<Vec<_>>(), rockets_before);
    assert_eq!(state.bullets.iter().map(|b| b.pos).collect::<Vec<_>>(), bullets_before);

    step(&mut state, Vec::new());
    assert_ne!(state.rockets[0].pos, rockets_before[0]);
}

#[test]
fn test_game_over_acknowledged_once() {
    let mut state = start_game("ACE");
    state.score = 4;
    menu::enter_game_over(&mut state);
    state.drain_events();

    step(&mut state, vec![press(Control::Confirm)]);
    assert_eq!(state.phase, GamePhase::Startup);
    assert_eq!(state.high_score, HighScore::new("ACE", 4));
    let first = state.drain_events();
    assert!(first.contains(&GameEvent::HighScoreChanged(HighScore::new("ACE", 4))));

    // A second acknowledgement on the title screen changes nothing
    menu::acknowledge_game_over(&mut state);
    assert_eq!(state.phase, GamePhase::Startup);
    assert!(state.drain_events().is_empty());
}

#[test]
fn test_high_score_file_round_trip() {
    let path = std::env::temp_dir().join(format!("rocket-man-scenario-{}.txt", std::process::id()));
    let store = FileScoreStore::new(&path);
    assert_eq!(store.load_or_default(), HighScore::default());

    store.save(&HighScore::new("ALICE", 42)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "ALICE:42");
    assert_eq!(FileScoreStore::new(&path).load().unwrap(), Some(HighScore::new("ALICE", 42)));

    let _ = std::fs::remove_file(&path);
}
