//! Session state machine
//!
//! Every discrete input event goes through [`handle_event`], a single table
//! keyed by the current phase. Events with no entry for the phase are ignored.

use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::NAME_MAX_LEN;
use crate::highscores::HighScore;
use crate::input::{Control, InputEvent};

/// Apply one discrete input event to the session
pub fn handle_event(state: &mut GameState, event: InputEvent, now_ms: u64) {
    use Control::*;
    use GamePhase::*;
    use InputEvent::*;

    match (state.phase, event) {
        (Startup, Press(Confirm)) => {
            state.name_buffer.clear();
            set_phase(state, NameEntry);
        }
        (Startup | Playing, Press(Quit)) => request_quit(state),

        (NameEntry, Char(c)) => push_name_char(state, c),
        (NameEntry, Backspace) => {
            state.name_buffer.pop();
        }
        (NameEntry, Press(Confirm)) => submit_name(state, now_ms),
        (NameEntry, Press(Cancel)) => {
            state.name_buffer.clear();
            set_phase(state, Startup);
        }

        (GameOver, Press(Confirm | Quit)) => acknowledge_game_over(state),

        (ConfirmQuit, Press(Yes)) => confirm_quit(state),
        (ConfirmQuit, Press(No)) => {
            let back = state.previous_phase;
            set_phase(state, back);
        }

        _ => {}
    }
}

/// Append a letter to the name being typed. Non-letters and overflow are dropped.
pub fn push_name_char(state: &mut GameState, c: char) {
    if c.is_ascii_alphabetic() && state.name_buffer.len() < NAME_MAX_LEN {
        state.name_buffer.push(c.to_ascii_uppercase());
    }
}

fn submit_name(state: &mut GameState, now_ms: u64) {
    if state.name_buffer.is_empty() {
        return;
    }
    state.player_name = std::mem::take(&mut state.name_buffer);
    state.reset_session(now_ms);
    log::info!("Starting game for {}", state.player_name);
    set_phase(state, GamePhase::Playing);
    state.emit(GameEvent::MusicStart);
}

fn request_quit(state: &mut GameState) {
    state.previous_phase = state.phase;
    set_phase(state, GamePhase::ConfirmQuit);
}

fn confirm_quit(state: &mut GameState) {
    match state.previous_phase {
        GamePhase::Playing => {
            set_phase(state, GamePhase::Startup);
            state.emit(GameEvent::MusicStop);
        }
        _ => {
            log::info!("Quit confirmed");
            set_phase(state, GamePhase::Startup);
            state.emit(GameEvent::Quit);
        }
    }
}

/// The player's craft was destroyed. Repeated calls are no-ops.
pub fn enter_game_over(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    log::info!("Game over: {} destroyed {} rockets", state.player_name, state.score);
    set_phase(state, GamePhase::GameOver);
    state.emit(GameEvent::MusicStop);
}

/// Leave the game-over screen, recording a new high score first.
///
/// Only acts while in GameOver, so a second call cannot record twice.
pub fn acknowledge_game_over(state: &mut GameState) {
    if state.phase != GamePhase::GameOver {
        return;
    }
    if state.score > state.high_score.score {
        let record = HighScore::new(state.player_name.clone(), state.score);
        log::info!("New high score: {}:{}", record.name, record.score);
        state.high_score = record.clone();
        state.emit(GameEvent::HighScoreChanged(record));
    }
    set_phase(state, GamePhase::Startup);
}

fn set_phase(state: &mut GameState, phase: GamePhase) {
    if state.phase != phase {
        log::debug!("{:?} -> {:?}", state.phase, phase);
    }
    state.phase = phase;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Rocket;
    use proptest::prelude::*;

    fn new_state() -> GameState {
        GameState::new(800.0, 600.0, 42, HighScore::default())
    }

    fn type_name(state: &mut GameState, name: &str) {
        for c in name.chars() {
            handle_event(state, InputEvent::Char(c), 0);
        }
    }

    fn start_game(state: &mut GameState, name: &str) {
        handle_event(state, InputEvent::Press(Control::Confirm), 0);
        type_name(state, name);
        handle_event(state, InputEvent::Press(Control::Confirm), 1_000);
    }

    #[test]
    fn test_startup_to_playing() {
        let mut state = new_state();
        start_game(&mut state, "ada");
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player_name, "ADA");
        assert!(state.name_buffer.is_empty());
        assert_eq!(state.ammo.last_reload_ms, 1_000);
        assert_eq!(state.drain_events(), vec![GameEvent::MusicStart]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut state = new_state();
        handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
        handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
        assert_eq!(state.phase, GamePhase::NameEntry);
    }

    #[test]
    fn test_name_entry_filters_and_limits() {
        let mut state = new_state();
        handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
        type_name(&mut state, "a1 b-c");
        assert_eq!(state.name_buffer, "ABC");

        type_name(&mut state, "qwertyuiopasdfghjkl");
        assert_eq!(state.name_buffer.len(), NAME_MAX_LEN);

        handle_event(&mut state, InputEvent::Backspace, 0);
        assert_eq!(state.name_buffer.len(), NAME_MAX_LEN - 1);
    }

    #[test]
    fn test_name_entry_cancel() {
        let mut state = new_state();
        handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
        type_name(&mut state, "bob");
        handle_event(&mut state, InputEvent::Press(Control::Cancel), 0);
        assert_eq!(state.phase, GamePhase::Startup);
        assert!(state.name_buffer.is_empty());
    }

    #[test]
    fn test_quit_key_is_a_letter_during_name_entry() {
        let mut state = new_state();
        handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
        handle_event(&mut state, InputEvent::Press(Control::Quit), 0);
        handle_event(&mut state, InputEvent::Char('q'), 0);
        assert_eq!(state.phase, GamePhase::NameEntry);
        assert_eq!(state.name_buffer, "Q");
    }

    #[test]
    fn test_quit_from_startup_emits_quit() {
        let mut state = new_state();
        handle_event(&mut state, InputEvent::Press(Control::Quit), 0);
        assert_eq!(state.phase, GamePhase::ConfirmQuit);
        assert_eq!(state.previous_phase, GamePhase::Startup);
        handle_event(&mut state, InputEvent::Press(Control::Yes), 0);
        assert_eq!(state.drain_events(), vec![GameEvent::Quit]);
    }

    #[test]
    fn test_quit_from_playing_returns_home() {
        let mut state = new_state();
        start_game(&mut state, "eve");
        state.drain_events();
        handle_event(&mut state, InputEvent::Press(Control::Quit), 0);
        handle_event(&mut state, InputEvent::Press(Control::Yes), 0);
        assert_eq!(state.phase, GamePhase::Startup);
        assert_eq!(state.drain_events(), vec![GameEvent::MusicStop]);
    }

    #[test]
    fn test_confirm_quit_no_restores_phase() {
        let mut state = new_state();
        start_game(&mut state, "eve");
        state.rockets.push(Rocket::spawn(100.0));
        handle_event(&mut state, InputEvent::Press(Control::Quit), 0);
        handle_event(&mut state, InputEvent::Press(Control::No), 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.rockets.len(), 1);
    }

    #[test]
    fn test_game_over_records_high_score_once() {
        let mut state = new_state();
        start_game(&mut state, "kim");
        state.score = 3;
        enter_game_over(&mut state);
        enter_game_over(&mut state);
        state.drain_events();

        acknowledge_game_over(&mut state);
        acknowledge_game_over(&mut state);
        assert_eq!(state.phase, GamePhase::Startup);
        assert_eq!(state.high_score, HighScore::new("KIM", 3));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::HighScoreChanged(HighScore::new("KIM", 3))]
        );
    }

    #[test]
    fn test_lower_score_keeps_record() {
        let mut state = GameState::new(800.0, 600.0, 1, HighScore::new("TOP", 50));
        start_game(&mut state, "low");
        state.score = 5;
        enter_game_over(&mut state);
        handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
        assert_eq!(state.phase, GamePhase::Startup);
        assert_eq!(state.high_score, HighScore::new("TOP", 50));
    }

    proptest! {
        #[test]
        fn prop_name_buffer_bounded(typed in "\\PC{0,40}") {
            let mut state = new_state();
            handle_event(&mut state, InputEvent::Press(Control::Confirm), 0);
            for c in typed.chars() {
                handle_event(&mut state, InputEvent::Char(c), 0);
                prop_assert!(state.name_buffer.len() <= NAME_MAX_LEN);
                prop_assert!(state.name_buffer.chars().all(|c| c.is_ascii_uppercase()));
            }
        }
    }
}
