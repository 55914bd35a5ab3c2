// Keyboard and mouse handling.
//
// Translates crossterm events into UserCommand messages for the app event
// loop, or into local ViewState changes (cursor, list selection, tabs).

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use lineup_app::protocol::{UserCommand, COMPARE_SLOTS};
use lineup_core::assignment::nearest_slot;
use lineup_core::board::Side;
use lineup_core::formation::{PitchPoint, Slot};
use lineup_core::player::drag_payload;

use super::layout::{cell_to_percent, pitch_areas, AppLayout};
use super::{ListMode, NamePrompt, PromptKind, Tab, ViewState};

/// Cursor step in percentage units; Shift moves by `FINE_STEP`.
const CURSOR_STEP: f64 = 5.0;
const FINE_STEP: f64 = 1.0;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should reach the app loop, `None`
/// when it was handled locally.
pub fn handle_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports Release events on some platforms
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if state.confirm_quit {
        return handle_confirm_quit(key_event, state);
    }
    if state.prompt.is_some() {
        return handle_name_prompt(key_event, state);
    }
    if state.show_help {
        state.show_help = false;
        return None;
    }

    match key_event.code {
        KeyCode::Char('q') => {
            state.confirm_quit = true;
            return None;
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return None;
        }
        KeyCode::Char('v') => {
            state.active_tab = match state.active_tab {
                Tab::Board => Tab::Compare,
                Tab::Compare => Tab::Board,
            };
            return None;
        }
        KeyCode::Char('p') => return Some(UserCommand::Predict),
        KeyCode::Esc => {
            state.notice = None;
            return None;
        }
        _ => {}
    }

    match state.active_tab {
        Tab::Board => handle_board_key(key_event, state),
        Tab::Compare => handle_compare_key(key_event, state),
    }
}

fn handle_confirm_quit(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Text entry for an analysis or team name. Enter submits a non-blank name.
fn handle_name_prompt(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    let prompt = state.prompt.as_mut()?;
    match key_event.code {
        KeyCode::Esc => {
            state.prompt = None;
            None
        }
        KeyCode::Enter => {
            let name = prompt.input.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let kind = prompt.kind;
            state.prompt = None;
            let side = state.active_side;
            Some(match kind {
                PromptKind::SaveAnalysis => UserCommand::SaveAnalysis { side, name },
                PromptKind::CreateTeam => UserCommand::CreateTeam { side, name },
            })
        }
        KeyCode::Backspace => {
            prompt.input.pop();
            None
        }
        KeyCode::Char(c) => {
            prompt.input.push(c);
            None
        }
        _ => None,
    }
}

fn handle_board_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    let step = if key_event.modifiers.contains(KeyModifiers::SHIFT) {
        FINE_STEP
    } else {
        CURSOR_STEP
    };

    match key_event.code {
        KeyCode::Tab => {
            state.active_side = state.active_side.other();
            state.list_selected = 0;
            None
        }

        // Cursor
        KeyCode::Left => move_cursor(state, -step, 0.0),
        KeyCode::Right => move_cursor(state, step, 0.0),
        KeyCode::Up => move_cursor(state, 0.0, -step),
        KeyCode::Down => move_cursor(state, 0.0, step),
        KeyCode::Char('n') => {
            snap_to_next_slot(state);
            None
        }

        // Player list
        KeyCode::Char('j') => {
            let len = state.list().len();
            if state.list_selected + 1 < len {
                state.list_selected += 1;
            }
            None
        }
        KeyCode::Char('k') => {
            state.list_selected = state.list_selected.saturating_sub(1);
            None
        }
        KeyCode::Char('b') => {
            state.list_mode = match state.list_mode {
                ListMode::Available => ListMode::Bench,
                ListMode::Bench => ListMode::Available,
            };
            state.list_selected = 0;
            None
        }

        // Board commands
        KeyCode::Char('t') => cycle_team(state, true),
        KeyCode::Char('T') => cycle_team(state, false),
        KeyCode::Char('c') => Some(UserCommand::SelectTeam {
            side: state.active_side,
            team: None,
        }),
        KeyCode::Char('f') => Some(UserCommand::SetFormation {
            side: state.active_side,
            formation: state.side().formation().next(),
        }),
        KeyCode::Enter | KeyCode::Char('d') => drop_selected(state),
        KeyCode::Char('x') | KeyCode::Delete => remove_at_cursor(state),
        KeyCode::Char('w') => {
            state.prompt = Some(NamePrompt::new(PromptKind::SaveAnalysis));
            None
        }
        KeyCode::Char('a') => {
            state.prompt = Some(NamePrompt::new(PromptKind::CreateTeam));
            None
        }
        KeyCode::Char('s') => state.side().team().map(|team| UserCommand::ToggleFavourite {
            team: team.to_string(),
        }),
        KeyCode::Char('r') => Some(UserCommand::RefreshTeams),

        _ => None,
    }
}

fn handle_compare_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Left => {
            state.compare_focus = state.compare_focus.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            state.compare_focus = (state.compare_focus + 1).min(COMPARE_SLOTS - 1);
            None
        }
        KeyCode::Char(c @ '1'..='4') => {
            state.compare_focus = (c as usize) - ('1' as usize);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.analysis_selected = state.analysis_selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.analysis_selected + 1 < state.analyses.len() {
                state.analysis_selected += 1;
            }
            None
        }
        KeyCode::Enter => state.selected_analysis().map(|a| UserCommand::SelectCompare {
            slot: state.compare_focus,
            analysis_id: Some(a.id),
        }),
        KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
            Some(UserCommand::SelectCompare {
                slot: state.compare_focus,
                analysis_id: None,
            })
        }
        KeyCode::Char('r') => Some(UserCommand::RefreshAnalyses),
        _ => None,
    }
}

/// Handle a mouse event. Clicks on the pitch move the cursor to the clicked
/// half; a left click drops the selected player, a right click clears the
/// nearest occupied slot.
pub fn handle_mouse(
    mouse_event: MouseEvent,
    state: &mut ViewState,
    layout: &AppLayout,
) -> Option<UserCommand> {
    if state.active_tab != Tab::Board
        || state.confirm_quit
        || state.prompt.is_some()
        || state.show_help
    {
        return None;
    }
    let MouseEventKind::Down(button) = mouse_event.kind else {
        return None;
    };

    let areas = pitch_areas(layout.main_panel);
    let (side, point) = Side::BOTH.iter().find_map(|side| {
        cell_to_percent(mouse_event.column, mouse_event.row, areas[side.index()])
            .map(|point| (*side, point))
    })?;

    if side != state.active_side {
        state.active_side = side;
        state.list_selected = 0;
    }
    state.set_cursor(point);

    match button {
        MouseButton::Left => drop_selected(state),
        MouseButton::Right => remove_at_cursor(state),
        MouseButton::Middle => None,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn move_cursor(state: &mut ViewState, dx: f64, dy: f64) -> Option<UserCommand> {
    let c = state.cursor();
    state.set_cursor(PitchPoint::new(c.x + dx, c.y + dy));
    None
}

/// Jump the cursor onto the slot after the current drop target.
fn snap_to_next_slot(state: &mut ViewState) {
    let slots = state.side().slots();
    if slots.is_empty() {
        return;
    }
    let next = state.target_slot().map_or(0, |i| (i + 1) % slots.len());
    let point = slots[next].point;
    state.set_cursor(point);
}

/// Next (or previous) team in the list for the active side.
fn cycle_team(state: &mut ViewState, forward: bool) -> Option<UserCommand> {
    if state.teams.is_empty() {
        return None;
    }
    let len = state.teams.len();
    let current = state
        .side()
        .team()
        .and_then(|t| state.teams.iter().position(|name| name == t));
    let idx = match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    };
    state.list_selected = 0;
    Some(UserCommand::SelectTeam {
        side: state.active_side,
        team: Some(state.teams[idx].clone()),
    })
}

/// Serialize the selected player and drop it at the cursor.
fn drop_selected(state: &ViewState) -> Option<UserCommand> {
    let player = state.selected_player()?;
    Some(UserCommand::DropPlayer {
        side: state.active_side,
        point: state.cursor(),
        payload: drag_payload(player),
    })
}

/// Remove the player in the occupied slot nearest the cursor. Empty slots
/// never win, so a click beside a player still reaches them.
fn remove_at_cursor(state: &ViewState) -> Option<UserCommand> {
    let side = state.side();
    let occupied: Vec<Slot> = side
        .slots()
        .iter()
        .filter(|s| side.assigned().contains_key(&s.index))
        .copied()
        .collect();
    let slot = nearest_slot(state.cursor(), &occupied)?;
    Some(UserCommand::RemovePlayer {
        side: state.active_side,
        slot,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
