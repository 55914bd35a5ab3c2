// Pitch widget: both halves of the vertical board with slot labels, the drop
// target and the cursor.
//
// The left side owns the top half, the right side the bottom half. Slot
// coordinates are mapped into each half's inner area with `percent_to_cell`.

use lineup_core::assignment::TeamSide;
use lineup_core::board::Side;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::layout::{half_inner, percent_to_cell, pitch_halves};
use crate::tui::ViewState;

/// Longest label drawn for a player on the pitch.
const MAX_LABEL: usize = 10;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let halves = pitch_halves(area);
    for side in Side::BOTH {
        render_half(frame, halves[side.index()], state, side);
    }
}

fn render_half(frame: &mut Frame, half: Rect, state: &ViewState, side: Side) {
    let team_side = state.board.side(side);
    let active = side == state.active_side;
    let border = if active { Color::Yellow } else { Color::Green };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(half_title(team_side, side));
    frame.render_widget(block, half);

    let inner = half_inner(half);
    if inner.is_empty() {
        return;
    }

    let target = if active { state.target_slot() } else { None };
    for slot in team_side.slots() {
        let Some((col, row)) = percent_to_cell(slot.point, inner) else {
            continue;
        };
        let (label, style) = match team_side.player_at(slot.index) {
            Some(player) => (
                short_name(&player.name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            None => (
                slot.role.abbrev().to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        };
        let style = if target == Some(slot.index) {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        };
        let rect = label_rect(col, row, label.chars().count() as u16, inner);
        frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
    }

    if active {
        if let Some((col, row)) = percent_to_cell(state.cursor(), inner) {
            if let Some(cell) = frame.buffer_mut().cell_mut(Position::new(col, row)) {
                if cell.symbol() == " " {
                    cell.set_symbol("+");
                }
                cell.set_fg(Color::Black).set_bg(Color::Yellow);
            }
        }
    }
}

pub fn half_title(team_side: &TeamSide, side: Side) -> String {
    let team = team_side.team().unwrap_or("--");
    format!(
        " {}: {} {} | {:.2} ",
        side,
        team,
        team_side.formation(),
        team_side.rating().average
    )
}

/// Surname-style label: the last word of the name, capped at `MAX_LABEL`.
pub fn short_name(name: &str) -> String {
    let last = name.split_whitespace().last().unwrap_or(name);
    last.chars().take(MAX_LABEL).collect()
}

/// One-row rect of `len` cells centered on `col`, kept inside `area`.
pub fn label_rect(col: u16, row: u16, len: u16, area: Rect) -> Rect {
    let width = len.clamp(1, area.width.max(1));
    let max_x = (area.x + area.width).saturating_sub(width).max(area.x);
    let x = col.saturating_sub(width / 2).clamp(area.x, max_x);
    Rect::new(x, row, width, 1).intersection(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::formation::PitchPoint;
    use lineup_core::player::Player;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn short_name_takes_last_word() {
        assert_eq!(short_name("David Raya"), "Raya");
        assert_eq!(short_name("Jorginho"), "Jorginho");
        assert_eq!(short_name("Pierre-Emerick Aubameyang-Extended"), "Aubameyang");
        assert_eq!(short_name(""), "");
    }

    #[test]
    fn label_rect_is_centered_and_clamped() {
        let area = Rect::new(10, 0, 30, 10);
        assert_eq!(label_rect(25, 3, 4, area), Rect::new(23, 3, 4, 1));
        // Near the left edge
        assert_eq!(label_rect(10, 3, 6, area), Rect::new(10, 3, 6, 1));
        // Near the right edge
        assert_eq!(label_rect(39, 3, 6, area), Rect::new(34, 3, 6, 1));
        // Wider than the area
        assert_eq!(label_rect(20, 3, 50, area).width, 30);
    }

    #[test]
    fn half_title_shows_team_formation_and_rating() {
        let mut state = ViewState::default();
        assert_eq!(
            half_title(state.board.side(Side::Right), Side::Right),
            " right: -- 4-3-3 | 0.00 "
        );
        let raya = Player::new("David Raya", "Goalkeeper", 85.0);
        let side = state.board.side_mut(Side::Left);
        side.reset(Some("Arsenal".into()), vec![raya.clone()]);
        side.resolve_drop(PitchPoint::new(50.0, 5.0), &raya);
        assert_eq!(
            half_title(state.board.side(Side::Left), Side::Left),
            " left: Arsenal 4-3-3 | 85.00 "
        );
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn assigned_players_appear_on_their_half() {
        let mut state = ViewState::default();
        let raya = Player::new("David Raya", "Goalkeeper", 85.0);
        let sanchez = Player::new("Robert Sanchez", "Goalkeeper", 78.0);
        let left = state.board.side_mut(Side::Left);
        left.reset(Some("Arsenal".into()), vec![raya.clone()]);
        left.resolve_drop(PitchPoint::new(50.0, 5.0), &raya);
        let right = state.board.side_mut(Side::Right);
        right.reset(Some("Chelsea".into()), vec![sanchez.clone()]);
        right.resolve_drop(PitchPoint::new(50.0, 95.0), &sanchez);

        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();

        let text = buffer_text(&terminal);
        let raya_at = text.find("Raya").unwrap();
        let sanchez_at = text.find("Sanchez").unwrap();
        // Top half goalkeeper near the top edge, bottom half near the bottom
        assert!(raya_at / 60 < 5, "Raya drawn on row {}", raya_at / 60);
        assert!(sanchez_at / 60 > 24, "Sanchez drawn on row {}", sanchez_at / 60);
    }

    #[test]
    fn empty_slots_show_role_labels() {
        let state = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("GK"));
        assert!(text.contains("ATT"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let state = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(4, 4)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
