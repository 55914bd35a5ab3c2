// Side info widget: active side's team, formation, rating breakdown and the
// club's strategy preset.

use lineup_core::position::Role;
use lineup_core::strategy::strategy_for_team;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let side = state.side();
    let title = format!(" {} side ", capitalize(state.active_side.as_str()));

    let mut lines = Vec::new();
    let team = match side.team() {
        Some(team) if state.is_loading(state.active_side) => format!("{team} (loading)"),
        Some(team) => team.to_string(),
        None => "none (t to pick)".to_string(),
    };
    let mut team_spans = vec![
        Span::styled("Team: ", Style::default().fg(Color::Gray)),
        Span::styled(team, Style::default().add_modifier(Modifier::BOLD)),
    ];
    if side.team().is_some_and(|t| state.is_favourite(t)) {
        team_spans.push(Span::styled(" *", Style::default().fg(Color::Yellow)));
    }
    lines.push(Line::from(team_spans));
    lines.push(Line::from(vec![
        Span::styled("Formation: ", Style::default().fg(Color::Gray)),
        Span::raw(side.formation().id()),
    ]));

    let rating = side.rating();
    lines.push(Line::from(vec![
        Span::styled("Rating: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{:.2}", rating.average),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" ({} rated)", rating.rated_count())),
    ]));
    lines.push(Line::from(role_breakdown(state)));
    if !rating.excluded.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Unrated: {}", rating.excluded.join(", ")),
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(team) = side.team() {
        let preset = strategy_for_team(team);
        lines.push(Line::from(vec![
            Span::styled("Plan: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} - {}", preset.formation, preset.style)),
        ]));
        lines.push(Line::from(Span::styled(
            preset.keys.join(" / "),
            Style::default().fg(Color::Cyan),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

/// "GK 1  DEF 2  MID 0  ATT 1" counts of rated players per role.
pub fn role_breakdown(state: &ViewState) -> String {
    let counts = &state.side().rating().per_role_counts;
    Role::ALL
        .iter()
        .map(|role| format!("{} {}", role.abbrev(), counts.get(role).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join("  ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::board::Side;
    use lineup_core::formation::PitchPoint;
    use lineup_core::player::Player;

    #[test]
    fn role_breakdown_counts_assigned_players() {
        let mut state = ViewState::default();
        let raya = Player::new("Raya", "Goalkeeper", 85.0);
        state
            .board
            .side_mut(Side::Left)
            .reset(Some("Arsenal".into()), vec![raya.clone()]);
        assert_eq!(role_breakdown(&state), "GK 0  DEF 0  MID 0  ATT 0");
        state
            .board
            .side_mut(Side::Left)
            .resolve_drop(PitchPoint::new(50.0, 5.0), &raya);
        assert_eq!(role_breakdown(&state), "GK 1  DEF 0  MID 0  ATT 0");
    }

    #[test]
    fn favourite_team_is_starred() {
        let backend = ratatui::backend::TestBackend::new(40, 9);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.board.side_mut(Side::Left).reset(Some("Chelsea".into()), Vec::new());
        state.favourites = vec!["Chelsea".into()];
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Team: Chelsea *"));
    }

    #[test]
    fn capitalize_side_names() {
        assert_eq!(capitalize("left"), "Left");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn render_with_team_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 9);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.board.side_mut(Side::Left).reset(
            Some("Juventus".into()),
            vec![Player::new("Locatelli", "playmaker", 81.0)],
        );
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
