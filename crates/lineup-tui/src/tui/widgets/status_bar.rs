// Status bar widget: both teams with ratings, prediction, tab indicator and
// the latest notice.

use lineup_app::protocol::{NoticeLevel, PredictionStatus};
use lineup_core::board::Side;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Tab, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = tab_spans(state.active_tab);
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));

    for (i, side) in Side::BOTH.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" vs ", Style::default().fg(Color::Gray)));
        }
        spans.push(Span::styled(
            team_summary(state, *side),
            Style::default().fg(Color::White),
        ));
    }

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    let (text, color) = prediction_text(&state.prediction);
    spans.push(Span::styled(text, Style::default().fg(color)));

    if let Some(notice) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(notice.message.clone(), Style::default().fg(color)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// "Arsenal 86.50", "Arsenal ..." while loading, "--" without a team.
pub fn team_summary(state: &ViewState, side: Side) -> String {
    let team_side = state.board.side(side);
    match team_side.team() {
        Some(team) if state.is_loading(side) => format!("{team} ..."),
        Some(team) => format!("{} {:.2}", team, team_side.rating().average),
        None => "--".to_string(),
    }
}

pub fn prediction_text(status: &PredictionStatus) -> (String, Color) {
    match status {
        PredictionStatus::Idle => ("Prediction: -".to_string(), Color::Gray),
        PredictionStatus::Pending => ("Predicting...".to_string(), Color::Yellow),
        PredictionStatus::Winner(winner) => (format!("Winner: {winner}"), Color::Green),
    }
}

pub fn tab_spans(active: Tab) -> Vec<Span<'static>> {
    let tabs = [(Tab::Board, "Board"), (Tab::Compare, "Compare")];
    let mut spans = vec![Span::raw(" ")];
    for (tab, label) in tabs {
        let style = if tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_app::protocol::Notice;
    use lineup_core::player::Player;

    #[test]
    fn team_summary_states() {
        let mut state = ViewState::default();
        assert_eq!(team_summary(&state, Side::Left), "--");

        state.board.side_mut(Side::Left).reset(
            Some("Arsenal".into()),
            vec![Player::new("Raya", "Goalkeeper", 85.0)],
        );
        assert_eq!(team_summary(&state, Side::Left), "Arsenal 0.00");
        state.loading[0] = true;
        assert_eq!(team_summary(&state, Side::Left), "Arsenal ...");
    }

    #[test]
    fn prediction_text_variants() {
        assert_eq!(prediction_text(&PredictionStatus::Pending).1, Color::Yellow);
        assert_eq!(
            prediction_text(&PredictionStatus::Winner("Chelsea".into())).0,
            "Winner: Chelsea"
        );
    }

    #[test]
    fn active_tab_is_bold() {
        let spans = tab_spans(Tab::Compare);
        assert!(!spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn render_with_notice_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(100, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.notice = Some(Notice::error("Prediction failed"));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
