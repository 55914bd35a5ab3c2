// Help bar and the key reference overlay.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::dialog::centered_rect;
use crate::tui::{PromptKind, Tab, ViewState};

const BOARD_KEYS: &[(&str, &str)] = &[
    ("Tab", "switch side (top/bottom)"),
    ("t / T", "next / previous team"),
    ("c", "clear team"),
    ("f", "next formation"),
    ("arrows", "move cursor (Shift: fine)"),
    ("n", "jump cursor to next slot"),
    ("j / k", "select player"),
    ("b", "toggle available / bench"),
    ("Enter, d", "drop player at cursor"),
    ("x, Del", "remove player at cursor"),
    ("click", "drop (left) / remove (right)"),
    ("w", "save side as analysis"),
    ("a", "create team from full lineup"),
    ("s", "toggle favourite team"),
    ("p", "predict winner"),
    ("r", "refresh teams"),
];

const COMPARE_KEYS: &[(&str, &str)] = &[
    ("1-4, arrows", "focus compare slot"),
    ("j / k", "select saved analysis"),
    ("Enter", "load analysis into slot"),
    ("x, Del", "clear slot"),
    ("r", "refresh saved analyses"),
];

const GLOBAL_KEYS: &[(&str, &str)] = &[
    ("v", "board / compare view"),
    ("Esc", "dismiss message"),
    ("?", "this help"),
    ("q", "quit"),
];

pub fn bar_text(state: &ViewState) -> &'static str {
    if state.confirm_quit {
        " y:Quit | n:Cancel"
    } else if let Some(prompt) = &state.prompt {
        match prompt.kind {
            PromptKind::SaveAnalysis => " Enter:Save | Esc:Cancel",
            PromptKind::CreateTeam => " Enter:Create | Esc:Cancel",
        }
    } else {
        match state.active_tab {
            Tab::Board => {
                " Tab:Side | t:Team | f:Formation | arrows:Cursor | j/k:Player | Enter:Drop | x:Remove | w:Save | p:Predict | v:Compare | ?:Help | q:Quit"
            }
            Tab::Compare => {
                " 1-4:Slot | j/k:Analysis | Enter:Load | x:Clear | r:Refresh | v:Board | ?:Help | q:Quit"
            }
        }
    }
}

pub fn render_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        bar_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn key_lines(title: &'static str, keys: &[(&'static str, &'static str)]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(keys.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), Style::default().fg(Color::Yellow)),
            Span::raw(*desc),
        ])
    }));
    lines
}

pub fn render_overlay(frame: &mut Frame, area: Rect) {
    let mut lines = key_lines("Board", BOARD_KEYS);
    lines.push(Line::default());
    lines.extend(key_lines("Compare", COMPARE_KEYS));
    lines.push(Line::default());
    lines.extend(key_lines("Anywhere", GLOBAL_KEYS));

    let height = lines.len() as u16 + 2;
    let dialog_area = centered_rect(50, height, area);
    frame.render_widget(Clear, dialog_area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keys (any key closes) "),
            )
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}
