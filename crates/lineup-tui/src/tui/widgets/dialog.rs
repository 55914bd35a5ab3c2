// Modal overlays: quit confirmation and the name prompt.

use lineup_core::board::Side;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::{NamePrompt, PromptKind};

const QUIT_WIDTH: u16 = 28;
const QUIT_HEIGHT: u16 = 3;
const PROMPT_WIDTH: u16 = 44;
const PROMPT_HEIGHT: u16 = 4;

pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(QUIT_WIDTH, QUIT_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Quit? ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    let text = Line::from(vec![
        Span::raw("  Really quit? ("),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ]);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}

/// Name prompt for saving the active side as an analysis or publishing it as
/// a new team.
pub fn render_name_prompt(frame: &mut Frame, area: Rect, prompt: &NamePrompt, side: Side) {
    let dialog_area = centered_rect(PROMPT_WIDTH, PROMPT_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let (title, hint) = match prompt.kind {
        PromptKind::SaveAnalysis => (format!(" Save {side} side as "), " Enter to save, Esc to cancel"),
        PromptKind::CreateTeam => (
            format!(" New team from {side} side "),
            " Enter to create, Esc to cancel",
        ),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    let lines = vec![
        Line::from(vec![
            Span::raw(" > "),
            Span::styled(prompt.input.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("_", Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}

/// Centered rectangle of the given size, clamped to `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}
