// Compare widget: up to four saved analyses side by side on horizontal
// pitches, plus the list of saved analyses to pick from.

use lineup_app::protocol::{CompareSlotState, COMPARE_SLOTS};
use lineup_core::analysis::{AnalysisView, Arrow};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::pitch::{label_rect, short_name};
use crate::tui::layout::percent_to_cell;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(30)])
        .split(area);

    for (idx, rect) in slot_grid(columns[0]).into_iter().enumerate() {
        render_slot(frame, rect, idx, &state.compare[idx], idx == state.compare_focus);
    }
    render_analysis_list(frame, columns[1], state);
}

/// 2x2 grid of compare slot areas, in slot order.
pub fn slot_grid(area: Rect) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let per_row = COMPARE_SLOTS / 2;
    rows.iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
                .split(*row)
                .to_vec()
        })
        .collect()
}

fn render_slot(frame: &mut Frame, area: Rect, idx: usize, slot: &CompareSlotState, focused: bool) {
    let border = if focused { Color::Yellow } else { Color::Gray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(slot_title(idx, slot));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let message = match slot {
        CompareSlotState::Empty => "Empty. Pick an analysis and press Enter.".to_string(),
        CompareSlotState::Loading(id) => format!("Loading analysis #{id}..."),
        CompareSlotState::Failed(reason) => format!("Could not load: {reason}"),
        CompareSlotState::Ready(view) => {
            render_view(frame, inner, view);
            return;
        }
    };
    let color = if matches!(slot, CompareSlotState::Failed(_)) {
        Color::Red
    } else {
        Color::DarkGray
    };
    frame.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true }),
        inner,
    );
}

pub fn slot_title(idx: usize, slot: &CompareSlotState) -> String {
    match slot {
        CompareSlotState::Ready(view) => {
            let team = view.team.as_deref().unwrap_or("--");
            format!(
                " {}: {} ({}) {} | {:.2} ",
                idx + 1,
                view.name,
                team,
                view.formation,
                view.rating.average
            )
        }
        _ => format!(" {} ", idx + 1),
    }
}

fn render_view(frame: &mut Frame, area: Rect, view: &AnalysisView) {
    if area.is_empty() {
        return;
    }
    for arrow in &view.arrows {
        draw_arrow(frame, area, arrow);
    }
    for slot in &view.points {
        let Some((col, row)) = percent_to_cell(slot.point, area) else {
            continue;
        };
        let (label, style) = match view.assigned.get(&slot.index) {
            Some(name) => (
                short_name(name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            None => (
                slot.role.abbrev().to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        };
        let rect = label_rect(col, row, label.chars().count() as u16, area);
        frame.render_widget(Paragraph::new(Span::styled(label, style)), rect);
    }
}

/// Cells on the straight line between two cells, endpoints included.
pub fn line_cells(from: (u16, u16), to: (u16, u16)) -> Vec<(u16, u16)> {
    let (dc, dr) = (
        i32::from(to.0) - i32::from(from.0),
        i32::from(to.1) - i32::from(from.1),
    );
    let steps = dc.abs().max(dr.abs());
    if steps == 0 {
        return vec![from];
    }
    (0..=steps)
        .map(|i| {
            let c = i32::from(from.0) + dc * i / steps;
            let r = i32::from(from.1) + dr * i / steps;
            (c as u16, r as u16)
        })
        .collect()
}

fn draw_arrow(frame: &mut Frame, area: Rect, arrow: &Arrow) {
    let (Some(from), Some(to)) = (
        percent_to_cell(arrow.from, area),
        percent_to_cell(arrow.to, area),
    ) else {
        return;
    };
    let cells = line_cells(from, to);
    let last = cells.len() - 1;
    let buffer = frame.buffer_mut();
    for (i, (col, row)) in cells.into_iter().enumerate() {
        if let Some(cell) = buffer.cell_mut(Position::new(col, row)) {
            cell.set_symbol(if i == last { "*" } else { "." })
                .set_fg(Color::Cyan);
        }
    }
}

fn render_analysis_list(frame: &mut Frame, area: Rect, state: &ViewState) {
    let items: Vec<ListItem> = if state.analyses.is_empty() {
        vec![ListItem::new("No saved analyses")]
    } else {
        state
            .analyses
            .iter()
            .map(|a| ListItem::new(format!("#{} {}", a.id, a.label())))
            .collect()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Saved ({}) ", state.analyses.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let selected = (!state.analyses.is_empty()).then_some(state.analysis_selected);
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut list_state);
}
