// Screen layout: panel arrangement and percentage/cell conversion.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------+------------------------------+
// | Side Info (9 rows) | Main Panel                   |
// +-------------------+  (pitch or compare grid)      |
// | Player List        |                              |
// +-------------------+------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use lineup_core::formation::PitchPoint;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::widgets::{Block, Borders};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    /// Active side's team, formation, rating and strategy preset.
    pub side_info: Rect,
    /// Available or bench list for the active side.
    pub player_list: Rect,
    /// Pitch on the board tab, compare grid on the compare tab.
    pub main_panel: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // middle section
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(vertical[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(horizontal[0]);

    AppLayout {
        status_bar: vertical[0],
        side_info: sidebar[0],
        player_list: sidebar[1],
        main_panel: horizontal[1],
        help_bar: vertical[2],
    }
}

/// Split the pitch into its top (left side) and bottom (right side) halves.
pub fn pitch_halves(area: Rect) -> [Rect; 2] {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    [halves[0], halves[1]]
}

/// Drawable area inside a bordered half.
pub fn half_inner(half: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(half)
}

/// Drawable areas of both halves, indexed by `Side::index()`.
pub fn pitch_areas(area: Rect) -> [Rect; 2] {
    pitch_halves(area).map(half_inner)
}

// ---------------------------------------------------------------------------
// Percentage space <-> terminal cells
// ---------------------------------------------------------------------------

// Each half owns a full 0-100 percentage space. The bottom side's slots are
// already mirrored, so both halves map y downward without a flip.

fn scale(percent: f64, len: u16) -> u16 {
    let max = len.saturating_sub(1);
    let cells = percent.clamp(0.0, 100.0) / 100.0 * f64::from(max);
    (cells.round() as u16).min(max)
}

fn unscale(offset: u16, len: u16) -> f64 {
    if len <= 1 {
        return 50.0;
    }
    f64::from(offset) / f64::from(len - 1) * 100.0
}

/// Terminal cell for a point. `None` when the area has no cells.
pub fn percent_to_cell(point: PitchPoint, area: Rect) -> Option<(u16, u16)> {
    if area.is_empty() {
        return None;
    }
    Some((
        area.x + scale(point.x, area.width),
        area.y + scale(point.y, area.height),
    ))
}

/// Point under a terminal cell. `None` when the cell is outside `area`.
pub fn cell_to_percent(col: u16, row: u16, area: Rect) -> Option<PitchPoint> {
    if !area.contains(Position::new(col, row)) {
        return None;
    }
    Some(PitchPoint::new(
        unscale(col - area.x, area.width),
        unscale(row - area.y, area.height),
    ))
}
