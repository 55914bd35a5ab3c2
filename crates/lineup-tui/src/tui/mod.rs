// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the latest board snapshot and
// backend results. The app event loop pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream};
use futures_util::StreamExt;
use lineup_app::protocol::{
    CompareSlotState, Notice, PredictionStatus, UiUpdate, UserCommand, COMPARE_SLOTS,
};
use lineup_core::analysis::AnalysisSummary;
use lineup_core::assignment::{nearest_slot, TeamSide};
use lineup_core::board::{MatchBoard, Side};
use lineup_core::formation::PitchPoint;
use lineup_core::player::Player;
use ratatui::layout::Rect;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use layout::build_layout;

// ---------------------------------------------------------------------------
// View modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Board,
    Compare,
}

/// What a submitted name prompt turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SaveAnalysis,
    CreateTeam,
}

/// An open name prompt and the text typed so far.
#[derive(Debug, Clone, PartialEq)]
pub struct NamePrompt {
    pub kind: PromptKind,
    pub input: String,
}

impl NamePrompt {
    pub fn new(kind: PromptKind) -> Self {
        NamePrompt {
            kind,
            input: String::new(),
        }
    }
}

/// Which partition of the active side the player list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Available,
    Bench,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    pub board: MatchBoard,
    /// Roster request outstanding, per side.
    pub loading: [bool; 2],
    /// Selectable teams, favourites first.
    pub teams: Vec<String>,
    pub favourites: Vec<String>,
    pub prediction: PredictionStatus,
    /// Most recent notice; cleared with Esc.
    pub notice: Option<Notice>,
    pub analyses: Vec<AnalysisSummary>,
    pub compare: [CompareSlotState; COMPARE_SLOTS],
    pub active_tab: Tab,
    pub active_side: Side,
    /// Drop cursor per side, in that side's percentage space.
    pub cursor: [PitchPoint; 2],
    pub list_mode: ListMode,
    pub list_selected: usize,
    pub compare_focus: usize,
    pub analysis_selected: usize,
    pub prompt: Option<NamePrompt>,
    pub show_help: bool,
    pub confirm_quit: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            board: MatchBoard::default(),
            loading: [false; 2],
            teams: Vec::new(),
            favourites: Vec::new(),
            prediction: PredictionStatus::Idle,
            notice: None,
            analyses: Vec::new(),
            compare: std::array::from_fn(|_| CompareSlotState::Empty),
            active_tab: Tab::Board,
            active_side: Side::Left,
            cursor: [PitchPoint::new(50.0, 50.0); 2],
            list_mode: ListMode::Available,
            list_selected: 0,
            compare_focus: 0,
            analysis_selected: 0,
            prompt: None,
            show_help: false,
            confirm_quit: false,
        }
    }
}

impl ViewState {
    pub fn side(&self) -> &TeamSide {
        self.board.side(self.active_side)
    }

    pub fn cursor(&self) -> PitchPoint {
        self.cursor[self.active_side.index()]
    }

    pub fn set_cursor(&mut self, point: PitchPoint) {
        self.cursor[self.active_side.index()] =
            PitchPoint::new(point.x.clamp(0.0, 100.0), point.y.clamp(0.0, 100.0));
    }

    /// Players shown in the list panel.
    pub fn list(&self) -> &[Player] {
        match self.list_mode {
            ListMode::Available => self.side().available(),
            ListMode::Bench => self.side().bench(),
        }
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.list().get(self.list_selected)
    }

    /// Slot a drop at the cursor would land in.
    pub fn target_slot(&self) -> Option<usize> {
        nearest_slot(self.cursor(), self.side().slots())
    }

    pub fn is_favourite(&self, team: &str) -> bool {
        self.favourites.iter().any(|f| f == team)
    }

    pub fn is_loading(&self, side: Side) -> bool {
        self.loading[side.index()]
    }

    pub fn selected_analysis(&self) -> Option<&AnalysisSummary> {
        self.analyses.get(self.analysis_selected)
    }

    /// Keep list selections inside their lists after the data changes.
    fn clamp_selections(&mut self) {
        let len = self.list().len();
        self.list_selected = self.list_selected.min(len.saturating_sub(1));
        self.analysis_selected = self
            .analysis_selected
            .min(self.analyses.len().saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Board(snapshot) => {
            let snapshot = *snapshot;
            state.board = snapshot.board;
            state.loading = snapshot.loading;
        }
        UiUpdate::Teams(teams) => {
            state.teams = teams;
        }
        UiUpdate::Favourites(favourites) => {
            state.favourites = favourites;
        }
        UiUpdate::Prediction(status) => {
            state.prediction = status;
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
        UiUpdate::Analyses(analyses) => {
            state.analyses = analyses;
        }
        UiUpdate::CompareSlot { slot, state: slot_state } => match state.compare.get_mut(slot) {
            Some(entry) => *entry = slot_state,
            None => warn!("Compare update for unknown slot {}", slot),
        },
    }
    state.clamp_selections();
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let area = frame.area();
    let layout = build_layout(area);

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::side_info::render(frame, layout.side_info, state);
    widgets::players::render(frame, layout.player_list, state);
    match state.active_tab {
        Tab::Board => widgets::pitch::render(frame, layout.main_panel, state),
        Tab::Compare => widgets::compare::render(frame, layout.main_panel, state),
    }
    widgets::help::render_bar(frame, layout.help_bar, state);

    if state.show_help {
        widgets::help::render_overlay(frame, area);
    }
    if let Some(prompt) = &state.prompt {
        widgets::dialog::render_name_prompt(frame, area, prompt, state.active_side);
    }
    if state.confirm_quit {
        widgets::dialog::render_quit_confirm(frame, area);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

fn restore_terminal() {
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
}

/// Run the TUI event loop until the user quits or the app loop exits.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;

    // Restore the terminal before the default hook prints the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        info!("UI channel closed, leaving TUI");
                        break;
                    }
                }
            }

            maybe_event = event_stream.next() => {
                let cmd = match maybe_event {
                    Some(Ok(Event::Key(key_event))) => input::handle_key(key_event, &mut view_state),
                    Some(Ok(Event::Mouse(mouse_event))) => {
                        let size = terminal.size()?;
                        let layout = build_layout(Rect::new(0, 0, size.width, size.height));
                        input::handle_mouse(mouse_event, &mut view_state, &layout)
                    }
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break;
                    }
                    None => break,
                };
                if let Some(cmd) = cmd {
                    let quit = cmd == UserCommand::Quit;
                    debug!("Sending command: {:?}", cmd);
                    let _ = cmd_tx.send(cmd).await;
                    if quit {
                        break;
                    }
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    restore_terminal();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
