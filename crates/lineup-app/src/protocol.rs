// Messages between the TUI, the app event loop, and backend tasks.

use lineup_core::analysis::{AnalysisSummary, AnalysisView};
use lineup_core::board::{MatchBoard, PredictionResponse, Side};
use lineup_core::formation::{Formation, PitchPoint};
use lineup_core::player::Player;

use crate::backend::BackendError;

/// Number of side-by-side compare slots.
pub const COMPARE_SLOTS: usize = 4;

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    RefreshTeams,
    /// `None` clears the side.
    SelectTeam {
        side: Side,
        team: Option<String>,
    },
    SetFormation {
        side: Side,
        formation: Formation,
    },
    /// A serialized player dropped at a point in the side's percentage space.
    DropPlayer {
        side: Side,
        point: PitchPoint,
        payload: String,
    },
    RemovePlayer {
        side: Side,
        slot: usize,
    },
    Predict,
    SaveAnalysis {
        side: Side,
        name: String,
    },
    RefreshAnalyses,
    /// `None` empties the compare slot.
    SelectCompare {
        slot: usize,
        analysis_id: Option<i64>,
    },
    /// Add `team` to the favourites, or remove it if already there.
    ToggleFavourite {
        team: String,
    },
    /// Publish the side's full lineup as a new team called `name`.
    CreateTeam {
        side: Side,
        name: String,
    },
    Quit,
}

// ---------------------------------------------------------------------------
// Backend tasks -> app
// ---------------------------------------------------------------------------

/// Completed backend request. Every variant carries the generation that was
/// current when the request was issued.
#[derive(Debug)]
pub enum BackendEvent {
    Teams {
        generation: u64,
        result: Result<Vec<String>, BackendError>,
    },
    Roster {
        side: Side,
        team: String,
        generation: u64,
        result: Result<Vec<Player>, BackendError>,
    },
    Prediction {
        generation: u64,
        result: Result<PredictionResponse, BackendError>,
    },
    Saved {
        name: String,
        result: Result<i64, BackendError>,
    },
    Analyses {
        generation: u64,
        result: Result<Vec<AnalysisSummary>, BackendError>,
    },
    CompareLoaded {
        slot: usize,
        analysis_id: i64,
        generation: u64,
        result: Result<AnalysisView, BackendError>,
    },
    TeamCreated {
        name: String,
        result: Result<(), BackendError>,
    },
}

// ---------------------------------------------------------------------------
// App -> TUI
// ---------------------------------------------------------------------------

/// Board state plus per-side roster loading flags.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub board: MatchBoard,
    pub loading: [bool; 2],
}

impl BoardSnapshot {
    pub fn is_loading(&self, side: Side) -> bool {
        self.loading[side.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionStatus {
    Idle,
    Pending,
    Winner(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short inline message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompareSlotState {
    Empty,
    Loading(i64),
    Ready(Box<AnalysisView>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum UiUpdate {
    Board(Box<BoardSnapshot>),
    /// Selectable teams, favourites first.
    Teams(Vec<String>),
    Favourites(Vec<String>),
    Prediction(PredictionStatus),
    Notice(Notice),
    Analyses(Vec<AnalysisSummary>),
    CompareSlot {
        slot: usize,
        state: CompareSlotState,
    },
}
