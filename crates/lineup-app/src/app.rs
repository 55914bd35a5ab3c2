// Application state and orchestration logic.
//
// The event loop applies user commands to the match board, issues backend
// requests as spawned tasks, and folds their results back in. Each async
// concern has its own generation counter; a result is applied only when its
// generation is still current and the team or analysis it was requested for
// is still selected.

use std::future::Future;
use std::sync::Arc;

use lineup_core::analysis::{evaluate, SavedAnalysis};
use lineup_core::board::{MatchBoard, Side};
use lineup_core::custom_team::{CustomTeam, CustomTeamError};
use lineup_core::favourites::Favourites;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::config::Config;
use crate::db::Database;
use crate::protocol::{
    BackendEvent, BoardSnapshot, CompareSlotState, Notice, PredictionStatus, UiUpdate,
    UserCommand, COMPARE_SLOTS,
};

// ---------------------------------------------------------------------------
// Generations
// ---------------------------------------------------------------------------

/// Request counters, one per async concern. Bumped each time a request is
/// issued so that older in-flight results can be recognized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generations {
    pub teams: u64,
    pub roster: [u64; 2],
    pub prediction: u64,
    pub analyses: u64,
    pub compare: [u64; COMPARE_SLOTS],
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub board: MatchBoard,
    /// Teams as the backend listed them.
    pub teams: Vec<String>,
    pub favourites: Favourites,
    pub generations: Generations,
    /// Whether a roster request is outstanding for each side.
    pub roster_loading: [bool; 2],
    /// Teams the outstanding prediction was requested for.
    pub pending_prediction: Option<(String, String)>,
    /// Analysis id selected in each compare slot.
    pub compare_selection: [Option<i64>; COMPARE_SLOTS],
    backend: Arc<dyn Backend>,
    store: Arc<Database>,
    backend_tx: mpsc::Sender<BackendEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        store: Arc<Database>,
        backend_tx: mpsc::Sender<BackendEvent>,
    ) -> Self {
        let board = MatchBoard::new(config.default_formation, config.rating);
        let favourites = store.favourites().unwrap_or_else(|e| {
            warn!("Could not load favourite teams: {:#}", e);
            Favourites::default()
        });
        AppState {
            config,
            board,
            teams: Vec::new(),
            favourites,
            generations: Generations::default(),
            roster_loading: [false; 2],
            pending_prediction: None,
            compare_selection: [None; COMPARE_SLOTS],
            backend,
            store,
            backend_tx,
        }
    }

    /// The team list in display order: favourites first.
    pub fn ordered_teams(&self) -> Vec<String> {
        self.favourites.order_teams(&self.teams)
    }

    /// Flip `team` in the persisted favourites. Returns whether it is now a
    /// favourite.
    pub fn toggle_favourite(&mut self, team: &str) -> anyhow::Result<bool> {
        self.favourites = self.store.toggle_favourite(team)?;
        Ok(self.favourites.contains(team))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.board.clone(),
            loading: self.roster_loading,
        }
    }

    /// Run a backend call on its own task and route the resulting event back
    /// into the loop.
    fn spawn_request<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = BackendEvent> + Send + 'static,
    {
        let fut = request(Arc::clone(&self.backend));
        let tx = self.backend_tx.clone();
        tokio::spawn(async move {
            let event = fut.await;
            if tx.send(event).await.is_err() {
                debug!("Backend event dropped: event loop has exited");
            }
        });
    }

    // -----------------------------------------------------------------------
    // Request issuers
    // -----------------------------------------------------------------------

    pub fn request_teams(&mut self) {
        self.generations.teams += 1;
        let generation = self.generations.teams;
        self.spawn_request(move |backend| async move {
            BackendEvent::Teams {
                generation,
                result: backend.list_teams().await,
            }
        });
    }

    /// Select a team for `side`: the side is reset immediately and the roster
    /// fetched in the background.
    pub fn select_team(&mut self, side: Side, team: Option<String>) {
        let idx = side.index();
        self.generations.roster[idx] += 1;
        let generation = self.generations.roster[idx];
        self.board.side_mut(side).reset(team.clone(), Vec::new());

        let Some(team) = team else {
            self.roster_loading[idx] = false;
            info!("Cleared {} side", side);
            return;
        };

        info!("Selecting {} for {} side (gen: {})", team, side, generation);
        self.roster_loading[idx] = true;
        self.spawn_request(move |backend| async move {
            let result = backend.fetch_roster(&team).await;
            BackendEvent::Roster {
                side,
                team,
                generation,
                result,
            }
        });
    }

    /// Ask for a prediction. Returns `false` when both teams are not selected.
    pub fn request_prediction(&mut self) -> bool {
        let Some(request) = self.board.prediction_request() else {
            return false;
        };
        self.generations.prediction += 1;
        let generation = self.generations.prediction;
        self.pending_prediction = Some((request.team_a.clone(), request.team_b.clone()));
        info!(
            "Requesting prediction {} vs {} (gen: {})",
            request.team_a, request.team_b, generation
        );
        self.spawn_request(move |backend| async move {
            BackendEvent::Prediction {
                generation,
                result: backend.predict(&request).await,
            }
        });
        true
    }

    /// Save a snapshot of `side`. Returns `false` when the side has no team.
    pub fn request_save(&mut self, side: Side, name: String) -> bool {
        let board_side = self.board.side(side);
        if board_side.team().is_none() {
            return false;
        }
        let analysis = SavedAnalysis::from_side(name.clone(), board_side);
        info!("Saving analysis '{}' for {} side", name, side);
        self.spawn_request(move |backend| async move {
            BackendEvent::Saved {
                name,
                result: backend.save_analysis(&analysis).await,
            }
        });
        true
    }

    /// Publish the assigned players of `side` as a new team.
    pub fn request_create_team(&mut self, side: Side, name: &str) -> Result<(), CustomTeamError> {
        let team = CustomTeam::from_side(name, self.board.side(side))?;
        info!(
            "Creating team '{}' from the {} side ({} players)",
            team.name,
            side,
            team.players.len()
        );
        let name = team.name.clone();
        self.spawn_request(move |backend| async move {
            BackendEvent::TeamCreated {
                name,
                result: backend.create_team(&team).await,
            }
        });
        Ok(())
    }

    pub fn request_analyses(&mut self) {
        self.generations.analyses += 1;
        let generation = self.generations.analyses;
        self.spawn_request(move |backend| async move {
            BackendEvent::Analyses {
                generation,
                result: backend.list_analyses().await,
            }
        });
    }

    /// Point a compare slot at an analysis and load it with its team's
    /// roster. Returns the slot's immediate state, or `None` when `slot` is
    /// out of range.
    pub fn select_compare(
        &mut self,
        slot: usize,
        analysis_id: Option<i64>,
    ) -> Option<CompareSlotState> {
        if slot >= COMPARE_SLOTS {
            warn!("Ignoring compare selection for slot {}", slot);
            return None;
        }
        self.generations.compare[slot] += 1;
        let generation = self.generations.compare[slot];
        self.compare_selection[slot] = analysis_id;

        let Some(analysis_id) = analysis_id else {
            return Some(CompareSlotState::Empty);
        };

        let policy = self.config.rating;
        self.spawn_request(move |backend| async move {
            let result = async {
                let analysis = backend.fetch_analysis(analysis_id).await?;
                let roster = match analysis.team.as_deref() {
                    Some(team) if !team.is_empty() => backend.fetch_roster(team).await?,
                    _ => Vec::new(),
                };
                Ok::<_, BackendError>(evaluate(&analysis, &roster, &policy))
            }
            .await;
            BackendEvent::CompareLoaded {
                slot,
                analysis_id,
                generation,
                result,
            }
        });
        Some(CompareSlotState::Loading(analysis_id))
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens for user commands from the TUI and completed backend requests,
/// pushing UI updates through `ui_tx`. Returns on `Quit` or when the command
/// channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut backend_rx: mpsc::Receiver<BackendEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let _ = ui_tx
        .send(UiUpdate::Board(Box::new(state.snapshot())))
        .await;
    send_favourites(&state, &ui_tx).await;
    state.request_teams();
    state.request_analyses();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = backend_rx.recv() => {
                // The state holds a sender, so the channel never closes here.
                if let Some(event) = event {
                    handle_backend_event(&mut state, event, &ui_tx).await;
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn send_board(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Board(Box::new(state.snapshot())))
        .await;
}

async fn send_favourites(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Favourites(state.favourites.teams().to_vec()))
        .await;
}

async fn send_notice(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Handle a user command from the TUI.
pub async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::RefreshTeams => state.request_teams(),
        UserCommand::SelectTeam { side, team } => {
            state.select_team(side, team);
            send_board(state, ui_tx).await;
        }
        UserCommand::SetFormation { side, formation } => {
            state.board.side_mut(side).set_formation(formation);
            send_board(state, ui_tx).await;
        }
        UserCommand::DropPlayer {
            side,
            point,
            payload,
        } => {
            let outcome = state.board.side_mut(side).drop_payload(point, &payload);
            if outcome.changed() {
                send_board(state, ui_tx).await;
            } else {
                debug!("Drop on {} side left the board unchanged: {:?}", side, outcome);
            }
        }
        UserCommand::RemovePlayer { side, slot } => {
            if state.board.side_mut(side).remove_player(slot).is_some() {
                send_board(state, ui_tx).await;
            }
        }
        UserCommand::Predict => {
            if state.request_prediction() {
                let _ = ui_tx
                    .send(UiUpdate::Prediction(PredictionStatus::Pending))
                    .await;
            } else {
                send_notice(ui_tx, Notice::error("Select a team on both sides first")).await;
            }
        }
        UserCommand::SaveAnalysis { side, name } => {
            if !state.request_save(side, name) {
                send_notice(
                    ui_tx,
                    Notice::error(format!("Select a team on the {side} side before saving")),
                )
                .await;
            }
        }
        UserCommand::RefreshAnalyses => state.request_analyses(),
        UserCommand::SelectCompare { slot, analysis_id } => {
            let Some(slot_state) = state.select_compare(slot, analysis_id) else {
                return;
            };
            let _ = ui_tx
                .send(UiUpdate::CompareSlot {
                    slot,
                    state: slot_state,
                })
                .await;
        }
        UserCommand::ToggleFavourite { team } => match state.toggle_favourite(&team) {
            Ok(now_favourite) => {
                info!("Favourite {}: {}", team, now_favourite);
                send_favourites(state, ui_tx).await;
                let _ = ui_tx.send(UiUpdate::Teams(state.ordered_teams())).await;
                let message = if now_favourite {
                    format!("{team} added to favourites")
                } else {
                    format!("{team} removed from favourites")
                };
                send_notice(ui_tx, Notice::info(message)).await;
            }
            Err(e) => {
                warn!("Toggling favourite {} failed: {:#}", team, e);
                send_notice(ui_tx, Notice::error(format!("Could not update favourites: {e}")))
                    .await;
            }
        },
        UserCommand::CreateTeam { side, name } => {
            if let Err(e) = state.request_create_team(side, &name) {
                send_notice(ui_tx, Notice::error(format!("Cannot create team: {e}"))).await;
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Fold a completed backend request into the state.
///
/// Results whose generation is stale, or whose team/analysis is no longer
/// selected, are discarded.
pub async fn handle_backend_event(
    state: &mut AppState,
    event: BackendEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        BackendEvent::Teams { generation, result } => {
            if generation != state.generations.teams {
                debug!(
                    "Discarding stale team list (gen: {}, current: {})",
                    generation, state.generations.teams
                );
                return;
            }
            let teams = match result {
                Ok(teams) => teams,
                Err(e) => {
                    warn!("Team list failed: {}", e);
                    send_notice(ui_tx, Notice::error(format!("Could not load teams: {e}"))).await;
                    Vec::new()
                }
            };
            info!("Loaded {} teams", teams.len());
            state.teams = teams;
            let _ = ui_tx.send(UiUpdate::Teams(state.ordered_teams())).await;
        }

        BackendEvent::Roster {
            side,
            team,
            generation,
            result,
        } => {
            let idx = side.index();
            let current = state.generations.roster[idx];
            let selected = state.board.side(side).team();
            if generation != current || selected != Some(team.as_str()) {
                debug!(
                    "Discarding stale roster for {} on {} side (gen: {}, current: {}, selected: {:?})",
                    team, side, generation, current, selected
                );
                return;
            }
            state.roster_loading[idx] = false;
            match result {
                Ok(players) => {
                    info!("Loaded {} players for {} ({} side)", players.len(), team, side);
                    state.board.side_mut(side).reset(Some(team), players);
                }
                Err(e) => {
                    warn!("Roster fetch for {} failed: {}", team, e);
                    send_notice(
                        ui_tx,
                        Notice::error(format!("Could not load {team} roster: {e}")),
                    )
                    .await;
                }
            }
            send_board(state, ui_tx).await;
        }

        BackendEvent::Prediction { generation, result } => {
            let current_teams = state
                .board
                .prediction_request()
                .map(|r| (r.team_a, r.team_b));
            if generation != state.generations.prediction
                || state.pending_prediction.is_none()
                || current_teams != state.pending_prediction
            {
                debug!(
                    "Discarding stale prediction (gen: {}, current: {})",
                    generation, state.generations.prediction
                );
                return;
            }
            state.pending_prediction = None;
            match result {
                Ok(response) => {
                    info!("Predicted winner: {}", response.winner);
                    let _ = ui_tx
                        .send(UiUpdate::Prediction(PredictionStatus::Winner(response.winner)))
                        .await;
                }
                Err(e) => {
                    warn!("Prediction failed: {}", e);
                    let _ = ui_tx
                        .send(UiUpdate::Prediction(PredictionStatus::Idle))
                        .await;
                    send_notice(ui_tx, Notice::error(format!("Prediction failed: {e}"))).await;
                }
            }
        }

        BackendEvent::Saved { name, result } => match result {
            Ok(id) => {
                info!("Saved analysis '{}' as #{}", name, id);
                send_notice(ui_tx, Notice::info(format!("Saved analysis '{name}' (#{id})"))).await;
                state.request_analyses();
            }
            Err(e) => {
                warn!("Saving analysis '{}' failed: {}", name, e);
                send_notice(ui_tx, Notice::error(format!("Save failed: {e}"))).await;
            }
        },

        BackendEvent::TeamCreated { name, result } => match result {
            Ok(()) => {
                info!("Created team '{}'", name);
                send_notice(ui_tx, Notice::info(format!("Created team '{name}'"))).await;
                state.request_teams();
            }
            Err(e) => {
                warn!("Creating team '{}' failed: {}", name, e);
                send_notice(ui_tx, Notice::error(format!("Team creation failed: {e}"))).await;
            }
        },

        BackendEvent::Analyses { generation, result } => {
            if generation != state.generations.analyses {
                debug!(
                    "Discarding stale analysis list (gen: {}, current: {})",
                    generation, state.generations.analyses
                );
                return;
            }
            let analyses = match result {
                Ok(list) => list,
                Err(e) => {
                    warn!("Analysis list failed: {}", e);
                    send_notice(ui_tx, Notice::error(format!("Could not load analyses: {e}")))
                        .await;
                    Vec::new()
                }
            };
            let _ = ui_tx.send(UiUpdate::Analyses(analyses)).await;
        }

        BackendEvent::CompareLoaded {
            slot,
            analysis_id,
            generation,
            result,
        } => {
            let current = state.generations.compare.get(slot).copied();
            let selected = state.compare_selection.get(slot).copied().flatten();
            if current != Some(generation) || selected != Some(analysis_id) {
                debug!(
                    "Discarding stale compare result for slot {} (analysis {}, gen: {})",
                    slot, analysis_id, generation
                );
                return;
            }
            let slot_state = match result {
                Ok(view) => CompareSlotState::Ready(Box::new(view)),
                Err(e) => {
                    warn!("Compare slot {} failed to load analysis {}: {}", slot, analysis_id, e);
                    CompareSlotState::Failed(e.to_string())
                }
            };
            let _ = ui_tx
                .send(UiUpdate::CompareSlot {
                    slot,
                    state: slot_state,
                })
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
