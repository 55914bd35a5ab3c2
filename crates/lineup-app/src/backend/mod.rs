// External collaborators: roster source, match predictor, analysis store,
// custom team creation.
//
// The app talks to one `Backend`. The HTTP implementation targets the remote
// service; the local one serves CSV rosters and a SQLite analysis store so
// the board works offline.

pub mod http;
pub mod local;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lineup_core::analysis::{AnalysisSummary, SavedAnalysis};
use lineup_core::board::{PredictionRequest, PredictionResponse};
use lineup_core::custom_team::CustomTeam;
use lineup_core::player::Player;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::db::Database;

pub use http::HttpBackend;
pub use local::{load_roster_csv, LocalBackend, RosterCsvError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not authorized; check the token in config/credentials.toml")]
    Unauthorized,

    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0} is not available offline")]
    Unavailable(&'static str),

    #[error("local storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Roster(#[from] RosterCsvError),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Backend: Send + Sync {
    /// Names of the teams that can be selected.
    async fn list_teams(&self) -> Result<Vec<String>, BackendError>;

    async fn fetch_roster(&self, team: &str) -> Result<Vec<Player>, BackendError>;

    async fn predict(&self, request: &PredictionRequest)
        -> Result<PredictionResponse, BackendError>;

    /// Persist an analysis and return its id.
    async fn save_analysis(&self, analysis: &SavedAnalysis) -> Result<i64, BackendError>;

    async fn fetch_analysis(&self, id: i64) -> Result<SavedAnalysis, BackendError>;

    /// Analyses belonging to the configured owner.
    async fn list_analyses(&self) -> Result<Vec<AnalysisSummary>, BackendError>;

    /// Register a user-built team so it shows up in `list_teams`.
    async fn create_team(&self, team: &CustomTeam) -> Result<(), BackendError>;
}

/// Open the local SQLite store, creating its parent directory if needed.
/// Favourites live here whichever backend is in use.
pub fn open_store(config: &Config) -> anyhow::Result<Arc<Database>> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
    }
    let db_path = config.db_path.to_string_lossy();
    info!("Opening local store at {}", db_path);
    Ok(Arc::new(Database::open(&db_path)?))
}

/// Pick the remote backend when `backend.base_url` is configured, otherwise
/// the local one backed by `store`.
pub fn backend_from_config(
    config: &Config,
    store: Arc<Database>,
) -> anyhow::Result<Arc<dyn Backend>> {
    match &config.backend.base_url {
        Some(url) => {
            info!("Using remote backend at {}", url);
            let backend = HttpBackend::from_config(config)
                .with_context(|| format!("invalid backend.base_url {url:?}"))?;
            Ok(Arc::new(backend))
        }
        None => {
            info!(
                "Using local backend: rosters={}",
                config.rosters_dir.display()
            );
            Ok(Arc::new(LocalBackend::new(
                config.rosters_dir.clone(),
                store,
                config.backend.owner.clone(),
            )))
        }
    }
}
