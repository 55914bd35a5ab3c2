// HTTP client for the remote roster/prediction/analysis service.

use std::time::Duration;

use async_trait::async_trait;
use lineup_core::analysis::{AnalysisSummary, SavedAnalysis};
use lineup_core::board::{PredictionRequest, PredictionResponse};
use lineup_core::custom_team::CustomTeam;
use lineup_core::player::Player;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Backend, BackendError};
use crate::config::Config;

/// Error bodies are truncated to this many characters in messages.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TeamsBody {
    #[serde(default)]
    teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlayersBody {
    #[serde(default)]
    players: Vec<Player>,
}

#[derive(Debug, Deserialize)]
struct PredictBody {
    winner: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SavedBody {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct AnalysesBody {
    #[serde(default)]
    analyses: Vec<AnalysisSummary>,
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

/// `POST /custom-teams` body. Unrated players omit `rating`.
#[derive(Debug, Serialize)]
struct CustomTeamBody<'a> {
    name: &'a str,
    players: Vec<CustomPlayerBody<'a>>,
}

#[derive(Debug, Serialize)]
struct CustomPlayerBody<'a> {
    name: &'a str,
    position: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
}

impl<'a> From<&'a CustomTeam> for CustomTeamBody<'a> {
    fn from(team: &'a CustomTeam) -> Self {
        CustomTeamBody {
            name: &team.name,
            players: team
                .players
                .iter()
                .map(|p| CustomPlayerBody {
                    name: &p.name,
                    position: &p.position,
                    rating: (p.rating != 0.0).then_some(p.rating),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url).map_err(|e| BackendError::Transport(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Transport(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let base = config.backend.base_url.as_deref().unwrap_or_default();
        Self::new(
            base,
            config.credentials.token.clone(),
            Duration::from_secs(config.backend.timeout_secs),
        )
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON response, mapping 401 and non-2xx statuses.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend returned 401");
            return Err(BackendError::Unauthorized);
        }
        let text = response.text().await?;
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(truncate(&text)));
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&text),
            });
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct DetailBody {
    detail: String,
}

fn detail_message(body: &str) -> Option<String> {
    serde_json::from_str::<DetailBody>(body).ok().map(|b| b.detail)
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_teams(&self) -> Result<Vec<String>, BackendError> {
        let body: TeamsBody = self.send_json(self.request(Method::GET, &["teams"])).await?;
        Ok(body.teams)
    }

    async fn fetch_roster(&self, team: &str) -> Result<Vec<Player>, BackendError> {
        let body: PlayersBody = self
            .send_json(self.request(Method::GET, &["players", team]))
            .await?;
        Ok(body.players)
    }

    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, BackendError> {
        let body: PredictBody = self
            .send_json(self.request(Method::POST, &["predict"]).json(request))
            .await?;
        if let Some(error) = body.error {
            return Err(BackendError::Rejected(error));
        }
        body.winner
            .map(|winner| PredictionResponse { winner })
            .ok_or_else(|| BackendError::Decode("prediction response has no winner".into()))
    }

    async fn save_analysis(&self, analysis: &SavedAnalysis) -> Result<i64, BackendError> {
        let body: SavedBody = self
            .send_json(self.request(Method::POST, &["analysis"]).json(analysis))
            .await?;
        Ok(body.id)
    }

    async fn fetch_analysis(&self, id: i64) -> Result<SavedAnalysis, BackendError> {
        let id_text = id.to_string();
        let mut analysis: SavedAnalysis = self
            .send_json(self.request(Method::GET, &["analysis", &id_text]))
            .await?;
        analysis.id.get_or_insert(id);
        Ok(analysis)
    }

    async fn list_analyses(&self) -> Result<Vec<AnalysisSummary>, BackendError> {
        let body: AnalysesBody = self
            .send_json(self.request(Method::GET, &["analysis"]))
            .await?;
        Ok(body.analyses)
    }

    async fn create_team(&self, team: &CustomTeam) -> Result<(), BackendError> {
        let body = CustomTeamBody::from(team);
        let result: Result<serde_json::Value, _> = self
            .send_json(self.request(Method::POST, &["custom-teams"]).json(&body))
            .await;
        match result {
            Ok(_) => Ok(()),
            // Validation failures carry a `detail` message worth showing as is.
            Err(BackendError::Status { body, status }) => match detail_message(&body) {
                Some(detail) => Err(BackendError::Rejected(detail)),
                None => Err(BackendError::Status { status, body }),
            },
            Err(e) => Err(e),
        }
    }
}
