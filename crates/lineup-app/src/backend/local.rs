// Offline backend: CSV rosters on disk and the SQLite analysis store. Custom
// teams are written as new roster files.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use lineup_core::analysis::{AnalysisSummary, SavedAnalysis};
use lineup_core::board::{PredictionRequest, PredictionResponse};
use lineup_core::custom_team::CustomTeam;
use lineup_core::player::Player;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Backend, BackendError};
use crate::db::Database;

// ---------------------------------------------------------------------------
// Roster CSV loading
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterCsvError {
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// One roster row. Columns beyond these are ignored.
#[derive(Debug, Deserialize)]
struct RawRosterRow {
    name: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    rating: Option<f64>,
}

fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) => {
                if raw.name.is_empty() {
                    warn!("skipping roster row with empty name");
                    continue;
                }
                let rating = raw.rating.unwrap_or(0.0);
                if !rating.is_finite() {
                    warn!("skipping player '{}': non-finite rating", raw.name);
                    continue;
                }
                players.push(Player::new(raw.name, raw.position, rating));
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(players)
}

/// Row written for a custom team. Unrated players leave `rating` empty.
#[derive(Debug, Serialize)]
struct RosterRow<'a> {
    name: &'a str,
    position: &'a str,
    rating: Option<f64>,
}

/// Write `team` as a new roster file at `path`. An existing file is never
/// replaced.
fn write_roster_csv(path: &Path, team: &CustomTeam) -> Result<(), BackendError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| BackendError::Storage(format!("cannot create {}: {e}", dir.display())))?;
    }
    let file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(BackendError::Rejected(format!(
                "team {:?} already exists",
                team.name
            )))
        }
        Err(e) => {
            return Err(BackendError::Storage(format!(
                "cannot create {}: {e}",
                path.display()
            )))
        }
    };

    let mut writer = csv::Writer::from_writer(file);
    for player in &team.players {
        writer
            .serialize(RosterRow {
                name: &player.name,
                position: &player.position,
                rating: (player.rating != 0.0).then_some(player.rating),
            })
            .map_err(|e| BackendError::Storage(format!("cannot write {}: {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| BackendError::Storage(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

/// Load a `name,position,rating` roster file.
pub fn load_roster_csv(path: &Path) -> Result<Vec<Player>, RosterCsvError> {
    let file = std::fs::File::open(path).map_err(|e| RosterCsvError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_roster_from_reader(file).map_err(|e| RosterCsvError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// LocalBackend
// ---------------------------------------------------------------------------

pub struct LocalBackend {
    rosters_dir: PathBuf,
    db: Arc<Database>,
    owner: String,
}

impl LocalBackend {
    pub fn new(rosters_dir: PathBuf, db: Arc<Database>, owner: String) -> Self {
        Self {
            rosters_dir,
            db,
            owner,
        }
    }

    /// Roster file for `team`. Names that could escape the rosters directory
    /// are refused.
    fn roster_path(&self, team: &str) -> Result<PathBuf, BackendError> {
        let team = team.trim();
        if team.is_empty() || team.contains(['/', '\\']) || team.starts_with('.') {
            return Err(BackendError::NotFound(format!("team {team:?}")));
        }
        Ok(self.rosters_dir.join(format!("{team}.csv")))
    }

    /// Run a blocking database call off the async runtime.
    async fn with_db<T, F>(&self, f: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| BackendError::Storage(e.to_string()))?
            .map_err(|e| BackendError::Storage(format!("{e:#}")))
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn list_teams(&self) -> Result<Vec<String>, BackendError> {
        let dir = self.rosters_dir.clone();
        let teams = tokio::task::spawn_blocking(move || -> Result<Vec<String>, BackendError> {
            let entries = std::fs::read_dir(&dir).map_err(|e| {
                BackendError::Storage(format!("cannot read rosters dir {}: {e}", dir.display()))
            })?;
            let mut teams: Vec<String> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
                .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
                .collect();
            teams.sort();
            Ok(teams)
        })
        .await
        .map_err(|e| BackendError::Storage(e.to_string()))??;
        info!("Found {} local rosters", teams.len());
        Ok(teams)
    }

    async fn fetch_roster(&self, team: &str) -> Result<Vec<Player>, BackendError> {
        let path = self.roster_path(team)?;
        if !path.exists() {
            return Err(BackendError::NotFound(format!("roster for {team}")));
        }
        let players = tokio::task::spawn_blocking(move || load_roster_csv(&path))
            .await
            .map_err(|e| BackendError::Storage(e.to_string()))??;
        Ok(players)
    }

    async fn predict(
        &self,
        _request: &PredictionRequest,
    ) -> Result<PredictionResponse, BackendError> {
        Err(BackendError::Unavailable("match prediction"))
    }

    async fn save_analysis(&self, analysis: &SavedAnalysis) -> Result<i64, BackendError> {
        let owner = self.owner.clone();
        let analysis = analysis.clone();
        self.with_db(move |db| db.save_analysis(&owner, &analysis))
            .await
    }

    async fn fetch_analysis(&self, id: i64) -> Result<SavedAnalysis, BackendError> {
        self.with_db(move |db| db.load_analysis(id))
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("analysis {id}")))
    }

    async fn list_analyses(&self) -> Result<Vec<AnalysisSummary>, BackendError> {
        let owner = self.owner.clone();
        self.with_db(move |db| db.list_analyses(&owner)).await
    }

    async fn create_team(&self, team: &CustomTeam) -> Result<(), BackendError> {
        let path = self.roster_path(&team.name)?;
        let owned = team.clone();
        tokio::task::spawn_blocking(move || write_roster_csv(&path, &owned))
            .await
            .map_err(|e| BackendError::Storage(e.to_string()))??;
        info!("Created local roster for custom team '{}'", team.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_rosters(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("Arsenal.csv"),
            "name,position,rating\nDavid Raya,Goalkeeper,85\nBukayo Saka,Forward,88\n",
        )
        .unwrap();
        fs::write(dir.join("Chelsea.csv"), "name,position,rating\nCole Palmer,Midfielder,87\n")
            .unwrap();
        fs::write(dir.join("notes.txt"), "not a roster").unwrap();
        dir
    }

    fn local(dir: PathBuf) -> LocalBackend {
        LocalBackend::new(
            dir,
            Arc::new(Database::open(":memory:").unwrap()),
            "tester".into(),
        )
    }

    #[test]
    fn reader_trims_and_skips_bad_rows() {
        let data = "\
name, position, rating
 Declan Rice , Midfielder , 87
,Defender,80
Kai Havertz,Forward,not-a-number
Trialist,,
";
        let players = load_roster_from_reader(data.as_bytes()).unwrap();
        assert_eq!(
            players,
            vec![
                Player::new("Declan Rice", "Midfielder", 87.0),
                Player::new("Trialist", "", 0.0),
            ]
        );
    }

    #[test]
    fn extra_columns_are_ignored() {
        let data = "name,position,rating,nationality\nSaka,Forward,88,ENG\n";
        let players = load_roster_from_reader(data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].rating, 88.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_roster_csv(Path::new("/nonexistent/roster.csv")).unwrap_err();
        assert!(matches!(err, RosterCsvError::Io { .. }));
    }

    #[tokio::test]
    async fn lists_csv_stems_sorted() {
        let dir = temp_rosters("lineup_local_list");
        let teams = local(dir.clone()).list_teams().await.unwrap();
        assert_eq!(teams, vec!["Arsenal", "Chelsea"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn fetches_roster_by_team() {
        let dir = temp_rosters("lineup_local_fetch");
        let b = local(dir.clone());
        let players = b.fetch_roster("Arsenal").await.unwrap();
        assert_eq!(players.len(), 2);
        assert!(matches!(
            b.fetch_roster("Wrexham").await.unwrap_err(),
            BackendError::NotFound(_)
        ));
        assert!(matches!(
            b.fetch_roster("../Arsenal").await.unwrap_err(),
            BackendError::NotFound(_)
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn prediction_is_unavailable() {
        let b = local(std::env::temp_dir());
        let req = PredictionRequest {
            team_a: "A".into(),
            team_b: "B".into(),
            left_formation: Default::default(),
            right_formation: Default::default(),
            left_playing_11: Default::default(),
            right_playing_11: Default::default(),
            left_rating: 0.0,
            right_rating: 0.0,
        };
        assert!(matches!(
            b.predict(&req).await.unwrap_err(),
            BackendError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn analyses_round_trip_through_store() {
        let b = local(std::env::temp_dir());
        let mut a: SavedAnalysis = serde_json::from_str("{}").unwrap();
        a.name = "Counter".into();
        a.team = Some("Chelsea".into());
        a.formation = "3-5-2".into();

        let id = b.save_analysis(&a).await.unwrap();
        let list = b.list_analyses().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);

        let loaded = b.fetch_analysis(id).await.unwrap();
        assert_eq!(loaded.formation, "3-5-2");
        assert!(matches!(
            b.fetch_analysis(id + 1).await.unwrap_err(),
            BackendError::NotFound(_)
        ));
    }

    fn dream_xi() -> CustomTeam {
        let mut players = vec![Player::new("Keeper", "Goalkeeper", 0.0)];
        players.extend((1..11).map(|i| Player::new(format!("Player {i}"), "Midfielder", 70.0)));
        CustomTeam::new("Dream XI", players).unwrap()
    }

    #[tokio::test]
    async fn created_team_becomes_a_roster() {
        let dir = temp_rosters("lineup_local_create");
        let b = local(dir.clone());
        b.create_team(&dream_xi()).await.unwrap();

        let teams = b.list_teams().await.unwrap();
        assert_eq!(teams, vec!["Arsenal", "Chelsea", "Dream XI"]);
        let players = b.fetch_roster("Dream XI").await.unwrap();
        assert_eq!(players.len(), 11);
        assert_eq!(players[0], Player::new("Keeper", "Goalkeeper", 0.0));
        assert_eq!(players[1].rating, 70.0);

        // A second create must not overwrite the first
        assert!(matches!(
            b.create_team(&dream_xi()).await.unwrap_err(),
            BackendError::Rejected(_)
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn created_team_name_cannot_escape_rosters_dir() {
        let dir = temp_rosters("lineup_local_create_escape");
        let mut team = dream_xi();
        team.name = "../outside".into();
        assert!(local(dir.clone()).create_team(&team).await.is_err());
        assert!(!dir.parent().unwrap().join("outside.csv").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
