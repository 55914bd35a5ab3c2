// SQLite persistence for saved analyses and favourite teams.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lineup_core::analysis::{AnalysisSummary, SavedAnalysis};
use lineup_core::favourites::Favourites;
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed store for saved analyses (scoped by owner) and the local
/// favourite teams list.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS analyses (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                owner      TEXT NOT NULL,
                name       TEXT NOT NULL,
                team       TEXT,
                formation  TEXT NOT NULL,
                payload    TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_owner ON analyses(owner);

            CREATE TABLE IF NOT EXISTS favourite_teams (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                team TEXT NOT NULL UNIQUE
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an analysis under `owner` and return its new id. Any id already
    /// on the analysis is ignored.
    pub fn save_analysis(&self, owner: &str, analysis: &SavedAnalysis) -> Result<i64> {
        let created_at = analysis.created_at.unwrap_or_else(Utc::now);
        let mut stored = analysis.clone();
        stored.id = None;
        stored.created_at = Some(created_at);
        let payload = serde_json::to_string(&stored).context("failed to serialize analysis")?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO analyses (owner, name, team, formation, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                owner,
                stored.name,
                stored.team,
                stored.formation,
                payload,
                created_at.to_rfc3339(),
            ],
        )
        .context("failed to insert analysis")?;
        Ok(conn.last_insert_rowid())
    }

    /// Load one analysis by id.
    pub fn load_analysis(&self, id: i64) -> Result<Option<SavedAnalysis>> {
        let conn = self.conn();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT payload, created_at FROM analyses WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to query analysis")?;

        let Some((payload, created_at)) = row else {
            return Ok(None);
        };

        let mut analysis: SavedAnalysis = serde_json::from_str(&payload)
            .with_context(|| format!("corrupt payload for analysis {id}"))?;
        analysis.id = Some(id);
        if let Ok(ts) = DateTime::parse_from_rfc3339(&created_at) {
            analysis.created_at = Some(ts.with_timezone(&Utc));
        }
        Ok(Some(analysis))
    }

    /// List `owner`'s analyses, newest first.
    pub fn list_analyses(&self, owner: &str) -> Result<Vec<AnalysisSummary>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, team FROM analyses WHERE owner = ?1 ORDER BY id DESC")
            .context("failed to prepare list_analyses query")?;

        let rows = stmt
            .query_map(params![owner], |row| {
                Ok(AnalysisSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    team: row.get(2)?,
                })
            })
            .context("failed to query analyses")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("failed to read analysis row")?);
        }
        Ok(out)
    }
}

impl Database {
    /// Favourite teams in the order they were added.
    pub fn favourites(&self) -> Result<Favourites> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT team FROM favourite_teams ORDER BY id")
            .context("failed to prepare favourites query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("failed to query favourites")?;

        let mut teams = Vec::new();
        for row in rows {
            teams.push(row.context("failed to read favourite row")?);
        }
        Ok(Favourites::new(teams))
    }

    /// Flip `team`'s favourite flag and return the updated list.
    pub fn toggle_favourite(&self, team: &str) -> Result<Favourites> {
        let mut favourites = self.favourites()?;
        let team = team.trim();
        let now_favourite = favourites.toggle(team);

        let conn = self.conn();
        if now_favourite {
            conn.execute(
                "INSERT OR IGNORE INTO favourite_teams (team) VALUES (?1)",
                params![team],
            )
            .context("failed to add favourite")?;
        } else {
            conn.execute("DELETE FROM favourite_teams WHERE team = ?1", params![team])
                .context("failed to remove favourite")?;
        }
        Ok(favourites)
    }
}
