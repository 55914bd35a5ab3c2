// Configuration loading and parsing (app.toml, credentials.toml).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use lineup_core::formation::Formation;
use lineup_core::rating::RatingPolicy;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub default_formation: Formation,
    pub rating: RatingPolicy,
    pub db_path: PathBuf,
    pub rosters_dir: PathBuf,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire app.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    backend: BackendConfig,
    board: BoardSection,
    rating: RatingPolicy,
    #[serde(default)]
    database: DatabaseSection,
    data: DataSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Remote backend root, e.g. `http://localhost:8000`. When absent the app
    /// runs against local rosters and the local analysis store.
    #[serde(default)]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// Owner name analyses are saved under and listed by.
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
struct BoardSection {
    default_formation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    rosters_dir: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Bearer token attached to remote backend requests.
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/app.toml` and (optionally)
/// `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults. Prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- app.toml (required) ---
    let app_path = config_dir.join("app.toml");
    let app_text = read_file(&app_path)?;
    let app: AppFile = toml::from_str(&app_text).map_err(|e| ConfigError::ParseError {
        path: app_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let default_formation = Formation::from_id(&app.board.default_formation).ok_or_else(|| {
        ConfigError::ValidationError {
            field: "board.default_formation".into(),
            message: format!(
                "unknown formation {:?}, expected one of {}",
                app.board.default_formation,
                Formation::ALL
                    .iter()
                    .map(|f| f.id())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    })?;

    let db_path = match app.database.path {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => default_db_path(),
    };

    let config = Config {
        backend: app.backend,
        default_formation,
        rating: app.rating,
        db_path,
        rosters_dir: base_dir.join(app.data.rosters_dir),
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Files seeded from `defaults/` on first run. Anything else in `defaults/`
/// (such as `credentials.toml.example`) is a template for the user to copy.
const SEEDED_FILES: [&str; 2] = ["app.toml", "credentials.toml"];

/// Seed `config/` from `defaults/` for every file in `SEEDED_FILES` that the
/// user does not have yet. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no defaults/ or config/ directory in {}; run from the project root",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let mut seeded = Vec::new();
    for name in SEEDED_FILES {
        if let Some(path) = seed_file(&defaults_dir.join(name), &config_dir.join(name))? {
            seeded.push(path);
        }
    }
    Ok(seeded)
}

/// Copy `source` to `target` unless the source is absent or the target
/// already exists. A user's edited file is never overwritten.
fn seed_file(source: &Path, target: &Path) -> Result<Option<PathBuf>, ConfigError> {
    if !source.is_file() {
        return Ok(None);
    }
    let content = std::fs::read(source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", source.display()),
    })?;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };
    std::io::Write::write_all(&mut dest, &content).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;
    info!("Seeded {} from {}", target.display(), source.display());
    Ok(Some(target.to_path_buf()))
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// `<platform data dir>/lineup.db`, or `lineup.db` in the working directory
/// when no home directory can be determined.
fn default_db_path() -> PathBuf {
    ProjectDirs::from("", "", "lineup")
        .map(|dirs| dirs.data_dir().join("lineup.db"))
        .unwrap_or_else(|| PathBuf::from("lineup.db"))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "backend.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if let Some(url) = &config.backend.base_url {
        if url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "backend.base_url".into(),
                message: "must not be empty; omit it to run offline".into(),
            });
        }
    }

    if config.backend.owner.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "backend.owner".into(),
            message: "must not be empty".into(),
        });
    }

    let multipliers: &[(&str, f64)] = &[
        ("rating.goalkeeper_multiplier", config.rating.goalkeeper_multiplier),
        (
            "rating.cross_position_multiplier",
            config.rating.cross_position_multiplier,
        ),
    ];
    for (name, val) in multipliers {
        if !(*val > 0.0 && *val <= 1.0) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be in (0, 1], got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root holding `defaults/`.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = manifest.join("../..");
        assert!(
            root.join("defaults").exists(),
            "Cannot locate defaults/ from {:?}",
            manifest
        );
        root
    }

    /// Fresh temp dir with `config/app.toml` copied from defaults and then
    /// passed through `edit`.
    fn temp_config(name: &str, edit: impl FnOnce(String) -> String) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();
        let text = fs::read_to_string(project_root().join("defaults/app.toml")).unwrap();
        fs::write(config_dir.join("app.toml"), edit(text)).unwrap();
        tmp
    }

    fn expect_field(err: ConfigError, expected: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = temp_config("lineup_config_valid", |t| t);
        let config = load_config_from(&tmp).expect("should load default config");

        assert!(config.backend.base_url.is_none());
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.backend.owner, "local");
        assert_eq!(config.default_formation, Formation::FourThreeThree);
        assert_eq!(config.rating, RatingPolicy::default());
        assert!(config.rosters_dir.ends_with("data/rosters"));
        assert!(config.db_path.ends_with("lineup.db"));
        assert!(config.credentials.token.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_with_token() {
        let tmp = temp_config("lineup_config_creds", |t| t);
        fs::write(tmp.join("config/credentials.toml"), "token = \"abc123\"\n").unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.credentials.token.as_deref(), Some("abc123"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_database_path_is_used() {
        let tmp = temp_config("lineup_config_db", |t| {
            t.replace("[database]", "[database]\npath = \"custom.db\"")
        });
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.db_path, PathBuf::from("custom.db"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_formation() {
        let tmp = temp_config("lineup_config_bad_formation", |t| {
            t.replace("default_formation = \"4-3-3\"", "default_formation = \"5-4-1\"")
        });
        expect_field(load_config_from(&tmp).unwrap_err(), "board.default_formation");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_timeout() {
        let tmp = temp_config("lineup_config_zero_timeout", |t| {
            t.replace("timeout_secs = 10", "timeout_secs = 0")
        });
        expect_field(load_config_from(&tmp).unwrap_err(), "backend.timeout_secs");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_multiplier_out_of_range() {
        let tmp = temp_config("lineup_config_bad_multiplier", |t| {
            t.replace("goalkeeper_multiplier = 0.5", "goalkeeper_multiplier = 1.5")
        });
        expect_field(
            load_config_from(&tmp).unwrap_err(),
            "rating.goalkeeper_multiplier",
        );
        let _ = fs::remove_dir_all(&tmp);

        let tmp = temp_config("lineup_config_zero_multiplier", |t| {
            t.replace(
                "cross_position_multiplier = 0.8",
                "cross_position_multiplier = 0.0",
            )
        });
        expect_field(
            load_config_from(&tmp).unwrap_err(),
            "rating.cross_position_multiplier",
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn goalkeeper_exempt_policy_is_accepted() {
        let tmp = temp_config("lineup_config_gk_exempt", |t| {
            t.replace("goalkeeper_multiplier = 0.5", "goalkeeper_multiplier = 1.0")
        });
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.rating.goalkeeper_multiplier, 1.0);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_base_url() {
        let tmp = temp_config("lineup_config_empty_url", |t| {
            t.replace("[backend]", "[backend]\nbase_url = \"  \"")
        });
        expect_field(load_config_from(&tmp).unwrap_err(), "backend.base_url");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let tmp = temp_config("lineup_config_malformed", |_| "[backend\n".to_string());
        assert!(matches!(
            load_config_from(&tmp).unwrap_err(),
            ConfigError::ParseError { .. }
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_app_toml_is_file_not_found() {
        let tmp = std::env::temp_dir().join("lineup_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(
            load_config_from(&tmp).unwrap_err(),
            ConfigError::FileNotFound { .. }
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_and_skips_examples() {
        let tmp = std::env::temp_dir().join("lineup_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/app.toml"), "x = 1\n").unwrap();
        fs::write(tmp.join("defaults/credentials.toml.example"), "token = \"\"\n").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config/app.toml")]);
        assert!(!tmp.join("config/credentials.toml.example").exists());

        // Existing files are left alone
        fs::write(tmp.join("config/app.toml"), "edited = true\n").unwrap();
        let copied = ensure_config_files(&tmp).unwrap();
        assert!(copied.is_empty());
        assert_eq!(
            fs::read_to_string(tmp.join("config/app.toml")).unwrap(),
            "edited = true\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_seeds_only_known_files() {
        let tmp = std::env::temp_dir().join("lineup_config_known_files");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/app.toml"), "x = 1\n").unwrap();
        fs::write(tmp.join("defaults/credentials.toml"), "token = \"t\"\n").unwrap();
        fs::write(tmp.join("defaults/notes.txt"), "scratch\n").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(
            copied,
            vec![tmp.join("config/app.toml"), tmp.join("config/credentials.toml")]
        );
        assert!(!tmp.join("config/notes.txt").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_without_any_dirs() {
        let tmp = std::env::temp_dir().join("lineup_config_no_dirs");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(
            ensure_config_files(&tmp).unwrap_err(),
            ConfigError::DefaultsCopyError { .. }
        ));
        let _ = fs::remove_dir_all(&tmp);
    }
}
