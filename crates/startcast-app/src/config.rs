// Configuration loading and parsing (startcast.toml, presets.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use startcast_engine::classifier::DEFAULT_DEVIATION_THRESHOLD;
use startcast_engine::{
    BattingPolicy, ClassifierPolicy, PresetCatalog, ProjectionModel, RateBasis, SortOrder,
};

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
    pub model: ModelConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub presets: PresetCatalog,
    /// Directory relative data paths are resolved against.
    pub base_dir: PathBuf,
}

impl Config {
    /// Path of the team split CSV.
    pub fn teams_path(&self) -> PathBuf {
        self.resolve(&self.data.teams)
    }

    /// Path of the custom league store. Falls back to the platform data
    /// directory, then to `custom_leagues.json` under the base directory.
    pub fn custom_leagues_path(&self) -> PathBuf {
        if let Some(path) = &self.data.custom_leagues {
            return self.resolve(path);
        }
        directories::ProjectDirs::from("", "", "startcast")
            .map(|dirs| dirs.data_dir().join(CUSTOM_LEAGUES_FILE))
            .unwrap_or_else(|| self.base_dir.join(CUSTOM_LEAGUES_FILE))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

const CUSTOM_LEAGUES_FILE: &str = "custom_leagues.json";

// ---------------------------------------------------------------------------
// startcast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire startcast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StartcastFile {
    #[serde(default)]
    model: ModelConfig,
    data: DataConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

/// Which cohort classifier to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Range,
    Deviation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub rate_basis: RateBasis,
    #[serde(default)]
    pub batting: BattingPolicy,
    #[serde(default)]
    pub classifier: ClassifierKind,
    #[serde(default = "default_deviation_threshold")]
    pub deviation_threshold: f64,
    #[serde(default)]
    pub sort: SortOrder,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            rate_basis: RateBasis::default(),
            batting: BattingPolicy::default(),
            classifier: ClassifierKind::default(),
            deviation_threshold: DEFAULT_DEVIATION_THRESHOLD,
            sort: SortOrder::default(),
        }
    }
}

impl ModelConfig {
    pub fn to_model(&self) -> ProjectionModel {
        let classifier = match self.classifier {
            ClassifierKind::Range => ClassifierPolicy::RangeNormalized,
            ClassifierKind::Deviation => ClassifierPolicy::Deviation {
                threshold: self.deviation_threshold,
            },
        };
        ProjectionModel {
            rate_basis: self.rate_basis,
            batting: self.batting,
            classifier,
            sort: self.sort,
        }
    }
}

fn default_deviation_threshold() -> f64 {
    DEFAULT_DEVIATION_THRESHOLD
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub teams: String,
    #[serde(default)]
    pub custom_leagues: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/startcast.toml` and
/// `config/presets.toml`, both relative to the given `base_dir`.
///
/// Does not seed defaults; `load_config_in` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- startcast.toml (required) ---
    let main_path = config_dir.join("startcast.toml");
    let main_text = read_file(&main_path)?;
    let file: StartcastFile = toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
        path: main_path.clone(),
        source: e,
    })?;

    // --- presets.toml (required) ---
    let presets_path = config_dir.join("presets.toml");
    let presets_text = read_file(&presets_path)?;
    let presets =
        PresetCatalog::from_toml_str(&presets_text).map_err(|e| ConfigError::ParseError {
            path: presets_path.clone(),
            source: e,
        })?;

    let config = Config {
        model: file.model,
        data: file.data,
        logging: file.logging,
        presets,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Files a base directory needs under `config/`, each seeded from
/// `defaults/` on first run.
pub const CONFIG_FILES: [&str; 2] = ["startcast.toml", "presets.toml"];

/// Seed `config/` from `defaults/` for every entry of `CONFIG_FILES` the
/// user does not have yet. Existing files are never touched. Returns the
/// paths written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{name} is in neither {} nor {}",
                    config_dir.display(),
                    defaults_dir.display()
                ),
            });
        }

        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", config_dir.display()),
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Seed missing config files, then load from `base_dir/config`.
pub fn load_config_in(base_dir: &Path) -> Result<(Config, Vec<PathBuf>), ConfigError> {
    let copied = ensure_config_files(base_dir)?;
    let config = load_config_from(base_dir)?;
    Ok((config, copied))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let threshold = config.model.deviation_threshold;
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "model.deviation_threshold".into(),
            message: format!("must be a finite number > 0, got {threshold}"),
        });
    }

    if config.data.teams.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.teams".into(),
            message: "must not be empty".into(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".into(),
            message: format!(
                "must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.logging.level
            ),
        });
    }

    if config.presets.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "presets".into(),
            message: "at least one league preset is required".into(),
        });
    }

    for (name, weights) in config.presets.iter() {
        if weights.pitching_weights().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("presets.{name}.pitching"),
                message: "must define at least one pitching weight".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
