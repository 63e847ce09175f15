use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides. Nested keys are joined with `__`,
/// e.g. `ROLODEX_DATABASE__PATH`.
pub const ENV_PREFIX: &str = "ROLODEX_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub list: ListSettings,
    #[serde(default)]
    pub labels: LabelSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub filename: Option<PathBuf>,
    #[serde(default = "default_level")]
    pub file_level: String,
    #[serde(default)]
    pub file_mode: FileMode,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            filename: None,
            file_level: default_level(),
            file_mode: FileMode::default(),
        }
    }
}

/// How the log file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    #[default]
    #[serde(alias = "a")]
    Append,
    #[serde(alias = "w")]
    Truncate,
}

impl FileMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" | "append" => Some(Self::Append),
            "w" | "truncate" => Some(Self::Truncate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSettings {
    #[serde(default)]
    pub collation: Collation,
}

/// Name ordering for the address list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collation {
    /// Byte-wise, case-sensitive (SQLite `BINARY`).
    #[default]
    Binary,
    /// ASCII case-insensitive (SQLite `NOCASE`).
    Nocase,
}

impl Collation {
    /// SQL collation name for `ORDER BY ... COLLATE <name>`.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::Nocase => "NOCASE",
        }
    }

    /// Compare two names the same way SQLite does for this collation.
    #[must_use]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Binary => a.as_bytes().cmp(b.as_bytes()),
            Self::Nocase => a
                .bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "binary" | "case-sensitive" => Some(Self::Binary),
            "nocase" | "case-insensitive" => Some(Self::Nocase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelSettings {
    /// Label name prefilled in the TUI label prompt.
    #[serde(default)]
    pub default: Option<String>,
}

impl Settings {
    /// The configured database path, or the per-user default.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    /// Effective console log level.
    #[must_use]
    pub fn log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.logging.level
        }
    }

    /// Apply `ROLODEX_*` overrides from the given lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has a value that cannot be parsed.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(&env_key(key)).filter(|value| !value.is_empty());

        if let Some(raw) = var("debug") {
            self.debug = parse_bool(&raw)
                .with_context(|| format!("invalid {} value '{raw}'", env_key("debug")))?;
        }
        if let Some(path) = var("database__path") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(level) = var("logging__level") {
            self.logging.level = level;
        }
        if let Some(filename) = var("logging__filename") {
            self.logging.filename = Some(PathBuf::from(filename));
        }
        if let Some(level) = var("logging__file_level") {
            self.logging.file_level = level;
        }
        if let Some(raw) = var("logging__file_mode") {
            let Some(mode) = FileMode::parse(&raw) else {
                bail!(
                    "invalid {} value '{raw}': expected append or truncate",
                    env_key("logging__file_mode")
                );
            };
            self.logging.file_mode = mode;
        }
        if let Some(raw) = var("list__collation") {
            let Some(collation) = Collation::parse(&raw) else {
                bail!(
                    "invalid {} value '{raw}': expected binary or nocase",
                    env_key("list__collation")
                );
            };
            self.list.collation = collation;
        }
        if let Some(label) = var("labels__default") {
            self.labels.default = Some(label);
        }
        Ok(())
    }
}

fn env_key(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_ascii_uppercase())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Default per-user config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rolodex/config.toml"))
}

/// Default database location when none is configured.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rolodex/rolodex.db")
}

/// Load settings from a TOML file. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<Settings>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve settings: defaults, then the config file, then environment.
///
/// An explicit `config_path` must exist; the implicit per-user path may be
/// absent.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed, or an
/// environment override is malformed.
pub fn resolve_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            load_settings_file(path)?
        }
        None => match default_config_path() {
            Some(path) => load_settings_file(&path)?,
            None => Settings::default(),
        },
    };

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

fn default_level() -> String {
    "info".to_string()
}
