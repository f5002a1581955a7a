//! Configuration management for BlocIQ using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarConfig;
use crate::extraction::ExtractionConfig;
use crate::llm::LlmConfig;
use crate::repository::util::display_database_url;
use crate::repository::DbContext;

/// Default database filename.
const DEFAULT_DATABASE_FILENAME: &str = "blociq.db";

/// Default documents subdirectory name.
const DOCUMENTS_SUBDIR: &str = "documents";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    /// Set via DATABASE_URL env var.
    pub database_url: Option<String>,
    /// Directory for storing uploaded documents.
    pub documents_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blociq");

        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            documents_dir: data_dir.join(DOCUMENTS_SUBDIR),
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        self.database_url.is_some() || self.database_path().exists()
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for (label, dir) in [("data", &self.data_dir), ("documents", &self.documents_dir)] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create {} directory '{}': {}",
                        label,
                        dir.display(),
                        e
                    ),
                )
            })?;
        }
        Ok(())
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> DbContext {
        let url = self.database_url();
        tracing::debug!("Opening database {}", display_database_url(&url));
        DbContext::from_url(&url)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Text extraction strategies and limits.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Language model used for summaries.
    #[serde(default, skip_serializing_if = "LlmConfig::is_default")]
    pub llm: LlmConfig,
    /// External calendar for renewal reminders.
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers blociq config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("blociq").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            // No config file found
            Err(_) => Self::default_with_env(),
        }
    }

    /// Default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        self.extraction = self.extraction.with_env_overrides();
        self.llm = self.llm.with_env_overrides();
        self.calendar = self.calendar.with_env_overrides();
        self
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        let mut config = config.with_env_overrides();
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.documents_dir = settings.data_dir.join(DOCUMENTS_SUBDIR);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory (--data flag).
    pub data: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref config_path) => Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Config::default_with_env()
            }),
        None => Config::load().await,
    };

    let mut settings = Settings::default();

    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd()
    } else {
        config.base_dir().unwrap_or_else(cwd)
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // --data takes precedence over the config file
    if let Some(data) = options.data {
        settings.data_dir = config.resolve_path(&data.to_string_lossy(), &cwd());
        settings.documents_dir = settings.data_dir.join(DOCUMENTS_SUBDIR);
    }

    // DATABASE_URL environment variable takes highest precedence
    if let Some(database_url) = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()) {
        tracing::debug!(
            "Using DATABASE_URL from environment: {}",
            display_database_url(&database_url)
        );
        settings.database_url = Some(database_url);
    }

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blociq.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "data"
database = "portfolio.db"

[extraction]
strategies = ["native", "local_ocr"]
min_text_chars = 80

[calendar]
event_hour = 9
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.extraction.strategies, vec!["native", "local_ocr"]);
        assert_eq!(config.extraction.min_text_chars, 80);
        assert_eq!(config.calendar.event_hour, 9);
        assert_eq!(config.calendar.reminder_days_before, 30);
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, dir.path());
        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.documents_dir, dir.path().join("data").join("documents"));
        assert_eq!(settings.database_filename, "portfolio.db");
    }

    #[tokio::test]
    async fn test_load_yaml_and_json_config() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("blociq.yaml");
        std::fs::write(&yaml, "llm:\n  max_content_chars: 2000\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.llm.max_content_chars, 2000);

        let json = dir.path().join("blociq.json");
        std::fs::write(&json, r#"{"extraction": {"max_upload_bytes": 1024}}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.extraction.max_upload_bytes, 1024);
    }

    #[tokio::test]
    async fn test_invalid_config_reports_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blociq.toml");
        std::fs::write(&path, "data_dir = [").unwrap();
        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(err.contains("TOML"));
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/srv/blociq");
        assert_eq!(config.resolve_path("/abs/db", base), PathBuf::from("/abs/db"));
        assert_eq!(config.resolve_path("rel", base), PathBuf::from("/srv/blociq/rel"));
    }

    #[test]
    fn test_database_url() {
        let settings = Settings::with_data_dir(PathBuf::from("/srv/blociq"));
        assert_eq!(settings.database_url(), "sqlite:/srv/blociq/blociq.db");
    }
}
