use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::workflows::WorkflowSettings;

/// Main configuration structure for the concession service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConcessionConfig {
    /// Where applications and drafts live
    pub storage: StorageConfig,
    /// Review policy
    pub workflow: WorkflowConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON files under `data_dir`
    File,
    /// SQLite database at `database_url` (needs the `database` feature)
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the JSON store and the login session
    pub data_dir: PathBuf,
    /// SQLite connection string
    pub database_url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Stored when a reviewer rejects without a reason
    pub default_rejection_reason: String,
    /// Only let college admins act on their own college's applications
    pub enforce_college_scope: bool,
    /// Refuse station codes that are not in the catalog
    pub require_known_stations: bool,
    /// Prefix of issued pass tokens
    pub pass_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON log lines instead of the compact format
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl Default for ConcessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackend::File,
                data_dir: PathBuf::from(".concession"),
                database_url: "sqlite://.concession/concession.db".to_string(),
                max_connections: 5,
            },
            workflow: WorkflowConfig {
                default_rejection_reason: crate::workflows::DEFAULT_REJECTION_REASON.to_string(),
                enforce_college_scope: false,
                require_known_stations: false,
                pass_prefix: "RCP".to_string(),
            },
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ConcessionConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (concession.toml, .concession-rc)
    /// 3. Environment variables (CONCESSION__SECTION__KEY)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`load`](Self::load) with config files looked up in `dir`
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let toml_path = dir.join("concession.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".concession-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONCESSION")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            default_rejection_reason: self.workflow.default_rejection_reason.clone(),
            enforce_college_scope: self.workflow.enforce_college_scope,
            require_known_stations: self.workflow.require_known_stations,
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.storage.data_dir.join("session.json")
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<ConcessionConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = ConcessionConfig::load_env_file();
        ConcessionConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static ConcessionConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
