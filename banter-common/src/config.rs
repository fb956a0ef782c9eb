//! Configuration loading and resolution
//!
//! Settings are resolved once at startup into a [`ServerConfig`] value that is
//! handed to whichever component needs it. Priority order per field:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together in [`ConfigOverrides`]
//! (clap merges them before this module sees them).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default listen host (local-only backend)
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port, the one the editor expects
pub const DEFAULT_PORT: u16 = 8000;

/// Default ByteDance TTS cluster
pub const DEFAULT_TTS_CLUSTER: &str = "volcano_tts";

/// Default ByteDance OpenSpeech HTTP endpoint
pub const DEFAULT_TTS_ENDPOINT: &str = "https://openspeech.bytedance.com/api/v1/tts";

/// Default tracing level when neither RUST_LOG nor config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

const PROJECTS_DIR_NAME: &str = "Piraeus Banter Projects";
const CONFIG_DIR_NAME: &str = "piraeus-banter";
const CONFIG_FILE_NAME: &str = "config.toml";

/// On-disk TOML configuration
///
/// Every field is optional; a partially filled file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Default project root used when a request does not carry one
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,

    #[serde(default)]
    pub tts: TomlTtsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[tts]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlTtsConfig {
    #[serde(default)]
    pub app_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Command-line / environment configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub projects_dir: Option<PathBuf>,
    pub app_key: Option<String>,
    pub access_token: Option<String>,
    pub cluster: Option<String>,
    pub log_level: Option<String>,
    /// Explicit TOML file; when set, the file must exist
    pub config_file: Option<PathBuf>,
}

/// Server-side TTS credentials and endpoint
///
/// Requests may carry their own credentials; these are the fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsDefaults {
    pub app_key: String,
    pub access_token: String,
    pub cluster: String,
    pub endpoint: String,
}

/// Fully resolved backend configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub projects_dir: PathBuf,
    pub tts: TtsDefaults,
    pub log_level: String,
}

impl ServerConfig {
    /// Resolve configuration from overrides and the TOML file
    ///
    /// The TOML file is `overrides.config_file` when given, otherwise the
    /// platform config file if one exists. A missing default file is not an
    /// error; an unreadable or unparsable file is.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match &overrides.config_file {
            Some(path) => load_toml_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_toml_config(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    TomlConfig::default()
                }
            },
        };

        Ok(Self::merge(overrides, toml_config))
    }

    /// Merge overrides over TOML values over compiled defaults
    pub fn merge(overrides: ConfigOverrides, toml_config: TomlConfig) -> Self {
        let TomlConfig {
            host,
            port,
            projects_dir,
            tts,
            logging,
        } = toml_config;

        Self {
            host: non_empty(overrides.host)
                .or(non_empty(host))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(port).unwrap_or(DEFAULT_PORT),
            projects_dir: overrides
                .projects_dir
                .or(projects_dir)
                .unwrap_or_else(default_projects_dir),
            tts: TtsDefaults {
                app_key: non_empty(overrides.app_key)
                    .or(non_empty(tts.app_key))
                    .unwrap_or_default(),
                access_token: non_empty(overrides.access_token)
                    .or(non_empty(tts.access_token))
                    .unwrap_or_default(),
                cluster: non_empty(overrides.cluster)
                    .or(non_empty(tts.cluster))
                    .unwrap_or_else(|| DEFAULT_TTS_CLUSTER.to_string()),
                endpoint: non_empty(tts.endpoint)
                    .unwrap_or_else(|| DEFAULT_TTS_ENDPOINT.to_string()),
            },
            log_level: non_empty(overrides.log_level)
                .or(non_empty(logging.level))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// `host:port` string suitable for binding a listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Platform config file location (`<config_dir>/piraeus-banter/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Default project root (`~/Piraeus Banter Projects`)
pub fn default_projects_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(PROJECTS_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(PROJECTS_DIR_NAME))
}

/// Blank strings count as unset (an empty env var must not mask the TOML value)
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
