//! Bootstrap configuration and root folder resolution
//!
//! Two kinds of configuration exist:
//! 1. **TOML bootstrap**: listen address, root folder, logging, fallback
//!    remote credentials, admin gate, upload limits. Read once at startup.
//! 2. **Local cache**: site content and admin-entered credentials, stored in
//!    the `settings` table of `<root>/ggbs.db` and read on every operation.
//!
//! Missing TOML files never prevent startup; compiled defaults are used.

use crate::{ConnectionCredentials, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "GGBS_ROOT_FOLDER";
/// Environment variables supplying bootstrap remote credentials
pub const REMOTE_URL_ENV: &str = "GGBS_SUPABASE_URL";
pub const REMOTE_KEY_ENV: &str = "GGBS_SUPABASE_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "ggbs.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder for the local cache database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Remote store bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project endpoint, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: Option<String>,

    /// Public (anon) access token
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Upper bound for any single remote call
    #[serde(default = "default_remote_timeout_ms")]
    pub timeout_ms: u64,
}

/// Admin gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,

    /// Plaintext password. When unset the compiled default pair applies.
    #[serde(default)]
    pub password: Option<String>,
}

/// Upload and preview limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Number of ephemeral previews held in memory
    #[serde(default = "default_preview_capacity")]
    pub preview_capacity: usize,

    /// Total bytes held by ephemeral previews
    #[serde(default = "default_preview_max_bytes")]
    pub preview_max_bytes: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_remote_timeout_ms() -> u64 {
    5000
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_preview_capacity() -> usize {
    64
}

fn default_preview_max_bytes() -> usize {
    256 * 1024 * 1024
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            remote: RemoteConfig::default(),
            admin: AdminConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_ms: default_remote_timeout_ms(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            preview_capacity: default_preview_capacity(),
            preview_max_bytes: default_preview_max_bytes(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the TOML file if present, otherwise fall back to defaults
    ///
    /// `explicit` is the `--config` argument. Without it the platform
    /// config directory is searched. The outcome is logged here; callers
    /// that load before tracing is installed use [`TomlConfig::load_with_origin`].
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let (config, origin) = Self::load_with_origin(explicit);
        origin.log();
        config
    }

    /// Same search as [`TomlConfig::load_or_default`], without logging
    pub fn load_with_origin(explicit: Option<&Path>) -> (Self, ConfigOrigin) {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            return (Self::default(), ConfigOrigin::Defaults);
        };

        match Self::load(&path) {
            Ok(config) => (config, ConfigOrigin::File(path)),
            Err(error) => (
                Self::default(),
                ConfigOrigin::Fallback {
                    path,
                    error: error.to_string(),
                },
            ),
        }
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// No file found; compiled defaults
    Defaults,
    /// A file was found but could not be used; compiled defaults
    Fallback { path: PathBuf, error: String },
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config: {}", path.display()),
            ConfigOrigin::Defaults => info!("No config file found, using compiled defaults"),
            ConfigOrigin::Fallback { path, error } => warn!(
                "Ignoring config file {}: {}; using compiled defaults",
                path.display(),
                error
            ),
        }
    }
}

/// `<config_dir>/ggbs/ggbs-cms.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ggbs").join("ggbs-cms.toml"))
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("ggbs"))
            .unwrap_or_else(|| PathBuf::from("./ggbs_data"));
        Self { root_folder }
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `GGBS_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent compiled default
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_value: Option<PathBuf>) -> Self {
        Self { cli_arg, toml_value }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

/// Resolve the bootstrap remote credentials
///
/// **Priority:** ENV pair → TOML pair. Halves are never mixed across
/// sources and a source only counts when its pair is usable. The local cache
/// pair, when usable, overrides whatever this returns.
pub fn resolve_bootstrap_credentials(config: &RemoteConfig) -> Option<ConnectionCredentials> {
    let env_pair = match (std::env::var(REMOTE_URL_ENV), std::env::var(REMOTE_KEY_ENV)) {
        (Ok(url), Ok(key)) => Some(ConnectionCredentials::new(url, key)),
        _ => None,
    }
    .filter(ConnectionCredentials::is_usable);

    let toml_pair = match (&config.url, &config.anon_key) {
        (Some(url), Some(key)) => Some(ConnectionCredentials::new(url, key)),
        _ => None,
    }
    .filter(ConnectionCredentials::is_usable);

    if env_pair.is_some() && toml_pair.is_some() {
        warn!("Remote credentials found in environment and TOML. Using environment.");
    }

    if let Some(pair) = env_pair {
        info!("Bootstrap remote credentials loaded from environment");
        return Some(pair);
    }
    if let Some(pair) = toml_pair {
        info!("Bootstrap remote credentials loaded from TOML config");
        return Some(pair);
    }
    None
}
