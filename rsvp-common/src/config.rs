//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority, handled by each binary's clap parser)
//! 2. Environment variable (also via clap `env`)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: the services log it and start with
//! compiled defaults. A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RSVP_CONFIG";

/// Default reading rate in words per minute
pub const DEFAULT_RATE_WPM: u32 = 300;

/// Slider lower bound in words per minute
pub const DEFAULT_MIN_RATE_WPM: u32 = 50;

/// Slider upper bound in words per minute
pub const DEFAULT_MAX_RATE_WPM: u32 = 1000;

/// Step applied by one keyboard rate gesture
pub const DEFAULT_RATE_STEP_WPM: u32 = 50;

/// Content shown by the display after a reset
pub const DEFAULT_PLACEHOLDER: &str = "Text will appear here";

/// Element wrapping the emphasized character
pub const DEFAULT_HIGHLIGHT_TAG: &str = "span";

/// Complete TOML configuration file
///
/// Every section is optional; absent sections fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[reader]` section: reader control service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// HTTP port for the reader control API
    pub port: u16,

    /// Base URL of the library service
    pub library_url: String,

    /// Rate used until the first rate change
    pub default_rate: u32,

    /// Lowest selectable rate
    pub min_rate: u32,

    /// Highest selectable rate
    pub max_rate: u32,

    /// Rate delta applied by one keyboard gesture
    pub rate_step: u32,

    /// Display content after reset
    pub placeholder: String,

    /// Element name wrapping the emphasized character
    pub highlight_tag: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            library_url: "http://127.0.0.1:3000".to_string(),
            default_rate: DEFAULT_RATE_WPM,
            min_rate: DEFAULT_MIN_RATE_WPM,
            max_rate: DEFAULT_MAX_RATE_WPM,
            rate_step: DEFAULT_RATE_STEP_WPM,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            highlight_tag: DEFAULT_HIGHLIGHT_TAG.to_string(),
        }
    }
}

impl ReaderConfig {
    /// Check rate bounds for consistency
    pub fn validate(&self) -> Result<()> {
        if self.min_rate == 0 {
            return Err(Error::Config("reader.min_rate must be at least 1".to_string()));
        }
        if self.min_rate > self.max_rate {
            return Err(Error::Config(format!(
                "reader.min_rate ({}) exceeds reader.max_rate ({})",
                self.min_rate, self.max_rate
            )));
        }
        if !(self.min_rate..=self.max_rate).contains(&self.default_rate) {
            return Err(Error::Config(format!(
                "reader.default_rate ({}) outside [{}, {}]",
                self.default_rate, self.min_rate, self.max_rate
            )));
        }
        if self.rate_step == 0 {
            return Err(Error::Config("reader.rate_step must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// `[library]` section: library service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// HTTP port for the library service
    pub port: u16,

    /// JSON file holding the preloaded texts
    pub texts_path: PathBuf,

    /// Directory of static assets served at `/`
    pub static_dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            texts_path: PathBuf::from("texts.json"),
            static_dir: PathBuf::from("static"),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file, failing on I/O or syntax errors
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config file contents
    pub fn parse(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.reader.validate()?;
        Ok(config)
    }

    /// Load the first config file found, or compiled defaults when there is none
    ///
    /// `explicit` (from `--config`) takes precedence over every search location
    /// and must exist when given.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match locate_config_file() {
            Some(path) => {
                info!("Loading config file {}", path.display());
                Self::load(&path)
            }
            None => {
                info!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Find a config file following the search order
///
/// 1. `RSVP_CONFIG` environment variable
/// 2. `<user config dir>/rsvp/config.toml`
/// 3. `/etc/rsvp/config.toml` (Linux only)
pub fn locate_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        debug!("{} points at missing file {}", CONFIG_ENV_VAR, path.display());
    }

    let user_config = dirs::config_dir().map(|d| d.join("rsvp").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/rsvp/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
