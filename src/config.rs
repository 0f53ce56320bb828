//! Runtime configuration.
//!
//! Resolution order, later wins:
//! 1. built-in defaults
//! 2. TOML file named by `RUSTDOC_REGISTRY_CONFIG`
//! 3. `RUSTDOC_REGISTRY_SITE` / `RUSTDOC_REGISTRY_CONCURRENCY` / `RUSTDOC_REGISTRY_LOG_FORMAT`
//! 4. the first command-line argument (doc root)

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "RUSTDOC_REGISTRY_CONFIG";
pub const SITE_ENV: &str = "RUSTDOC_REGISTRY_SITE";
pub const CONCURRENCY_ENV: &str = "RUSTDOC_REGISTRY_CONCURRENCY";
pub const LOG_FORMAT_ENV: &str = "RUSTDOC_REGISTRY_LOG_FORMAT";

/// Number of site files read at once.
const DEFAULT_CONCURRENCY: usize = 16;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown log format '{}' (expected 'compact' or 'json')", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// rustdoc output directory to load at startup (e.g. `target/doc`).
    pub site_root: Option<PathBuf>,
    /// Maximum files read concurrently while loading.
    pub concurrency: usize,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: None,
            concurrency: DEFAULT_CONCURRENCY,
            log_format: LogFormat::default(),
        }
    }
}

/// Values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub site_root: Option<String>,
    pub concurrency: Option<String>,
    pub log_format: Option<String>,
}

impl Overrides {
    /// Collect overrides from the environment and the first CLI argument.
    pub fn from_env(cli_site_root: Option<String>) -> Self {
        Self {
            site_root: cli_site_root.or_else(|| std::env::var(SITE_ENV).ok()),
            concurrency: std::env::var(CONCURRENCY_ENV).ok(),
            log_format: std::env::var(LOG_FORMAT_ENV).ok(),
        }
    }
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn load(cli_site_root: Option<String>) -> Result<Self> {
        let base = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(Overrides::from_env(cli_site_root))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        if let Some(root) = config.site_root.take() {
            config.site_root = Some(PathBuf::from(&*expand_tilde(&root.to_string_lossy())));
        }
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(root) = overrides.site_root.filter(|root| !root.trim().is_empty()) {
            self.site_root = Some(PathBuf::from(&*expand_tilde(root.trim())));
        }
        if let Some(concurrency) = overrides.concurrency {
            self.concurrency = concurrency
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value '{}'", CONCURRENCY_ENV, concurrency))?;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format.parse()?;
        }
        self.concurrency = self.concurrency.max(1);
        Ok(self)
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
///
/// Returns `Cow::Borrowed` if no expansion needed, `Cow::Owned` if expanded.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
