//! Configuration management for Tome.
//!
//! Parses `tome.toml` configuration files with serde. The loaded [`Config`]
//! is a plain value: the host process constructs it once and passes it into
//! every component constructor. Nothing in this workspace reads ambient
//! global state.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tome.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity and linking.
    pub site: SiteConfig,
    /// Documentation source configuration (paths are relative strings from TOML).
    #[serde(default)]
    docs: DocsConfigRaw,
    /// Cache configuration (paths are relative strings from TOML).
    #[serde(default)]
    cache: CacheConfigRaw,
    /// Versioning configuration.
    pub versions: VersionsConfig,
    /// Feature toggles.
    pub features: FeaturesConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity and linking.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site display name.
    pub name: String,
    /// Site description.
    pub description: String,
    /// Logical path served when a request path is empty.
    pub default_page: String,
    /// Absolute URL prefix for permalinks (scheme, host, base path).
    pub base_url: String,
    /// Repository URL for edit links (empty disables them).
    pub repo_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Documentation".to_owned(),
            description: "Project Documentation".to_owned(),
            default_page: "getting-started/introduction".to_owned(),
            base_url: "http://localhost".to_owned(),
            repo_url: String::new(),
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct DocsConfig {
    /// Root directory holding markdown sources (or version partitions).
    pub source_dir: PathBuf,
}

/// Raw cache configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug, Default, Clone)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Directory holding cache entry files.
    pub dir: PathBuf,
}

/// Versioning configuration.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct VersionsConfig {
    /// Whether the document root is partitioned into version directories.
    pub enabled: bool,
    /// Explicit default version slug (highest discovered version if unset).
    pub default: Option<String>,
}

/// Feature toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Emit repository edit links on pages.
    pub edit_link: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { edit_link: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `tome.toml` in the current directory and parents,
    /// falling back to defaults rooted at the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist, or if
    /// parsing or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)
        } else {
            Ok(Self::default_with_cwd())
        }
    }

    /// Search for a config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to the working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to a base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            docs: DocsConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            versions: VersionsConfig::default(),
            features: FeaturesConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
            },
            cache_resolved: CacheConfig {
                enabled: true,
                dir: base.join(".tome/cache"),
            },
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.validate()?;

        Ok(config)
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
        };
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            dir: config_dir.join(self.cache.dir.as_deref().unwrap_or(".tome/cache")),
        };
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any value is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.default_page.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.default_page cannot be empty".to_owned(),
            ));
        }
        if !self.site.base_url.starts_with("http://") && !self.site.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".to_owned(),
            ));
        }
        if let Some(default) = &self.versions.default
            && default.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "versions.default cannot be empty when set".to_owned(),
            ));
        }
        Ok(())
    }
}
