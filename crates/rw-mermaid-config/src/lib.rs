//! Configuration management for rw-mermaid.
//!
//! Parses `mermaid.toml` with serde and provides auto-discovery of the file
//! in the current directory and its parents.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [mermaid]
//! strategy = "inline-svg"   # pre-mermaid | img-png | img-svg | inline-svg
//! prefix = "mermaid"        # id prefix for rendered SVG roots, "" keeps engine ids
//! on_error = "fail"         # fail | remove | keep
//!
//! [kroki]
//! url = "${KROKI_URL:-https://kroki.io}"
//! timeout_secs = 30
//!
//! [kroki.options]
//! theme = "neutral"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `kroki.url`,
//! `mermaid.strategy` and `kroki.options` values.

mod expand;
mod on_error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rw_mermaid::{
    DEFAULT_PREFIX, DEFAULT_TIMEOUT, KrokiRenderer, MermaidTransformer, RenderOptions, Strategy,
};
use serde::Deserialize;

pub use on_error::OnError;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mermaid.toml";

/// Default Kroki server.
const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output strategy.
    pub strategy: Option<String>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override error handling.
    pub on_error: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    mermaid: MermaidConfigRaw,
    /// Kroki renderer configuration.
    pub kroki: KrokiConfig,

    /// Resolved `[mermaid]` section (set after loading).
    #[serde(skip)]
    pub mermaid_resolved: MermaidConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw `[mermaid]` section as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MermaidConfigRaw {
    strategy: Option<String>,
    prefix: Option<String>,
    on_error: Option<String>,
}

/// Resolved transformation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MermaidConfig {
    pub strategy: Strategy,
    /// Id prefix for rendered SVG roots; `None` keeps the engine's ids.
    pub prefix: Option<String>,
    pub on_error: OnError,
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            prefix: Some(DEFAULT_PREFIX.to_owned()),
            on_error: OnError::default(),
        }
    }
}

/// Kroki renderer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KrokiConfig {
    /// Kroki server URL.
    pub url: String,
    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,
    /// Diagram options forwarded to Kroki.
    pub options: BTreeMap<String, String>,
}

impl Default for KrokiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_KROKI_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            options: BTreeMap::new(),
        }
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
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`kroki.url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn parse_strategy(value: &str, field: &str) -> Result<Strategy, ConfigError> {
    value
        .parse()
        .map_err(|e: rw_mermaid::Error| ConfigError::Validation(format!("{field}: {e}")))
}

fn parse_on_error(value: &str, field: &str) -> Result<OnError, ConfigError> {
    OnError::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!(
            "{field}: unknown value '{value}' (valid: fail, remove, keep)"
        ))
    })
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mermaid.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings take precedence over config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(strategy) = &settings.strategy {
            self.mermaid_resolved.strategy = parse_strategy(strategy, "--strategy")?;
        }
        if let Some(on_error) = &settings.on_error {
            self.mermaid_resolved.on_error = parse_on_error(on_error, "--on-error")?;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.kroki.url.clone_from(kroki_url);
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(&std::env::current_dir().ok()?)
    }

    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.resolve()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.kroki.url = expand::expand_env(&self.kroki.url, "kroki.url")?;

        if let Some(ref strategy) = self.mermaid.strategy {
            self.mermaid.strategy = Some(expand::expand_env(strategy, "mermaid.strategy")?);
        }

        for (name, value) in &mut self.kroki.options {
            *value = expand::expand_env(value, &format!("kroki.options.{name}"))?;
        }

        Ok(())
    }

    /// Resolve the raw `[mermaid]` section into typed settings.
    fn resolve(&mut self) -> Result<(), ConfigError> {
        let defaults = MermaidConfig::default();
        let raw = &self.mermaid;

        self.mermaid_resolved = MermaidConfig {
            strategy: match &raw.strategy {
                Some(strategy) => parse_strategy(strategy, "mermaid.strategy")?,
                None => defaults.strategy,
            },
            prefix: match &raw.prefix {
                Some(prefix) if prefix.is_empty() => None,
                Some(prefix) => Some(prefix.clone()),
                None => defaults.prefix,
            },
            on_error: match &raw.on_error {
                Some(on_error) => parse_on_error(on_error, "mermaid.on_error")?,
                None => defaults.on_error,
            },
        };
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.kroki.url, "kroki.url")?;
        require_http_url(&self.kroki.url, "kroki.url")?;

        if self.kroki.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "kroki.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        if let Some(prefix) = &self.mermaid_resolved.prefix
            && !prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "mermaid.prefix '{prefix}' may only contain ASCII letters, digits, '-' and '_'"
            )));
        }

        Ok(())
    }

    /// HTTP timeout for Kroki requests.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.kroki.timeout_secs)
    }

    /// Options forwarded to the renderer.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            screenshot: false,
            prefix: self.mermaid_resolved.prefix.clone(),
            engine: self.kroki.options.clone(),
        }
    }

    /// Kroki renderer for the configured server.
    #[must_use]
    pub fn renderer(&self) -> KrokiRenderer {
        KrokiRenderer::new(&self.kroki.url).timeout(self.timeout())
    }

    /// Transformer wired with the configured renderer, strategy, options and
    /// error handling.
    #[must_use]
    pub fn transformer(&self) -> MermaidTransformer {
        let transformer = MermaidTransformer::new(Arc::new(self.renderer()))
            .with_strategy(self.mermaid_resolved.strategy)
            .with_render_options(self.render_options());
        self.mermaid_resolved.on_error.apply(transformer)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.mermaid_resolved.strategy, Strategy::InlineSvg);
        assert_eq!(config.mermaid_resolved.prefix.as_deref(), Some("mermaid"));
        assert_eq!(config.mermaid_resolved.on_error, OnError::Fail);
        assert_eq!(config.kroki.url, "https://kroki.io");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve().unwrap();

        assert_eq!(config.mermaid_resolved, MermaidConfig::default());
        assert!(config.kroki.options.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[mermaid]
strategy = "img-png"
prefix = "diagram"
on_error = "remove"

[kroki]
url = "http://localhost:8000"
timeout_secs = 5

[kroki.options]
theme = "forest"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.mermaid_resolved,
            MermaidConfig {
                strategy: Strategy::ImgPng,
                prefix: Some("diagram".to_owned()),
                on_error: OnError::Remove,
            }
        );
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));

        let options = config.render_options();
        assert_eq!(options.prefix.as_deref(), Some("diagram"));
        assert_eq!(options.engine.get("theme").map(String::as_str), Some("forest"));
    }

    #[test]
    fn test_empty_prefix_keeps_engine_ids() {
        let mut config: Config = toml::from_str("[mermaid]\nprefix = \"\"\n").unwrap();
        config.resolve().unwrap();

        assert_eq!(config.mermaid_resolved.prefix, None);
        assert_eq!(config.render_options().prefix, None);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let mut config: Config = toml::from_str("[mermaid]\nstrategy = \"img-jpeg\"\n").unwrap();

        let err = config.resolve().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("mermaid.strategy"));
        assert!(err.to_string().contains("img-jpeg"));
    }

    #[test]
    fn test_unknown_on_error_rejected() {
        let mut config: Config = toml::from_str("[mermaid]\non_error = \"ignore\"\n").unwrap();

        assert!(matches!(config.resolve(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_errors() {
        let non_http: Config = toml::from_str("[kroki]\nurl = \"kroki.io\"\n").unwrap();
        let empty: Config = toml::from_str("[kroki]\nurl = \"\"\n").unwrap();
        let zero: Config = toml::from_str("[kroki]\ntimeout_secs = 0\n").unwrap();
        let mut prefix: Config = toml::from_str("[mermaid]\nprefix = \"a b\"\n").unwrap();
        prefix.resolve().unwrap();

        for config in [non_http, empty, zero, prefix] {
            assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        }
    }

    #[test]
    fn test_env_expansion_in_url() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("RW_MERMAID_TEST_CONFIG_URL");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[kroki]\nurl = \"${RW_MERMAID_TEST_CONFIG_URL:-http://kroki:8000}\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.kroki.url, "http://kroki:8000");
        assert_eq!(config.renderer().url(), "http://kroki:8000");
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[mermaid\n");

        assert!(matches!(Config::load(Some(&path), None), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let nested = dir.path().join("docs/guide");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_config_from(&nested), Some(path));
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "[mermaid]\nstrategy = \"img-svg\"\n");
        let settings = CliSettings {
            strategy: Some("pre-mermaid".to_owned()),
            kroki_url: Some("http://127.0.0.1:8000".to_owned()),
            on_error: Some("keep".to_owned()),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.mermaid_resolved.strategy, Strategy::PreMermaid);
        assert_eq!(config.mermaid_resolved.on_error, OnError::Keep);
        assert_eq!(config.kroki.url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_cli_settings_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "");
        let bad_strategy = CliSettings {
            strategy: Some("svg".to_owned()),
            ..CliSettings::default()
        };
        let bad_url = CliSettings {
            kroki_url: Some("localhost:8000".to_owned()),
            ..CliSettings::default()
        };

        assert!(Config::load(Some(&path), Some(&bad_strategy)).is_err());
        assert!(Config::load(Some(&path), Some(&bad_url)).is_err());
    }

    #[test]
    fn test_transformer_uses_resolved_strategy() {
        let mut config: Config = toml::from_str("[mermaid]\nstrategy = \"img-svg\"\n").unwrap();
        config.resolve().unwrap();

        assert_eq!(config.transformer().strategy(), Strategy::ImgSvg);
    }
}
