//! TOML configuration.
//!
//! ```toml
//! [data]
//! path = "ops_data/opetussuunnitelma_1-6_API_data.json"
//! default_source = "POPS_2014"
//!
//! [retrieval]
//! default_limit = 8
//! min_score = 0.0
//!
//! [context]
//! max_chars = 8000
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! ```
//!
//! Only `[data].path` is required. A relative data path is resolved against
//! the directory containing the config file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use ops_index_core::format::DEFAULT_MAX_PROMPT_CHARS;
use ops_index_core::models::DEFAULT_SOURCE;
use ops_index_core::search::DEFAULT_LIMIT;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub path: PathBuf,
    #[serde(default = "default_source")]
    pub default_source: String,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default)]
    pub min_score: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            min_score: 0.0,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_PROMPT_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

impl Config {
    /// A config pointing at `data_path` with every other setting defaulted.
    pub fn for_data_path(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data: DataConfig {
                path: data_path.into(),
                default_source: default_source(),
            },
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.data.path.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.data.path = base.join(&config.data.path);
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.data.default_source.trim().is_empty() {
        anyhow::bail!("data.default_source must not be empty");
    }

    if config.retrieval.default_limit < 1 {
        anyhow::bail!("retrieval.default_limit must be >= 1");
    }

    if !config.retrieval.min_score.is_finite() {
        anyhow::bail!("retrieval.min_score must be a finite number");
    }

    if config.context.max_chars < 1 {
        anyhow::bail!("context.max_chars must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("ops.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_minimal_config_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[data]\npath = \"chunks.json\"\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.data.path, tmp.path().join("chunks.json"));
        assert_eq!(cfg.data.default_source, "POPS_2014");
        assert_eq!(cfg.retrieval.default_limit, 8);
        assert_eq!(cfg.retrieval.min_score, 0.0);
        assert_eq!(cfg.context.max_chars, 8000);
        assert_eq!(cfg.server.bind, "127.0.0.1:7341");
    }

    #[test]
    fn test_absolute_data_path_kept() {
        let tmp = TempDir::new().unwrap();
        let abs = tmp.path().join("elsewhere").join("data.json");
        let body = format!("[data]\npath = {:?}\n", abs.to_string_lossy());
        let path = write_config(&tmp, &body);
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.data.path, abs);
    }

    #[test]
    fn test_missing_data_section_fails() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[retrieval]\ndefault_limit = 3\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            "[data]\npath = \"x.json\"\n\n[retrieval]\ndefault_limit = 0\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn test_blank_default_source_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[data]\npath = \"x.json\"\ndefault_source = \" \"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let err = load_config(Path::new("/nonexistent/ops.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
