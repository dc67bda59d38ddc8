//! Project configuration (`omt.toml`).
//!
//! The linter works out of the box with `docs/protocol` as the protocol
//! base; repositories with a different layout drop an `omt.toml` at their
//! root and the linter finds it by walking up from the working directory.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "omt.toml";
pub const DEFAULT_PROTOCOL_BASE: &str = "docs/protocol";
pub const DEFAULT_TRANSACTIONS_DIR: &str = "transactions";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OmtConfig {
    /// Directory import paths resolve against.
    #[serde(default = "default_protocol_base")]
    pub protocol_base: PathBuf,
    /// Subdirectory of the protocol base scanned by `--all`.
    #[serde(default = "default_transactions_dir")]
    pub transactions_dir: String,
}

impl Default for OmtConfig {
    fn default() -> Self {
        OmtConfig {
            protocol_base: default_protocol_base(),
            transactions_dir: default_transactions_dir(),
        }
    }
}

impl OmtConfig {
    /// The glob pattern `--all` uses to discover transaction files.
    pub fn transactions_pattern(&self) -> String {
        format!(
            "{}/{}/*/transaction.omt",
            self.protocol_base.display(),
            self.transactions_dir
        )
    }
}

fn default_protocol_base() -> PathBuf {
    PathBuf::from(DEFAULT_PROTOCOL_BASE)
}

fn default_transactions_dir() -> String {
    DEFAULT_TRANSACTIONS_DIR.to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read {CONFIG_FILE}: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid {CONFIG_FILE}: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Walk up from `start` looking for a directory containing `omt.toml`.
pub fn find_config_root(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        if current.join(CONFIG_FILE).exists() {
            return Some(current.to_path_buf());
        }
        dir = current.parent();
    }
    None
}

/// Load `omt.toml` from `root`. Relative `protocol_base` entries are
/// resolved against the config file's directory.
pub fn load_config(root: &Path) -> Result<OmtConfig, ConfigError> {
    let text = fs::read_to_string(root.join(CONFIG_FILE)).map_err(ConfigError::Io)?;
    let mut config: OmtConfig = toml::from_str(&text).map_err(ConfigError::Parse)?;
    if config.protocol_base.is_relative() {
        config.protocol_base = root.join(&config.protocol_base);
    }
    Ok(config)
}

/// Resolve the effective configuration for a working directory: the nearest
/// `omt.toml` if one exists, the defaults otherwise. A broken config file is
/// reported and the defaults used.
pub fn discover(start: &Path) -> OmtConfig {
    match find_config_root(start) {
        Some(root) => match load_config(&root) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("warning: {err}");
                OmtConfig::default()
            }
        },
        None => OmtConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_docs_protocol() {
        let config = OmtConfig::default();
        assert_eq!(config.protocol_base, PathBuf::from("docs/protocol"));
        assert_eq!(
            config.transactions_pattern(),
            "docs/protocol/transactions/*/transaction.omt"
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: OmtConfig = toml::from_str("protocol_base = \"specs\"").unwrap();
        assert_eq!(config.protocol_base, PathBuf::from("specs"));
        assert_eq!(config.transactions_dir, "transactions");
    }
}
