use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::VaultConfig;
use crate::model::vault::Vault;

/// Name of the per-vault configuration file
pub const CONFIG_FILE: &str = "taskgraph.toml";

/// Written by `tg init`; parses to `VaultConfig::default()`
pub const DEFAULT_CONFIG: &str = r#"[corpus]
extensions = ["md"]
exclude = [".git", ".obsidian", ".trash", "target"]

[display]
format = "dot"

[display.layout]
hierarchical = true
direction = "LR"
sort_method = "directed"

[display.edges]
arrows = "to"

[display.interaction]
drag_nodes = true
drag_view = true
zoom = true

[display.manipulation]
enabled = true
"#;

/// Error type for vault discovery and configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a directory containing taskgraph.toml.
pub fn find_config_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Discover the vault for `start`: the nearest ancestor with a
/// taskgraph.toml, or `start` itself with default configuration.
pub fn discover_vault(start: &Path) -> Result<Vault, ConfigError> {
    let start = fs::canonicalize(start).map_err(|e| ConfigError::ReadError {
        path: start.to_path_buf(),
        source: e,
    })?;

    match find_config_root(&start) {
        Some(root) => {
            let config_path = root.join(CONFIG_FILE);
            let config = read_config(&config_path)?;
            Ok(Vault {
                root,
                config_path: Some(config_path),
                config,
            })
        }
        None => Ok(Vault {
            root: start,
            config_path: None,
            config: VaultConfig::default(),
        }),
    }
}

/// Read and parse a taskgraph.toml file.
pub fn read_config(path: &Path) -> Result<VaultConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write the default taskgraph.toml into `root`. Returns the path written.
pub fn write_default_config(root: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path));
    }
    fs::write(&path, DEFAULT_CONFIG)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{Direction, OutputFormat};
    use tempfile::TempDir;

    #[test]
    fn test_default_config_text_matches_defaults() {
        let config: VaultConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, VaultConfig::default());
    }

    #[test]
    fn test_discover_without_config_uses_start_dir() {
        let tmp = TempDir::new().unwrap();
        let vault = discover_vault(tmp.path()).unwrap();
        assert_eq!(vault.root, fs::canonicalize(tmp.path()).unwrap());
        assert!(vault.config_path.is_none());
        assert_eq!(vault.config, VaultConfig::default());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[display]\nformat = \"json\"\n[display.layout]\ndirection = \"RL\"\n",
        )
        .unwrap();
        let sub = tmp.path().join("notes/daily");
        fs::create_dir_all(&sub).unwrap();

        let vault = discover_vault(&sub).unwrap();
        assert_eq!(vault.root, fs::canonicalize(tmp.path()).unwrap());
        assert_eq!(vault.config.display.format, OutputFormat::Json);
        assert_eq!(vault.config.display.layout.direction, Direction::RightLeft);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[display]\nformat = \"svg\"\n").unwrap();
        let err = discover_vault(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = write_default_config(tmp.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        let err = write_default_config(tmp.path(), false).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
        assert!(write_default_config(tmp.path(), true).is_ok());
    }
}
