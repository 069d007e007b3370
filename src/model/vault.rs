use std::path::PathBuf;

use super::config::VaultConfig;

/// A discovered vault: the directory tree scanned for tasks
#[derive(Debug, Clone)]
pub struct Vault {
    /// Root directory of the vault
    pub root: PathBuf,
    /// Path to taskgraph.toml, if the vault has one
    pub config_path: Option<PathBuf>,
    /// Parsed taskgraph.toml (defaults when absent)
    pub config: VaultConfig,
}
