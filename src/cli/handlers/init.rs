use std::path::{Path, PathBuf};

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, ConfigError};

/// Write the default config into `dir`, reporting an enclosing vault if one
/// exists above it.
fn init_vault(dir: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    if let Some(parent) = dir.parent()
        && let Some(parent_root) = config_io::find_config_root(parent)
    {
        eprintln!(
            "Note: enclosing vault found at {}/",
            parent_root.display()
        );
        eprintln!("Creating nested vault in {}/", dir.display());
    }
    config_io::write_default_config(dir, force)
}

pub fn cmd_init(args: InitArgs, vault_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match vault_dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };

    let path = match init_vault(&dir, args.force) {
        Ok(path) => path,
        Err(ConfigError::AlreadyExists(path)) => {
            return Err(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Initialized taskgraph vault: {}", path.display());
    Ok(())
}
