//! Path resolution for the trellis database and log file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default database location: `$HOME/.trellis/trellis.db`.
pub fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".trellis").join("trellis.db"))
}

/// Resolve the database path from the `--db` flag (which clap already fills
/// from `TRELLIS_DB`), falling back to the default location.
pub fn resolve_db_path(cli_db: Option<String>) -> Result<String> {
    match cli_db {
        Some(p) => Ok(p),
        None => {
            let path = default_db_path()?;
            Ok(path
                .to_str()
                .context("default DB path is not valid UTF-8")?
                .to_string())
        }
    }
}

/// Create the database's parent directory if it does not exist yet.
pub fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Log file path from `TRELLIS_LOG`, if set.
pub fn log_path() -> Option<PathBuf> {
    std::env::var_os("TRELLIS_LOG")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}
