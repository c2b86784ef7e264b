use std::fs::OpenOptions;

use anyhow::{Context, Result};
use env_logger::Env;

use crate::paths;

/// Install a file logger when `TRELLIS_LOG` names a file.
///
/// The tree view owns the terminal, so nothing is ever logged to stderr.
/// Without `TRELLIS_LOG` no logger is installed and the `log` macros are
/// no-ops. The level comes from `RUST_LOG` and defaults to `info`.
pub fn init() -> Result<()> {
    let Some(path) = paths::log_path() else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .context("logger already initialised")?;

    Ok(())
}
