// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    /// Used when stdout carries the output and no file should be touched.
    Stderr,
}

/// Installs the global subscriber. `RUST_LOG` wins over `level`.
///
/// The terminal belongs to the TUI, so the interactive app logs to a file.
pub fn init(target: &LogTarget, level: &str) -> Result<()> {
    let filter = env_filter(level)?;
    let installed = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_ansi(false)
            .with_target(false)
            .with_env_filter(filter)
            .try_init(),
        LogTarget::File(path) => tracing_subscriber::fmt()
            .with_writer(Mutex::new(open_log_file(path)?))
            .with_ansi(false)
            .with_target(false)
            .with_env_filter(filter)
            .try_init(),
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                path.display()
            )
        })
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{env_filter, open_log_file};
    use anyhow::Result;

    #[test]
    fn configured_levels_build_filters() {
        for level in ["trace", "debug", "info", "warn", "error", "off"] {
            assert!(env_filter(level).is_ok(), "{level} should parse");
        }
    }

    #[test]
    fn log_file_is_created_with_parent_directories() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("castlist.log");
        open_log_file(&path)?;
        assert!(path.exists());
        Ok(())
    }
}
