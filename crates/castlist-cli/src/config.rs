// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use castlist_source::{APP_NAME, Source};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "CASTLIST_CONFIG_PATH";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_NAME: &str = "castlist.log";
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [data] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Regenerate it with --print-example-config",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(source) = &self.data.source {
            castlist_source::validate_source(source)
                .with_context(|| format!("invalid data.source in {}", path.display()))?;
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join("|")
            );
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!(
                "log.file in {} must not be empty; remove it to use the default",
                path.display()
            );
        }

        Ok(())
    }

    /// Configured source, then `CASTLIST_DATA_PATH`, then the data directory.
    pub fn source(&self) -> Result<Source> {
        match &self.data.source {
            Some(raw) => Source::parse(raw),
            None => Ok(Source::from_path(castlist_source::default_source_path()?)),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(file) => Ok(PathBuf::from(file)),
            None => Ok(castlist_source::data_dir()?.join(LOG_FILE_NAME)),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# castlist config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Filesystem path or http(s) URL. Default is the platform data dir\n# (for example ~/.local/share/castlist/got_main_cast.json)\n# source = \"./got_main_cast.json\"\n\n[log]\n# One of trace, debug, info, warn, error, off. RUST_LOG overrides it.\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# file = \"/absolute/path/to/{LOG_FILE_NAME}\"\n",
            path.display(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use castlist_source::{DATA_PATH_ENV, Source};
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.log_level(), "info");
        assert!(config.data.source.is_none());
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[data]\nsource = \"cast.json\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[data] and [log]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[data]\nsource = \"http://localhost:8000/got_main_cast.json\"\n[log]\nlevel = \"debug\"\nfile = \"/tmp/castlist-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert!(config.source()?.is_remote());
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/castlist-test.log"));
        Ok(())
    }

    #[test]
    fn source_rejects_uri_style_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[data]\nsource = \"ftp://example.com/cast.json\"\n")?;
        let error = Config::load(&path).expect_err("ftp source should fail validation");
        let message = format!("{error:#}");
        assert!(message.contains("invalid data.source"), "got {message}");
        assert!(message.contains("looks like a URI"), "got {message}");
        Ok(())
    }

    #[test]
    fn log_level_is_validated() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"loud\"\n")?;
        let error = Config::load(&path).expect_err("unknown level should fail");
        assert!(error.to_string().contains("trace|debug|info|warn|error|off"));
        Ok(())
    }

    #[test]
    fn source_prefers_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[data]\nsource = \"/from/config.json\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(DATA_PATH_ENV, "/from/env.json");
        }
        let resolved = Config::load(&path)?.source();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(DATA_PATH_ENV);
        }
        assert_eq!(resolved?, Source::from_path("/from/config.json"));
        Ok(())
    }

    #[test]
    fn source_uses_env_override_when_unset() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(DATA_PATH_ENV, "/from/env-only.json");
        }
        let resolved = Config::load(&path)?.source();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(DATA_PATH_ENV);
        }
        assert_eq!(resolved?, Source::from_path("/from/env-only.json"));
        Ok(())
    }

    #[test]
    fn source_defaults_to_dataset_file_name() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(DATA_PATH_ENV);
        }
        let Source::Path(path) = Config::default().source()? else {
            panic!("default source should be a path");
        };
        assert!(path.ends_with("got_main_cast.json"), "got {}", path.display());
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("CASTLIST_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("CASTLIST_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn example_config_loads_cleanly() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[data]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.log_level(), "info");
        Ok(())
    }
}
