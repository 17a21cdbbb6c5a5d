// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use castlist_app::{CastEntry, LoadFailure};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const APP_NAME: &str = "castlist";
pub const DEFAULT_DATASET_FILE: &str = "got_main_cast.json";
pub const DATA_PATH_ENV: &str = "CASTLIST_DATA_PATH";

const BUNDLED_DATASET: &str = include_str!("../data/got_main_cast.json");
const BUNDLED_LABEL: &str = "bundled demo dataset";

/// Where the dataset lives: a filesystem path or an `http(s)` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
    Bundled,
}

impl Source {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("data source must not be empty");
        }

        if let Some(index) = trimmed.find("://")
            && index > 0
        {
            let scheme = &trimmed[..index];
            if scheme.chars().all(char::is_alphabetic) {
                let scheme = scheme.to_ascii_lowercase();
                if scheme != "http" && scheme != "https" {
                    bail!(
                        "data source {raw:?} looks like a URI ({scheme}://); use a filesystem path or an http(s) URL"
                    );
                }
                let url = Url::parse(trimmed)
                    .with_context(|| format!("data source {raw:?} is not a valid URL"))?;
                return Ok(Self::Url(url));
            }
        }

        if trimmed.starts_with("file:") {
            bail!("data source {raw:?} uses file: URI syntax; pass a plain filesystem path");
        }

        if trimmed.contains('?') {
            bail!(
                "data source {raw:?} contains '?'; remove query parameters or use an http(s) URL"
            );
        }

        Ok(Self::Path(PathBuf::from(trimmed)))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    pub fn load_failure(&self, error: &anyhow::Error) -> LoadFailure {
        LoadFailure {
            source: self.to_string(),
            message: format!("{error:#}"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
            Self::Bundled => f.write_str(BUNDLED_LABEL),
        }
    }
}

pub fn validate_source(raw: &str) -> Result<()> {
    Source::parse(raw).map(|_| ())
}

pub fn default_source_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(DATA_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {DATA_PATH_ENV} to the dataset path")
    })?;
    Ok(data_root.join(APP_NAME).join(DEFAULT_DATASET_FILE))
}

pub fn data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("cannot resolve data directory; set XDG_DATA_HOME or equivalent"))?;
    let dir = data_root.join(APP_NAME);
    fs::create_dir_all(&dir)
        .with_context(|| format!("create data directory {}", dir.display()))?;
    Ok(dir)
}

pub fn decode_dataset(raw: &str) -> Result<Vec<CastEntry>> {
    serde_json::from_str(raw).context(
        "expected a JSON array of objects with character, actor, first, last, and end fields",
    )
}

pub fn bundled_dataset() -> Result<Vec<CastEntry>> {
    decode_dataset(BUNDLED_DATASET).context("decode bundled demo dataset")
}

/// One-shot dataset loader. Requests bypass caches and never time out.
#[derive(Debug, Clone)]
pub struct Loader {
    http: HttpClient,
}

impl Loader {
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(None::<Duration>)
            .build()
            .context("build HTTP client")?;
        Ok(Self { http })
    }

    pub fn load(&self, source: &Source) -> Result<Vec<CastEntry>> {
        tracing::info!(%source, "loading dataset");
        let result = match source {
            Source::Path(path) => load_path(path),
            Source::Url(url) => self.load_url(url),
            Source::Bundled => bundled_dataset(),
        };

        match &result {
            Ok(entries) => tracing::info!(%source, rows = entries.len(), "dataset loaded"),
            Err(error) => tracing::warn!(%source, error = %format!("{error:#}"), "dataset load failed"),
        }
        result
    }

    fn load_url(&self, url: &Url) -> Result<Vec<CastEntry>> {
        let response = self
            .http
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .map_err(|error| connection_error(url, error))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {}", status.as_u16());
        }

        let body = response
            .text()
            .with_context(|| format!("read response body from {url}"))?;
        decode_dataset(&body).with_context(|| format!("decode dataset from {url}"))
    }
}

fn load_path(path: &Path) -> Result<Vec<CastEntry>> {
    let raw = fs::read_to_string(path).with_context(|| {
        format!(
            "read dataset {}; place {DEFAULT_DATASET_FILE} there or set [data].source",
            path.display()
        )
    })?;
    decode_dataset(&raw).with_context(|| format!("decode dataset {}", path.display()))
}

fn connection_error(url: &Url, error: reqwest::Error) -> anyhow::Error {
    anyhow!("cannot reach {url} -- check the address and that the server is up ({error})")
}
