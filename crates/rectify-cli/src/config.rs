// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rectify_app::{
    DEFAULT_PRIMARY_SOURCE, DEFAULT_SECONDARY_SOURCE, DEFAULT_SHEET, SubmissionTags,
};
use rectify_client::{DEFAULT_ENDPOINT_URL, parse_endpoint_url};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

pub const APP_NAME: &str = "rectify";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_PATH_ENV: &str = "RECTIFY_CONFIG_PATH";
const ENDPOINT_URL_ENV: &str = "RECTIFY_ENDPOINT_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub endpoint: Endpoint,
    #[serde(default)]
    pub submission: Submission,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            endpoint: Endpoint::default(),
            submission: Submission::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub sheet: Option<String>,
    pub primary_source: Option<String>,
    pub secondary_source: Option<String>,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            sheet: Some(DEFAULT_SHEET.to_owned()),
            primary_source: Some(DEFAULT_PRIMARY_SOURCE.to_owned()),
            secondary_source: Some(DEFAULT_SECONDARY_SOURCE.to_owned()),
        }
    }
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
            let config = Self::default();
            config.validate(path)?;
            return Ok(config);
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
                    "config file {} has no version. Add `version = 1` and put values under [endpoint], [submission], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
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
        let url = self.endpoint_url();
        parse_endpoint_url(&url).with_context(|| {
            format!(
                "endpoint.url in {} (or {ENDPOINT_URL_ENV}) is not usable",
                path.display()
            )
        })?;

        if self.endpoint_timeout()? <= Duration::ZERO {
            bail!(
                "endpoint.timeout in {} must be positive, got {}",
                path.display(),
                self.endpoint.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT)
            );
        }

        for (key, value) in [
            ("sheet", &self.submission.sheet),
            ("primary_source", &self.submission.primary_source),
            ("secondary_source", &self.submission.secondary_source),
        ] {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                bail!(
                    "submission.{key} in {} must not be empty",
                    path.display()
                );
            }
        }

        let level = self.log_level();
        level.parse::<LevelFilter>().map_err(|_| {
            anyhow!(
                "log.level in {} must be one of off, error, warn, info, debug, trace; got {level:?}",
                path.display()
            )
        })?;

        Ok(())
    }

    /// Config value first, then `RECTIFY_ENDPOINT_URL`, then the published
    /// deployment.
    pub fn endpoint_url(&self) -> String {
        if let Some(url) = &self.endpoint.url {
            return url.trim().to_owned();
        }
        match env::var(ENDPOINT_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_owned(),
            _ => DEFAULT_ENDPOINT_URL.to_owned(),
        }
    }

    pub fn endpoint_timeout(&self) -> Result<Duration> {
        parse_duration(self.endpoint.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn submission_tags(&self) -> SubmissionTags {
        let defaults = SubmissionTags::default();
        SubmissionTags {
            sheet: self.submission.sheet.clone().unwrap_or(defaults.sheet),
            primary_source: self
                .submission
                .primary_source
                .clone()
                .unwrap_or(defaults.primary_source),
            secondary_source: self
                .submission
                .secondary_source
                .clone()
                .unwrap_or(defaults.secondary_source),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("rectify.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rectify config\n# Place this file at: {}\n\nversion = 1\n\n[endpoint]\n# Optional. Falls back to {ENDPOINT_URL_ENV}, then the published deployment.\n# url = \"{}\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[submission]\nsheet = \"{DEFAULT_SHEET}\"\nprimary_source = \"{DEFAULT_PRIMARY_SOURCE}\"\nsecondary_source = \"{DEFAULT_SECONDARY_SOURCE}\"\n\n[log]\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/rectify/rectify.log)\n# file = \"/absolute/path/to/rectify.log\"\n",
            path.display(),
            DEFAULT_ENDPOINT_URL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid timeout duration {raw:?}; value is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
