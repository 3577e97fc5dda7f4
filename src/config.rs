// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("pe.mineralagent", "MineralAgent", "mineraldesk"));

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CHAT_CONTEXT: &str = "Soy un vendedor de minerales en Trujillo, Perú";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    /// Task list refresh interval.
    pub poll_interval: Duration,
    pub health_interval: Duration,
    pub chat_context: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(3),
            health_interval: Duration::from_secs(5),
            chat_context: DEFAULT_CHAT_CONTEXT.to_string(),
        }
    }
}

pub fn env_file_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("mineraldesk.env"))
}

impl Config {
    /// Loads `.env` from the working directory and `mineraldesk.env` from the
    /// platform config dir, then reads the process environment.
    pub fn load(api_url_override: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();
        if let Ok(path) = env_file_path() {
            if path.exists() {
                dotenvy::from_path(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                tracing::debug!(path = %path.display(), "loaded env file");
            }
        }
        let mut cfg = Self::from_lookup(|k| std::env::var(k).ok())?;
        if let Some(url) = api_url_override {
            cfg.api_url = validate_url(url)?;
        }
        tracing::debug!(api_url = %cfg.api_url, "configuration loaded");
        Ok(cfg)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let api_url = match get("MINERALDESK_API_URL") {
            Some(u) => validate_url(&u)?,
            None => defaults.api_url,
        };
        let timeout = secs_var(get("MINERALDESK_TIMEOUT_SECS"), "MINERALDESK_TIMEOUT_SECS")?
            .unwrap_or(defaults.timeout);
        let poll_interval = secs_var(get("MINERALDESK_POLL_SECS"), "MINERALDESK_POLL_SECS")?
            .unwrap_or(defaults.poll_interval);
        let health_interval = secs_var(get("MINERALDESK_HEALTH_SECS"), "MINERALDESK_HEALTH_SECS")?
            .unwrap_or(defaults.health_interval);
        let chat_context = get("MINERALDESK_CHAT_CONTEXT").unwrap_or(defaults.chat_context);

        Ok(Self {
            api_url,
            timeout,
            poll_interval,
            health_interval,
            chat_context,
        })
    }
}

fn validate_url(url: &str) -> Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("API URL must start with http:// or https:// (got '{}')", url);
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn secs_var(v: Option<String>, name: &str) -> Result<Option<Duration>> {
    let Some(s) = v else {
        return Ok(None);
    };
    let n: u64 = s
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds", name))?;
    if n == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(Some(Duration::from_secs(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn reads_and_normalizes_values() {
        let cfg = Config::from_lookup(lookup(&[
            ("MINERALDESK_API_URL", "http://localhost:3000/api/"),
            ("MINERALDESK_POLL_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, "http://localhost:3000/api");
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.health_interval, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("MINERALDESK_API_URL", "localhost:8000")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MINERALDESK_POLL_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MINERALDESK_TIMEOUT_SECS", "abc")])).is_err());
    }
}
