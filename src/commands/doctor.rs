// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::api::{ApiClient, ApiResult};
use crate::commands::health;
use crate::config::{Config, env_file_path};
use crate::utils::pretty_table;

/// Configuration rows plus any problems found. An unreachable backend is
/// reported, not returned as an error.
pub fn diagnose(client: &ApiClient, cfg: &Config) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
    let env_file = match env_file_path() {
        Ok(p) if p.exists() => p.display().to_string(),
        Ok(p) => format!("{} (absent)", p.display()),
        Err(e) => format!("unavailable: {}", e),
    };
    let settings = vec![
        vec!["api_url".into(), cfg.api_url.clone()],
        vec!["timeout".into(), format!("{}s", cfg.timeout.as_secs())],
        vec!["poll_interval".into(), format!("{}s", cfg.poll_interval.as_secs())],
        vec!["health_interval".into(), format!("{}s", cfg.health_interval.as_secs())],
        vec!["chat_context".into(), cfg.chat_context.clone()],
        vec!["env_file".into(), env_file],
    ];

    let mut issues = Vec::new();
    if let ApiResult::Failure { error, .. } = health::check(client) {
        issues.push(vec!["backend_unreachable".into(), error]);
    }
    for (endpoint, label) in [("/prices/latest", "prices_unavailable"), ("/tasks/all", "tasks_unavailable")] {
        if let ApiResult::Failure { error, .. } = client.get(endpoint) {
            issues.push(vec![label.into(), error]);
        }
    }
    (settings, issues)
}

pub fn handle(client: &ApiClient, cfg: &Config) -> Result<()> {
    let (settings, issues) = diagnose(client, cfg);
    println!("{}", pretty_table(&["Setting", "Value"], settings));
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], issues));
    }
    Ok(())
}
