// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::ControlFlow;

use anyhow::Result;
use serde_json::Value;

use crate::api::{ApiClient, ApiResult};
use crate::config::Config;
use crate::poller;

pub fn check(client: &ApiClient) -> ApiResult {
    client.get("/health")
}

pub fn status_line(base_url: &str, res: &ApiResult) -> String {
    match res {
        ApiResult::Success(v) => {
            let status = v.get("status").and_then(Value::as_str).unwrap_or("ok");
            format!("● Connected to {} ({})", base_url, status)
        }
        ApiResult::Failure { error, .. } => {
            format!("○ Disconnected from {}: {}", base_url, error)
        }
    }
}

pub fn handle(client: &ApiClient, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    if !m.get_flag("watch") {
        let res = check(client);
        println!("{}", status_line(client.base_url(), &res));
        if let Some(v) = res.data() {
            for key in ["service", "database", "gemini_api"] {
                if let Some(s) = v.get(key).and_then(Value::as_str) {
                    println!("  {:<10} {}", key, s);
                }
            }
        }
        return Ok(());
    }

    let limit = m.get_one::<u64>("count").copied();
    let client = client.clone();
    let handle = poller::spawn("health", cfg.health_interval, move |n| {
        let res = check(&client);
        println!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            status_line(client.base_url(), &res)
        );
        match limit {
            Some(max) if n + 1 >= max => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    })?;
    handle.wait();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use serde_json::json;

    #[test]
    fn status_line_reports_both_states() {
        let up: ApiResult = ApiResult::Success(json!({"status": "healthy"}));
        assert_eq!(
            status_line("http://127.0.0.1:8000", &up),
            "● Connected to http://127.0.0.1:8000 (healthy)"
        );
        let down: ApiResult = ApiResult::failure(ApiError::Transport {
            message: "connection refused".into(),
        });
        assert_eq!(
            status_line("http://127.0.0.1:8000", &down),
            "○ Disconnected from http://127.0.0.1:8000: connection refused"
        );
    }
}
