// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::Value;

use crate::api::{ApiClient, ApiResult, RequestOptions};
use crate::utils::{maybe_print_json, notify_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Providers,
    Prices,
    Report,
}

impl Analysis {
    pub fn endpoint(&self, mineral: &str) -> String {
        match self {
            Analysis::Providers => format!("/ai/search-providers/{}", mineral),
            Analysis::Prices => format!("/ai/analyze-prices/{}", mineral),
            Analysis::Report => format!("/ai/generate-report/{}", mineral),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Analysis::Providers => "Providers",
            Analysis::Prices => "Price analysis",
            Analysis::Report => "Market report",
        }
    }
}

pub fn run(client: &ApiClient, analysis: Analysis, mineral: &str, location: Option<&str>) -> ApiResult {
    let mut opts = RequestOptions::default();
    if let Some(loc) = location {
        opts = opts.query("location", loc);
    }
    client.get_with(&analysis.endpoint(mineral), &opts)
}

/// Analyses can take a while; the payload is shown as-is.
pub fn render(analysis: Analysis, mineral: &str, v: &Value) -> String {
    let body = v.get("data").unwrap_or(v);
    let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
    format!("{} ({})\n{}\n", analysis.title(), mineral, pretty)
}

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    let (analysis, sub) = match m.subcommand() {
        Some(("providers", sub)) => (Analysis::Providers, sub),
        Some(("prices", sub)) => (Analysis::Prices, sub),
        Some(("report", sub)) => (Analysis::Report, sub),
        _ => return Ok(()),
    };
    let mineral = sub.get_one::<String>("mineral").unwrap();
    let location = match analysis {
        Analysis::Providers => sub.get_one::<String>("location").map(String::as_str),
        _ => None,
    };
    let res = run(client, analysis, mineral, location);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &res.to_json())? {
        return Ok(());
    }
    match res {
        ApiResult::Success(v) => print!("{}", render(analysis, mineral, &v)),
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("{} failed: {}", analysis.title(), error));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoints_embed_the_mineral() {
        assert_eq!(Analysis::Providers.endpoint("oro"), "/ai/search-providers/oro");
        assert_eq!(Analysis::Prices.endpoint("plata"), "/ai/analyze-prices/plata");
        assert_eq!(Analysis::Report.endpoint("cobre"), "/ai/generate-report/cobre");
    }

    #[test]
    fn render_unwraps_data() {
        let out = render(
            Analysis::Report,
            "oro",
            &json!({"status": "success", "data": {"summary": "up"}}),
        );
        assert!(out.starts_with("Market report (oro)\n"));
        assert!(out.contains("\"summary\": \"up\""));
        assert!(!out.contains("status"));
    }
}
