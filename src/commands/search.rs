// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::api::{ApiClient, ApiResult};
use crate::commands::buyers;
use crate::models::Buyer;
use crate::session::SearchHistory;
use crate::utils::{notify_error, notify_success};

pub const SEARCH_LIMIT: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub mineral: String,
    pub city: String,
    pub state: String,
}

impl SearchQuery {
    /// History entry, e.g. `oro en Trujillo, La Libertad`.
    pub fn label(&self) -> String {
        format!("{} en {}, {}", self.mineral, self.city, self.state)
    }
}

/// Runs the search and records it in `history` when anything was found.
pub fn run(
    client: &ApiClient,
    query: &SearchQuery,
    history: &mut SearchHistory,
) -> ApiResult<Vec<Buyer>> {
    let res = buyers::fetch(client, 0, SEARCH_LIMIT);
    if let ApiResult::Success(found) = &res {
        if !found.is_empty() {
            history.push(query.label());
        }
    }
    res
}

pub fn render_results(found: &[Buyer]) -> String {
    if found.is_empty() {
        return "No buyers found.\n".to_string();
    }
    let mut out = format!("Found {} buyers\n\n", found.len());
    for b in found {
        out.push_str(&buyers::render_card(b));
        out.push('\n');
    }
    out
}

pub fn render_history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "No recent searches.\n".to_string();
    }
    history.iter().map(|s| format!("🔍 {}\n", s)).collect()
}

pub fn query_from(m: &clap::ArgMatches) -> SearchQuery {
    let arg = |k: &str| m.get_one::<String>(k).cloned().unwrap_or_default();
    SearchQuery {
        mineral: arg("mineral"),
        city: arg("city"),
        state: arg("state"),
    }
}

pub fn handle(client: &ApiClient, m: &clap::ArgMatches, history: &mut SearchHistory) -> Result<()> {
    let query = query_from(m);
    if query.mineral.is_empty() {
        anyhow::bail!("Select a mineral to search for");
    }
    match run(client, &query, history) {
        ApiResult::Success(found) => {
            if !found.is_empty() {
                notify_success(&format!("Found {} buyers", found.len()));
            }
            print!("{}", render_results(&found));
        }
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Buyer search failed: {}", error));
        }
    }
    Ok(())
}
