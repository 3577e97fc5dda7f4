// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::api::ApiClient;
use crate::commands::{buyers, prices};
use crate::models::PriceBoard;
use crate::utils::{fmt_usd, maybe_print_json, pretty_table};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub buyers: usize,
    pub verified: usize,
    pub gold: f64,
    pub silver: f64,
    pub copper: f64,
    pub refreshed_at: DateTime<Local>,
}

fn price_or_zero(board: Option<&PriceBoard>, symbol: &str) -> f64 {
    board
        .and_then(|b| b.quote(symbol))
        .and_then(|q| q.price)
        .unwrap_or(0.0)
}

/// Each source degrades to zero on its own; one failing call never blanks
/// the whole dashboard.
pub fn load(client: &ApiClient) -> DashboardStats {
    let buyers = buyers::fetch(client, 0, 100)
        .into_data()
        .map(|b| b.len())
        .unwrap_or(0);
    let verified = buyers::fetch_verified(client)
        .into_data()
        .map(|b| b.len())
        .unwrap_or(0);
    let board = prices::fetch(client).into_data();
    DashboardStats {
        buyers,
        verified,
        gold: price_or_zero(board.as_ref(), "oro"),
        silver: price_or_zero(board.as_ref(), "plata"),
        copper: price_or_zero(board.as_ref(), "cobre"),
        refreshed_at: Local::now(),
    }
}

pub fn rows(stats: &DashboardStats) -> Vec<Vec<String>> {
    vec![
        vec!["Registered buyers".into(), stats.buyers.to_string()],
        vec!["Verified buyers".into(), stats.verified.to_string()],
        vec!["Gold (USD/oz)".into(), fmt_usd(stats.gold)],
        vec!["Silver (USD/oz)".into(), fmt_usd(stats.silver)],
        vec!["Copper (USD/oz)".into(), fmt_usd(stats.copper)],
    ]
}

pub fn render(stats: &DashboardStats) -> String {
    format!(
        "{}\nLast refresh: {}\n",
        pretty_table(&["Metric", "Value"], rows(stats)),
        stats.refreshed_at.format("%H:%M:%S")
    )
}

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    let stats = load(client);
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &stats)? {
        return Ok(());
    }
    print!("{}", render(&stats));
    Ok(())
}
