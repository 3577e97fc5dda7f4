// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::Value;

use crate::api::{ApiClient, ApiResult};
use crate::models::{PriceBoard, PriceQuote};
use crate::utils::{fmt_opt, fmt_usd, notify_error, notify_success, pretty_table};

/// Symbols in display order; anything else the backend sends follows
/// alphabetically under its raw key.
const SYMBOLS: [(&str, &str); 4] = [
    ("oro", "Gold"),
    ("plata", "Silver"),
    ("cobre", "Copper"),
    ("usd_pen", "USD/PEN"),
];

pub fn label(symbol: &str) -> &str {
    SYMBOLS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, l)| *l)
        .unwrap_or(symbol)
}

pub fn fetch(client: &ApiClient) -> ApiResult<PriceBoard> {
    client.get("/prices/latest").decode()
}

/// Quotes in display order.
pub fn ordered(board: &PriceBoard) -> Vec<(&str, &PriceQuote)> {
    let Some(data) = board.data.as_ref() else {
        return Vec::new();
    };
    let mut out: Vec<(&str, &PriceQuote)> = SYMBOLS
        .iter()
        .filter_map(|(s, _)| data.get_key_value(*s).map(|(k, q)| (k.as_str(), q)))
        .collect();
    // BTreeMap iteration is already sorted
    out.extend(
        data.iter()
            .filter(|(k, _)| !SYMBOLS.iter().any(|(s, _)| *s == k.as_str()))
            .map(|(k, q)| (k.as_str(), q)),
    );
    out
}

pub fn render_card(symbol: &str, q: &PriceQuote) -> String {
    let price = q.price.map(fmt_usd).unwrap_or_else(|| "-".to_string());
    let unit = q.unit.as_deref().filter(|s| !s.is_empty()).unwrap_or("USD");
    let source = q.source.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
    format!(
        "┌ {}\n│ {}\n│ {}\n└ Source: {}\n",
        label(symbol),
        price,
        unit,
        source
    )
}

pub fn render_board(board: &PriceBoard) -> String {
    let quotes = ordered(board);
    if quotes.is_empty() {
        return "No quotes available.\n".to_string();
    }
    quotes
        .into_iter()
        .map(|(s, q)| render_card(s, q))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("refresh", _)) => refresh(client),
        Some(("show", sub)) => show(client, sub.get_flag("json"), sub.get_flag("jsonl")),
        _ => show(client, m.get_flag("json"), m.get_flag("jsonl")),
    }
}

fn show(client: &ApiClient, json_flag: bool, jsonl_flag: bool) -> Result<()> {
    let res = fetch(client);
    if json_flag || jsonl_flag {
        let quotes: Vec<Value> = res
            .data()
            .map(ordered)
            .unwrap_or_default()
            .into_iter()
            .map(|(s, q)| serde_json::json!({ "symbol": s, "label": label(s), "quote": q }))
            .collect();
        crate::utils::maybe_print_json(json_flag, jsonl_flag, &quotes)?;
        return Ok(());
    }
    match res {
        ApiResult::Success(board) => {
            print!("{}", render_board(&board));
            let rows = ordered(&board)
                .into_iter()
                .map(|(s, q)| {
                    vec![
                        label(s).to_string(),
                        q.price.map(fmt_usd).unwrap_or_else(|| "-".into()),
                        fmt_opt(q.fetched_at.as_deref()),
                    ]
                })
                .collect::<Vec<_>>();
            if !rows.is_empty() {
                println!("{}", pretty_table(&["Symbol", "Price", "Fetched"], rows));
            }
        }
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Could not load quotes: {}", error));
        }
    }
    Ok(())
}

fn refresh(client: &ApiClient) -> Result<()> {
    match client.post("/prices/refresh", &Value::Null) {
        ApiResult::Success(v) => notify_success(
            v.get("message")
                .and_then(Value::as_str)
                .unwrap_or("Quotes refreshed"),
        ),
        ApiResult::Failure { error, .. } => notify_error(&format!("Refresh failed: {}", error)),
    }
    show(client, false, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn board(v: Value) -> PriceBoard {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn gold_card_shows_two_decimal_price() {
        let b = board(json!({"data": {"oro": {"price": 1950.32, "unit": "USD", "source": "X"}}}));
        let out = render_board(&b);
        assert!(out.contains("Gold"));
        assert!(out.contains("$1950.32"));
        assert!(out.contains("Source: X"));
    }

    #[test]
    fn missing_unit_and_source_use_defaults() {
        let b = board(json!({"data": {"plata": {"price": 23.5}}}));
        let out = render_board(&b);
        assert!(out.contains("$23.50"));
        assert!(out.contains("│ USD\n"));
        assert!(out.contains("Source: N/A"));
    }

    #[test]
    fn known_symbols_first_then_alphabetical() {
        let b = board(json!({"data": {
            "zinc": {"price": 1.0},
            "usd_pen": {"price": 3.7},
            "aluminio": {"price": 2.0},
            "oro": {"price": 2000.0}
        }}));
        let keys: Vec<&str> = ordered(&b).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["oro", "usd_pen", "aluminio", "zinc"]);
    }

    #[test]
    fn empty_board_renders_placeholder() {
        assert_eq!(render_board(&board(json!({}))), "No quotes available.\n");
        assert_eq!(render_board(&board(json!({"data": null}))), "No quotes available.\n");
    }
}
