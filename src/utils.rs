// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table, presets::UTF8_FULL};

const UA: &str = concat!("mineraldesk/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// `$1950.32`
pub fn fmt_usd(v: f64) -> String {
    format!("${:.2}", v)
}

/// `S/ 1234.56`
pub fn fmt_pen(v: f64) -> String {
    format!("S/ {:.2}", v)
}

pub fn fmt_opt(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => "-".to_string(),
    }
}

pub fn fmt_opt_f64(v: Option<f64>, dp: usize) -> String {
    match v {
        Some(x) => format!("{:.*}", dp, x),
        None => "-".to_string(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Terminal stand-in for the dashboard's toast notifications.
pub fn notify_error(msg: &str) {
    eprintln!("✖ {}", msg);
}

pub fn notify_success(msg: &str) {
    eprintln!("✔ {}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_formats_two_decimals() {
        assert_eq!(fmt_usd(1950.32), "$1950.32");
        assert_eq!(fmt_usd(0.0), "$0.00");
        assert_eq!(fmt_pen(1234.56), "S/ 1234.56");
        assert_eq!(fmt_pen(10.005_f64 + 0.0001), "S/ 10.01");
    }

    #[test]
    fn optional_fields_render_as_dash() {
        assert_eq!(fmt_opt(None), "-");
        assert_eq!(fmt_opt(Some("  ")), "-");
        assert_eq!(fmt_opt(Some("Trujillo")), "Trujillo");
        assert_eq!(fmt_opt_f64(None, 2), "-");
        assert_eq!(fmt_opt_f64(Some(1.23456), 4), "1.2346");
    }
}
