// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use serde_json::Value;

use crate::api::{ApiClient, ApiResult, RequestOptions};
use crate::commands::exporter;
use crate::models::{Buyer, BuyerStatus, NewBuyer};
use crate::utils::{fmt_opt, maybe_print_json, notify_error, notify_success};
use crate::validation::TaxId;

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub)?,
        Some(("show", sub)) => show(client, sub)?,
        Some(("verify", sub)) => verify(client, sub)?,
        Some(("verified", sub)) => verified(client, sub)?,
        Some(("add", sub)) => add(client, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn fetch(client: &ApiClient, skip: u64, limit: u64) -> ApiResult<Vec<Buyer>> {
    let opts = RequestOptions::default()
        .query("skip", skip)
        .query("limit", limit);
    client.get_with("/buyers/", &opts).decode()
}

pub fn fetch_verified(client: &ApiClient) -> ApiResult<Vec<Buyer>> {
    client.get("/buyers/verified/list").decode()
}

/// Case-insensitive substring match on the name, or plain substring match on
/// the RUC. An empty term keeps everything.
pub fn filter_buyers<'a>(buyers: &'a [Buyer], term: &str) -> Vec<&'a Buyer> {
    if term.is_empty() {
        return buyers.iter().collect();
    }
    let needle = term.to_lowercase();
    buyers
        .iter()
        .filter(|b| {
            b.name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
                || b.ruc.as_deref().is_some_and(|r| r.contains(term))
        })
        .collect()
}

pub fn buyers_table(buyers: &[&Buyer]) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(["ID", "Name", "RUC", "Class", "Status", "Phone", "Email"]);
    for b in buyers {
        let (label, color) = BuyerStatus::badge(b.status);
        t.add_row(vec![
            Cell::new(b.id.map(|i| i.to_string()).unwrap_or_default()),
            Cell::new(b.display_name()),
            Cell::new(fmt_opt(b.ruc.as_deref())),
            Cell::new(fmt_opt(b.classification.as_deref())),
            Cell::new(label).fg(color),
            Cell::new(fmt_opt(b.phone.as_deref())),
            Cell::new(fmt_opt(b.email.as_deref())),
        ]);
    }
    t
}

/// Text card for a single buyer. The website line only appears when the
/// backend sent one.
pub fn render_card(b: &Buyer) -> String {
    let (label, _) = BuyerStatus::badge(b.status);
    let mut out = String::new();
    out.push_str(&format!("{}\n", b.display_name()));
    out.push_str(&format!("  RUC:      {}\n", fmt_opt(b.ruc.as_deref())));
    out.push_str(&format!(
        "  Class:    {}  [{}]\n",
        fmt_opt(b.classification.as_deref()),
        label
    ));
    out.push_str(&format!("  Address:  {}\n", fmt_opt(b.address.as_deref())));
    out.push_str(&format!("  Phone:    {}\n", fmt_opt(b.phone.as_deref())));
    out.push_str(&format!("  Email:    {}\n", fmt_opt(b.email.as_deref())));
    if let Some(site) = b.website.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&format!("  Website:  {}\n", site));
    }
    if let Some(notes) = b.risk_notes.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&format!("  Risk:     {}\n", notes));
    }
    out.push_str(&format!("  WhatsApp: {}\n", whatsapp_link(b)));
    out
}

pub fn whatsapp_link(b: &Buyer) -> String {
    let text = format!("Hola {}, soy vendedor de minerales", b.display_name());
    match reqwest::Url::parse_with_params("https://wa.me/", &[("text", text.as_str())]) {
        Ok(url) => url.to_string(),
        Err(_) => "https://wa.me/".to_string(),
    }
}

/// Output of `buyers verified`; an empty list reads like `buyers list`.
pub fn render_verified(buyers: &[Buyer]) -> String {
    if buyers.is_empty() {
        return "No buyers found.\n".to_string();
    }
    let refs: Vec<&Buyer> = buyers.iter().collect();
    format!("{}\n{} verified buyers\n", buyers_table(&refs), buyers.len())
}

fn list(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let skip = *sub.get_one::<u64>("skip").unwrap_or(&0);
    let limit = *sub.get_one::<u64>("limit").unwrap_or(&100);
    let term = sub.get_one::<String>("filter").map(String::as_str).unwrap_or("");

    let buyers = match fetch(client, skip, limit) {
        ApiResult::Success(b) => b,
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Could not load buyers: {}", error));
            Vec::new()
        }
    };
    let shown = filter_buyers(&buyers, term);

    if let Some(path) = sub.get_one::<String>("csv") {
        let owned: Vec<Buyer> = shown.iter().map(|b| (*b).clone()).collect();
        exporter::write_buyers_csv(Path::new(path), &owned)?;
        notify_success(&format!("Exported {} buyers to {}", owned.len(), path));
    }

    if maybe_print_json(json_flag, jsonl_flag, &shown)? {
        return Ok(());
    }
    if shown.is_empty() {
        println!("No buyers found.");
    } else {
        println!("{}", buyers_table(&shown));
        println!("{} of {} buyers", shown.len(), buyers.len());
    }
    Ok(())
}

fn show(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let res: ApiResult<Buyer> = client.get(&format!("/buyers/{}", id)).decode();
    if sub.get_flag("json") || sub.get_flag("jsonl") {
        println!("{}", serde_json::to_string_pretty(&res.to_json())?);
        return Ok(());
    }
    match res {
        ApiResult::Success(b) => print!("{}", render_card(&b)),
        ApiResult::Failure { error, .. } => notify_error(&format!("Buyer {}: {}", id, error)),
    }
    Ok(())
}

fn verify(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    match client.post(&format!("/buyers/{}/verify", id), &Value::Null) {
        ApiResult::Success(v) => {
            let ruc = v.get("ruc").and_then(Value::as_str).unwrap_or("-");
            let ok = v
                .pointer("/verification/verified")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if ok {
                notify_success(&format!("Buyer {} (RUC {}) verified", id, ruc));
            } else {
                let why = v
                    .pointer("/verification/error")
                    .and_then(Value::as_str)
                    .unwrap_or("not verified");
                notify_error(&format!("Buyer {} (RUC {}) flagged: {}", id, ruc, why));
            }
        }
        ApiResult::Failure { error, .. } => notify_error(&format!("Verification failed: {}", error)),
    }
    Ok(())
}

fn verified(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let buyers = match fetch_verified(client) {
        ApiResult::Success(b) => b,
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Could not load verified buyers: {}", error));
            Vec::new()
        }
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &buyers)? {
        return Ok(());
    }
    print!("{}", render_verified(&buyers));
    Ok(())
}

fn add(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let arg = |k: &str| sub.get_one::<String>(k).cloned().unwrap_or_default();
    let ruc = TaxId::ruc(&arg("ruc"))?;
    let buyer = NewBuyer {
        ruc: ruc.as_str().to_string(),
        name: arg("name"),
        address: arg("address"),
        phone: arg("phone"),
        email: arg("email"),
        website: sub.get_one::<String>("website").cloned(),
        classification: arg("classification"),
    };
    match client.post("/buyers/", &buyer).decode::<Buyer>() {
        ApiResult::Success(b) => {
            notify_success(&format!(
                "Registered buyer #{} {}",
                b.id.map(|i| i.to_string()).unwrap_or_else(|| "?".into()),
                b.display_name()
            ));
            print!("{}", render_card(&b));
        }
        ApiResult::Failure { error, .. } => notify_error(&format!("Could not register buyer: {}", error)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer(name: &str, ruc: &str) -> Buyer {
        Buyer {
            name: Some(name.into()),
            ruc: Some(ruc.into()),
            ..Default::default()
        }
    }

    #[test]
    fn filter_matches_name_case_insensitively_or_ruc() {
        let list = vec![
            buyer("Minera Norte SAC", "20111111111"),
            buyer("Metales del Sur", "20222222222"),
            Buyer::default(),
        ];
        let names = |v: Vec<&Buyer>| -> Vec<String> {
            v.into_iter().map(|b| b.display_name().to_string()).collect()
        };
        assert_eq!(names(filter_buyers(&list, "NORTE")), vec!["Minera Norte SAC"]);
        assert_eq!(names(filter_buyers(&list, "2222")), vec!["Metales del Sur"]);
        assert_eq!(filter_buyers(&list, "").len(), 3);
        assert!(filter_buyers(&list, "zzz").is_empty());
    }

    #[test]
    fn card_omits_missing_website() {
        let mut b = buyer("Minera Norte SAC", "20111111111");
        let card = render_card(&b);
        assert!(!card.contains("Website"));
        assert!(card.contains("[Pending]"));
        b.website = Some("https://norte.pe".into());
        b.status = Some(BuyerStatus::Verified);
        let card = render_card(&b);
        assert!(card.contains("Website:  https://norte.pe"));
        assert!(card.contains("[Verified]"));
    }

    #[test]
    fn whatsapp_link_is_percent_encoded() {
        let b = buyer("Oro & Co", "1");
        assert_eq!(
            whatsapp_link(&b),
            "https://wa.me/?text=Hola+Oro+%26+Co%2C+soy+vendedor+de+minerales"
        );
    }

    #[test]
    fn empty_verified_list_reads_like_list() {
        assert_eq!(render_verified(&[]), "No buyers found.\n");
        let out = render_verified(&[buyer("Minera Norte SAC", "20111111111")]);
        assert!(out.contains("Minera Norte SAC"));
        assert!(out.ends_with("1 verified buyers\n"));
    }
}
