// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{Budget, Buyer, BuyerStatus};

pub fn write_buyers_csv(path: &Path, buyers: &[Buyer]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record([
        "id",
        "name",
        "ruc",
        "classification",
        "status",
        "address",
        "phone",
        "email",
        "website",
    ])?;
    for b in buyers {
        wtr.write_record([
            b.id.map(|i| i.to_string()).unwrap_or_default(),
            b.name.clone().unwrap_or_default(),
            b.ruc.clone().unwrap_or_default(),
            b.classification.clone().unwrap_or_default(),
            BuyerStatus::badge(b.status).0.to_lowercase(),
            b.address.clone().unwrap_or_default(),
            b.phone.clone().unwrap_or_default(),
            b.email.clone().unwrap_or_default(),
            b.website.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a generated budget as pretty JSON, or as a two-column CSV when the
/// path ends in `.csv`.
pub fn write_budget(path: &Path, budget: &Budget) -> Result<()> {
    let is_csv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        std::fs::write(path, serde_json::to_string_pretty(budget)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(());
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(["field", "value"])?;
    let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    let d = budget.details.clone().unwrap_or_default();
    let rows: [(&str, String); 14] = [
        ("buyer_id", budget.buyer_id.map(|i| i.to_string()).unwrap_or_default()),
        ("mineral_type", budget.mineral_type.clone().unwrap_or_default()),
        ("quantity_kg", num(budget.quantity_kg)),
        ("law_percentage", num(budget.law_percentage)),
        ("recovery_percentage", num(budget.recovery_percentage)),
        ("metal_price_usd_oz", num(budget.metal_price_usd_oz)),
        ("fx_rate", num(budget.fx_rate)),
        ("usable_kg", num(d.usable_kg)),
        ("base_price_usd", num(d.base_price_usd)),
        ("base_price_pen", num(d.base_price_pen)),
        ("freight_cost_pen", num(d.freight_cost_pen)),
        ("net_before_tax", num(d.net_before_tax)),
        ("taxes", num(d.taxes)),
        ("final_amount", num(d.final_amount)),
    ];
    for (k, v) in rows {
        wtr.write_record([k, v.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}
