// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::Result;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::commands::exporter;
use crate::models::{Budget, BudgetRequest, Mineral};
use crate::utils::{fmt_opt_f64, fmt_pen, fmt_usd, notify_error, notify_success, pretty_table};
use crate::validation::{ValidationError, percentage, positive};

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("generate", sub)) => generate(client, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds the request from the form, refusing to submit when a required
/// field is missing or a percentage is out of range.
pub fn form_from(sub: &clap::ArgMatches) -> Result<BudgetRequest, ValidationError> {
    let buyer_id = *sub
        .get_one::<i64>("buyer")
        .ok_or(ValidationError::Missing("buyer"))?;
    let mineral = sub
        .get_one::<String>("mineral")
        .ok_or(ValidationError::Missing("mineral"))?;
    let mineral = Mineral::parse(mineral).ok_or_else(|| ValidationError::Mineral(mineral.clone()))?;
    let quantity_kg = *sub
        .get_one::<f64>("quantity")
        .ok_or(ValidationError::Missing("quantity"))?;
    let law = *sub
        .get_one::<f64>("law")
        .ok_or(ValidationError::Missing("law"))?;
    let opt = |k: &str, d: f64| sub.get_one::<f64>(k).copied().unwrap_or(d);

    Ok(BudgetRequest {
        buyer_id,
        mineral_type: mineral.as_str().to_string(),
        quantity_kg: positive("quantity_kg", quantity_kg)?,
        law_percentage: percentage("law_percentage", positive("law_percentage", law)?)?,
        recovery_percentage: percentage(
            "recovery_percentage",
            opt("recovery", BudgetRequest::DEFAULT_RECOVERY),
        )?,
        freight_cost_pen: opt("freight", BudgetRequest::DEFAULT_FREIGHT),
        discounts_percentage: percentage(
            "discounts_percentage",
            opt("discounts", BudgetRequest::DEFAULT_DISCOUNTS),
        )?,
        taxes_percentage: percentage("taxes_percentage", opt("taxes", BudgetRequest::DEFAULT_TAXES))?,
    })
}

/// Posts the form verbatim. A success body that carries an `error` field
/// (the backend's way of saying prices are missing) is a failure.
pub fn submit(client: &ApiClient, req: &BudgetRequest) -> ApiResult<Budget> {
    match client.post("/budgets/generate", req).decode::<Budget>() {
        ApiResult::Success(Budget {
            error: Some(message),
            ..
        }) => ApiResult::failure(ApiError::Backend { message }),
        other => other,
    }
}

pub fn render(b: &Budget) -> String {
    let d = b.details.clone().unwrap_or_default();
    let rows = vec![
        vec![
            "Mineral".to_string(),
            b.mineral_type.clone().unwrap_or_else(|| "-".into()),
        ],
        vec![
            "Quantity".into(),
            format!("{} kg", fmt_opt_f64(b.quantity_kg, 2)),
        ],
        vec!["Law".into(), format!("{}%", fmt_opt_f64(b.law_percentage, 2))],
        vec![
            "Usable".into(),
            format!("{} kg", fmt_opt_f64(d.usable_kg, 4)),
        ],
        vec![
            "Unit price".into(),
            b.metal_price_usd_oz
                .map(fmt_usd)
                .unwrap_or_else(|| "-".into()),
        ],
        vec!["USD/PEN".into(), fmt_opt_f64(b.fx_rate, 2)],
        vec![
            "Before tax".into(),
            d.net_before_tax.map(fmt_pen).unwrap_or_else(|| "-".into()),
        ],
        vec![
            "Taxes".into(),
            d.taxes.map(fmt_pen).unwrap_or_else(|| "-".into()),
        ],
    ];
    format!(
        "{}\nTOTAL: {}\n",
        pretty_table(&["Budget", ""], rows),
        total_line(b)
    )
}

/// `S/ 1234.56`, taken from `details.final_amount`.
pub fn total_line(b: &Budget) -> String {
    b.details
        .as_ref()
        .and_then(|d| d.final_amount)
        .map(fmt_pen)
        .unwrap_or_else(|| "S/ -".to_string())
}

fn generate(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let req = form_from(sub)?;
    let res = submit(client, &req);
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&res.to_json())?);
        return Ok(());
    }
    match res {
        ApiResult::Success(budget) => {
            notify_success("Budget generated");
            print!("{}", render(&budget));
            if let Some(out) = sub.get_one::<String>("out") {
                exporter::write_budget(Path::new(out), &budget)?;
                notify_success(&format!("Saved budget to {}", out));
            }
        }
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Could not generate budget: {}", error));
        }
    }
    Ok(())
}
