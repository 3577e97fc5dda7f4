// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::api::{ApiClient, ApiResult, RequestOptions};
use crate::models::{DniRecord, Envelope, RucRecord};
use crate::utils::{fmt_opt, maybe_print_json, notify_error, notify_success, pretty_table};
use crate::validation::TaxId;

pub const NOT_FOUND: &str = "No results found";

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ruc", sub)) => {
            let id = TaxId::ruc(sub.get_one::<String>("id").unwrap())?;
            print_lookup(lookup::<RucRecord>(client, &id), sub, ruc_rows)?;
        }
        Some(("dni", sub)) => {
            let id = TaxId::dni(sub.get_one::<String>("id").unwrap())?;
            print_lookup(lookup::<DniRecord>(client, &id), sub, dni_rows)?;
        }
        Some(("verify", sub)) => {
            let id = TaxId::ruc(sub.get_one::<String>("id").unwrap())?;
            let res = verify(client, &id);
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &res.to_json())? {
                return Ok(());
            }
            match res {
                ApiResult::Success(v) => print!("{}", render_verification(&v)),
                ApiResult::Failure { error, .. } => {
                    notify_error(&format!("Verification failed: {}", error))
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Looks up an already-validated identifier. An empty `data` is a miss.
pub fn lookup<T: DeserializeOwned>(client: &ApiClient, id: &TaxId) -> ApiResult<Option<T>> {
    client
        .get(&id.endpoint())
        .decode::<Envelope<T>>()
        .map(|e| e.data)
}

pub fn verify(client: &ApiClient, ruc: &TaxId) -> ApiResult {
    let opts = RequestOptions::default().query("ruc", ruc.as_str());
    client.post_with("/sunat/verify-company", &Value::Null, &opts)
}

pub fn ruc_rows(r: &RucRecord) -> Vec<Vec<String>> {
    vec![
        vec!["RUC".into(), fmt_opt(r.ruc.as_deref())],
        vec!["Name".into(), fmt_opt(r.name.as_deref())],
        vec!["Business name".into(), fmt_opt(r.business_name.as_deref())],
        vec!["Status".into(), fmt_opt(r.status.as_deref())],
        vec!["Address".into(), fmt_opt(r.address.as_deref())],
    ]
}

pub fn dni_rows(r: &DniRecord) -> Vec<Vec<String>> {
    vec![
        vec!["DNI".into(), fmt_opt(r.dni.as_deref())],
        vec!["Name".into(), fmt_opt(r.name.as_deref())],
        vec!["Last name".into(), fmt_opt(r.last_name.as_deref())],
        vec!["Status".into(), fmt_opt(r.status.as_deref())],
        vec!["Address".into(), fmt_opt(r.address.as_deref())],
        vec!["Phone".into(), fmt_opt(r.phone.as_deref())],
    ]
}

pub fn render_verification(v: &Value) -> String {
    let verified = v.get("verified").and_then(Value::as_bool).unwrap_or(false);
    let message = v.get("message").and_then(Value::as_str).unwrap_or("");
    let ruc = v.get("ruc").and_then(Value::as_str).unwrap_or("-");
    let mark = if verified { "✔" } else { "✖" };
    format!("{} {} {}\n", mark, ruc, message)
}

fn print_lookup<T: Serialize>(
    res: ApiResult<Option<T>>,
    sub: &clap::ArgMatches,
    rows: fn(&T) -> Vec<Vec<String>>,
) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &res.to_json())? {
        return Ok(());
    }
    match res {
        ApiResult::Success(Some(record)) => {
            notify_success("Record found");
            println!("{}", pretty_table(&["Field", "Value"], rows(&record)));
        }
        ApiResult::Success(None) => notify_error(NOT_FOUND),
        ApiResult::Failure { error, .. } => notify_error(&error),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ruc_rows_fill_missing_with_dash() {
        let r: RucRecord = serde_json::from_value(json!({
            "ruc": "20123456789",
            "name": "Minera Norte SAC",
            "status": "ACTIVO"
        }))
        .unwrap();
        let rows = ruc_rows(&r);
        assert_eq!(rows[0][1], "20123456789");
        assert_eq!(rows[2][1], "-");
    }

    #[test]
    fn verification_line() {
        let v = json!({"ruc": "20123456789", "verified": true, "message": "Empresa verificada"});
        assert_eq!(render_verification(&v), "✔ 20123456789 Empresa verificada\n");
        let v = json!({"ruc": "20123456789", "verified": false, "message": "not found"});
        assert!(render_verification(&v).starts_with("✖"));
    }
}
