// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::ControlFlow;

use anyhow::Result;
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::api::{ApiClient, ApiResult, RequestOptions};
use crate::config::Config;
use crate::models::{Mineral, Task, TaskCreated, TaskList, TaskStatus};
use crate::poller;
use crate::utils::{fmt_opt, maybe_print_json, notify_error, notify_success};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Task types accepted by `POST /tasks/create`.
pub const TASK_TYPES: [&str; 7] = [
    "search_buyers",
    "generate_budget_buy",
    "generate_budget_sell",
    "analyze_market",
    "verify_company",
    "get_price_analysis",
    "generate_report",
];

pub fn handle(client: &ApiClient, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(client, sub)?,
        Some(("show", sub)) => show(client, sub)?,
        Some(("watch", sub)) => watch(client, cfg, sub.get_one::<u64>("max-ticks").copied())?,
        Some(("search-buyers", sub)) => {
            let opts = RequestOptions::default()
                .query("mineral_type", mineral(sub)?)
                .query("location", sub.get_one::<String>("location").unwrap());
            report_created(create(client, "/tasks/search-buyers", &opts));
        }
        Some(("budget-buy", sub)) => {
            let opts = numeric_params(
                sub,
                mineral(sub)?,
                &[
                    ("weight", "weight_kg"),
                    ("law", "law_percentage"),
                    ("recovery", "recovery_percentage"),
                    ("freight", "freight_cost"),
                    ("commission", "commission_percentage"),
                    ("price", "price_usd_oz"),
                    ("fx", "fx_rate"),
                ],
            );
            report_created(create(client, "/tasks/budget/buy", &opts));
        }
        Some(("budget-sell", sub)) => {
            let opts = numeric_params(
                sub,
                mineral(sub)?,
                &[
                    ("weight", "weight_kg"),
                    ("law", "law_percentage"),
                    ("recovery", "recovery_percentage"),
                    ("transport", "transport_cost"),
                    ("intermediary", "intermediary_percentage"),
                    ("taxes", "taxes_percentage"),
                    ("price", "price_usd_oz"),
                    ("fx", "fx_rate"),
                ],
            );
            report_created(create(client, "/tasks/budget/sell", &opts));
        }
        Some(("create", sub)) => {
            let params = sub
                .get_many::<String>("param")
                .into_iter()
                .flatten()
                .map(|p| parse_param(p))
                .collect::<Result<Map<String, Value>>>()?;
            report_created(create_task(
                client,
                sub.get_one::<String>("type").unwrap(),
                sub.get_one::<String>("description").unwrap(),
                params,
            ));
        }
        _ => list_once(client, 0),
    }
    Ok(())
}

fn mineral(sub: &clap::ArgMatches) -> Result<&'static str> {
    let raw = sub.get_one::<String>("mineral").unwrap();
    Mineral::parse(raw)
        .map(|m| m.as_str())
        .ok_or_else(|| anyhow::anyhow!("Unknown mineral '{}'", raw))
}

fn numeric_params(sub: &clap::ArgMatches, mineral: &str, keys: &[(&str, &str)]) -> RequestOptions {
    keys.iter().fold(
        RequestOptions::default().query("mineral_type", mineral),
        |opts, (arg, param)| match sub.get_one::<f64>(arg) {
            Some(v) => opts.query(param, v),
            None => opts,
        },
    )
}

pub fn fetch_all(client: &ApiClient) -> ApiResult<Vec<Task>> {
    client
        .get("/tasks/all")
        .decode::<TaskList>()
        .map(|l| l.tasks.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    #[serde(default)]
    task: Task,
}

pub fn fetch_one(client: &ApiClient, id: &str) -> ApiResult<Task> {
    client
        .get(&format!("/tasks/status/{}", id))
        .decode::<TaskEnvelope>()
        .map(|e| e.task)
}

/// Creation endpoints take their parameters in the query string, not the body.
pub fn create(client: &ApiClient, endpoint: &str, opts: &RequestOptions) -> ApiResult<TaskCreated> {
    client.post_with(endpoint, &Value::Null, opts).decode()
}

/// `key=value` sends a string; `key:=value` sends the value as raw JSON,
/// e.g. `weight_kg:=10` or `verbose:=true`.
pub fn parse_param(s: &str) -> Result<(String, Value)> {
    let bad = || anyhow::anyhow!("Parameter must look like key=value or key:=json (got '{}')", s);
    let (key, value) = s.split_once('=').ok_or_else(bad)?;
    let (key, value) = match key.strip_suffix(':') {
        Some(k) => (
            k,
            serde_json::from_str::<Value>(value)
                .map_err(|e| anyhow::anyhow!("Parameter '{}' is not valid JSON: {}", k, e))?,
        ),
        None => (key, Value::String(value.to_string())),
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(bad());
    }
    Ok((key.to_string(), value))
}

/// Generic creation endpoint; the only way to start the analysis, verification
/// and report task types.
pub fn create_task(
    client: &ApiClient,
    task_type: &str,
    description: &str,
    parameters: Map<String, Value>,
) -> ApiResult<TaskCreated> {
    let body = json!({
        "type": task_type,
        "description": description,
        "parameters": parameters,
    });
    client.post("/tasks/create", &body).decode()
}

fn report_created(res: ApiResult<TaskCreated>) {
    match res {
        ApiResult::Success(t) => {
            notify_success(t.message.as_deref().unwrap_or("Task created"));
            println!("{}", t.task_id.as_deref().unwrap_or("-"));
        }
        ApiResult::Failure { error, .. } => notify_error(&format!("Could not create task: {}", error)),
    }
}

/// Status column: a spinner frame while processing, a fixed glyph otherwise.
pub fn indicator(status: Option<TaskStatus>, frame: u64) -> (&'static str, Color) {
    match status {
        Some(TaskStatus::Processing) => (SPINNER[(frame % SPINNER.len() as u64) as usize], Color::Blue),
        Some(TaskStatus::Completed) => ("✔", Color::Green),
        Some(TaskStatus::Failed) => ("✖", Color::Red),
        _ => ("⏱", Color::Yellow),
    }
}

pub fn status_label(status: Option<TaskStatus>) -> &'static str {
    match status {
        Some(TaskStatus::Processing) => "processing",
        Some(TaskStatus::Completed) => "completed",
        Some(TaskStatus::Failed) => "failed",
        _ => "pending",
    }
}

pub fn tasks_table(tasks: &[Task], frame: u64) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(vec!["", "ID", "Type", "Description", "Status"]);
    for task in tasks {
        let (glyph, color) = indicator(task.status, frame);
        t.add_row(vec![
            Cell::new(glyph).fg(color),
            Cell::new(fmt_opt(task.id.as_deref())),
            Cell::new(fmt_opt(task.r#type.as_deref())),
            Cell::new(fmt_opt(task.description.as_deref())),
            Cell::new(status_label(task.status)),
        ]);
    }
    t
}

/// Detail panel. The result is only shown once the task has settled.
pub fn render_detail(task: &Task, frame: u64) -> String {
    let (glyph, _) = indicator(task.status, frame);
    let mut out = format!(
        "{} {} [{}]\n{}\n",
        glyph,
        fmt_opt(task.id.as_deref()),
        status_label(task.status),
        fmt_opt(task.description.as_deref())
    );
    for (label, v) in [
        ("Created", &task.created_at),
        ("Started", &task.started_at),
        ("Completed", &task.completed_at),
    ] {
        if let Some(v) = v {
            out.push_str(&format!("{}: {}\n", label, v));
        }
    }
    if let Some(params) = &task.parameters {
        out.push_str(&format!("Parameters: {}\n", params));
    }
    match task.status {
        Some(TaskStatus::Completed) => {
            if let Some(r) = &task.result {
                let pretty = serde_json::to_string_pretty(r).unwrap_or_else(|_| r.to_string());
                out.push_str(&format!("Result:\n{}\n", pretty));
            }
        }
        Some(TaskStatus::Failed) => {
            out.push_str(&format!("Error: {}\n", fmt_opt(task.error.as_deref())));
        }
        _ => {}
    }
    out
}

fn list(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let res = fetch_all(client);
    let (json_flag, jsonl_flag) = (sub.get_flag("json"), sub.get_flag("jsonl"));
    if json_flag || jsonl_flag {
        if let Some(error) = res.error() {
            notify_error(&format!("Could not load tasks: {}", error));
        }
        maybe_print_json(json_flag, jsonl_flag, &json_payload(&res))?;
        return Ok(());
    }
    print_list(res, 0);
    Ok(())
}

/// The task array on success, the `{success:false, error, details}` shape on
/// failure.
pub fn json_payload(res: &ApiResult<Vec<Task>>) -> Value {
    match res {
        ApiResult::Success(tasks) => serde_json::to_value(tasks).unwrap_or(Value::Null),
        ApiResult::Failure { .. } => res.to_json(),
    }
}

fn list_once(client: &ApiClient, frame: u64) {
    print_list(fetch_all(client), frame);
}

fn print_list(res: ApiResult<Vec<Task>>, frame: u64) {
    match res {
        ApiResult::Success(tasks) if tasks.is_empty() => println!("No tasks."),
        ApiResult::Success(tasks) => println!("{}", tasks_table(&tasks, frame)),
        ApiResult::Failure { error, .. } => notify_error(&format!("Could not load tasks: {}", error)),
    }
}

fn show(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let res = fetch_one(client, id);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &res.to_json())? {
        return Ok(());
    }
    match res {
        ApiResult::Success(task) => print!("{}", render_detail(&task, 0)),
        ApiResult::Failure { error, .. } => notify_error(&format!("Could not load task {}: {}", id, error)),
    }
    Ok(())
}

/// Whether another refresh is needed after seeing `res`. A failed refresh
/// keeps polling.
pub fn keep_polling(res: &ApiResult<Vec<Task>>) -> bool {
    match res {
        ApiResult::Success(tasks) => tasks.iter().any(|t| TaskStatus::is_active(t.status)),
        ApiResult::Failure { .. } => true,
    }
}

/// Re-lists tasks on the poll interval until none is pending or processing.
pub fn watch(client: &ApiClient, cfg: &Config, max_ticks: Option<u64>) -> Result<()> {
    let client = client.clone();
    let handle = poller::spawn("tasks", cfg.poll_interval, move |n| {
        let res = fetch_all(&client);
        let again = keep_polling(&res);
        print_list(res, n);
        match max_ticks {
            Some(max) if n + 1 >= max => ControlFlow::Break(()),
            _ if !again => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    })?;
    let ticks = handle.wait();
    tracing::debug!(ticks, "task watch finished");
    Ok(())
}
