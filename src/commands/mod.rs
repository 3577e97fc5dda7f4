// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod ai;
pub mod budgets;
pub mod buyers;
pub mod chat;
pub mod dashboard;
pub mod doctor;
pub mod exporter;
pub mod health;
pub mod prices;
pub mod search;
pub mod shell;
pub mod sunat;
pub mod tasks;

use anyhow::Result;

use crate::api::ApiClient;
use crate::cli;
use crate::config::Config;
use crate::session::Session;

/// Routes parsed top-level matches to a view handler.
pub fn dispatch(
    client: &ApiClient,
    cfg: &Config,
    matches: &clap::ArgMatches,
    session: &mut Session,
) -> Result<()> {
    match matches.subcommand() {
        Some(("health", sub)) => health::handle(client, cfg, sub)?,
        Some(("dashboard", sub)) => dashboard::handle(client, sub)?,
        Some(("buyers", sub)) => buyers::handle(client, sub)?,
        Some(("search", sub)) => search::handle(client, sub, &mut session.search_history)?,
        Some(("prices", sub)) => prices::handle(client, sub)?,
        Some(("budget", sub)) => budgets::handle(client, sub)?,
        Some(("chat", sub)) => chat::handle(client, cfg, sub)?,
        Some(("ai", sub)) => ai::handle(client, sub)?,
        Some(("tasks", sub)) => tasks::handle(client, cfg, sub)?,
        Some(("sunat", sub)) => sunat::handle(client, sub)?,
        Some(("shell", _)) => shell::handle(client, cfg)?,
        Some(("doctor", _)) => doctor::handle(client, cfg)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
