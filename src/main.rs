// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use mineraldesk::api::ApiClient;
use mineraldesk::config::Config;
use mineraldesk::session::Session;
use mineraldesk::{cli, commands};

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "mineraldesk=debug,warn",
        _ => "mineraldesk=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    init_tracing(matches.get_count("verbose"));

    let cfg = Config::load(matches.get_one::<String>("api-url").map(String::as_str))?;
    let client = ApiClient::from_config(&cfg)?;
    let mut session = Session::default();

    commands::dispatch(&client, &cfg, &matches, &mut session)
}
