// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Interactive dashboard. One [`Session`] lives for the whole loop; a
//! background health poll keeps the prompt's connection marker current and
//! is cancelled when the loop ends.

use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::api::{ApiClient, ApiResult};
use crate::cli;
use crate::commands::{self, buyers, chat, dashboard, health, prices, search};
use crate::config::Config;
use crate::models::Buyer;
use crate::poller;
use crate::session::{Session, View};
use crate::utils::notify_error;

const HELP: &str = "\
Commands:
  go <view>        switch view (dashboard, search, buyers, prices, budget, chat, ai, tasks, sunat)
  views            list views
  status           backend connection
  history          recent searches
  filter <term>    filter the loaded buyers (buyers view)
  help             this text
  exit             leave the shell
Anything else is run as the current view's subcommand, e.g. in `tasks`: list
In the chat view plain text is sent to the assistant.
";

/// Outcome of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

pub fn handle(client: &ApiClient, cfg: &Config) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run(client, cfg, stdin.lock(), stdout.lock())
}

pub fn run<R: BufRead, W: Write>(client: &ApiClient, cfg: &Config, input: R, mut out: W) -> Result<()> {
    let connected = Arc::new(AtomicBool::new(false));
    let marker = connected.clone();
    let poll_client = client.clone();
    let health_poll = poller::spawn("health", cfg.health_interval, move |_| {
        marker.store(health::check(&poll_client).is_success(), Ordering::Relaxed);
        ControlFlow::Continue(())
    })?;

    let mut session = Session::default();
    writeln!(out, "mineraldesk shell. Type `help` for commands.")?;
    enter(client, &mut session, View::Dashboard, &mut out)?;

    prompt(&session, &connected, &mut out)?;
    for line in input.lines() {
        let line = line?;
        if step(client, cfg, &mut session, line.trim(), &mut out)? == Step::Exit {
            break;
        }
        prompt(&session, &connected, &mut out)?;
    }

    let ticks = health_poll.cancel();
    tracing::debug!(ticks, "shell closed");
    Ok(())
}

fn prompt<W: Write>(session: &Session, connected: &AtomicBool, out: &mut W) -> Result<()> {
    let up = connected.load(Ordering::Relaxed);
    let view = session.view().map(|v| v.name()).unwrap_or("-");
    write!(out, "{} {}> ", if up { "●" } else { "○" }, view)?;
    out.flush()?;
    Ok(())
}

/// Handles one line of input.
pub fn step<W: Write>(
    client: &ApiClient,
    cfg: &Config,
    session: &mut Session,
    line: &str,
    out: &mut W,
) -> Result<Step> {
    if line.is_empty() {
        return Ok(Step::Continue);
    }
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    match head {
        "exit" | "quit" => return Ok(Step::Exit),
        "help" => write!(out, "{}", HELP)?,
        "views" => {
            for v in View::ALL {
                writeln!(out, "  {}", v)?;
            }
        }
        "status" => writeln!(out, "{}", health::status_line(client.base_url(), &health::check(client)))?,
        "history" => write!(out, "{}", search::render_history(&session.search_history))?,
        "go" => match View::parse(rest) {
            Some(v) => enter(client, session, v, out)?,
            None => notify_error(&format!("Unknown view '{}'", rest.trim())),
        },
        "filter" if session.view() == Some(View::Buyers) => {
            let cached = session.buyers.as_deref().unwrap_or_default();
            let shown = buyers::filter_buyers(cached, rest.trim());
            write_buyers(&shown, cached.len(), out)?;
        }
        _ if session.view() == Some(View::Chat) => {
            if let Some(reply) = chat::send(client, &mut session.chat, line, &cfg.chat_context) {
                writeln!(out, "{}", chat::render_message(reply))?;
            }
        }
        _ => run_view_command(client, cfg, session, line)?,
    }
    Ok(Step::Continue)
}

/// Navigates and renders the landing screen of `view`.
fn enter<W: Write>(client: &ApiClient, session: &mut Session, view: View, out: &mut W) -> Result<()> {
    session.navigate(view);
    match view {
        View::Dashboard => write!(out, "{}", dashboard::render(&dashboard::load(client)))?,
        View::Buyers => {
            if session.buyers.is_none() {
                session.buyers = Some(buyers::fetch(client, 0, 100).into_data().unwrap_or_default());
            }
            let cached = session.buyers.as_deref().unwrap_or_default();
            let all: Vec<&Buyer> = cached.iter().collect();
            write_buyers(&all, cached.len(), out)?;
        }
        View::Prices => {
            if session.prices.is_none() {
                match prices::fetch(client) {
                    ApiResult::Success(b) => session.prices = Some(b),
                    ApiResult::Failure { error, .. } => {
                        notify_error(&format!("Could not load quotes: {}", error))
                    }
                }
            }
            if let Some(board) = &session.prices {
                write!(out, "{}", prices::render_board(board))?;
            }
        }
        View::Search => write!(out, "{}", search::render_history(&session.search_history))?,
        View::Chat => {
            for m in session.chat.messages() {
                writeln!(out, "{}", chat::render_message(m))?;
            }
            write!(out, "{}", chat::render_quick_actions())?;
        }
        View::Budget | View::Ai | View::Tasks | View::Sunat => {
            writeln!(out, "{} view. Type a `{}` subcommand, or `help`.", view, view)?;
        }
    }
    Ok(())
}

fn write_buyers<W: Write>(shown: &[&Buyer], total: usize, out: &mut W) -> Result<()> {
    if shown.is_empty() {
        writeln!(out, "No buyers found.")?;
    } else {
        writeln!(out, "{}", buyers::buyers_table(shown))?;
        writeln!(out, "{} of {} buyers", shown.len(), total)?;
    }
    Ok(())
}

fn run_view_command(client: &ApiClient, cfg: &Config, session: &mut Session, line: &str) -> Result<()> {
    let Some(view) = session.view() else {
        return Ok(());
    };
    let mut argv = vec!["mineraldesk".to_string(), view.name().to_string()];
    argv.extend(split_words(line));
    match cli::build_cli().try_get_matches_from(argv) {
        Ok(m) => {
            // Local input errors are reported and the shell carries on.
            if let Err(e) = commands::dispatch(client, cfg, &m, session) {
                notify_error(&format!("{:#}", e));
            }
        }
        Err(e) => notify_error(e.to_string().trim_end()),
    }
    Ok(())
}

/// Whitespace split honouring double quotes, so `--state "La Libertad"` works.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut in_word = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            c => {
                cur.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(cur);
    }
    words
}
