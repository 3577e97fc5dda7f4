// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::{BufRead, Write};

use anyhow::Result;
use serde_json::{Value, json};

use crate::api::{ApiClient, ApiResult};
use crate::config::Config;
use crate::models::{ChatMessage, Mineral, Sender};
use crate::session::ChatLog;
use crate::utils::notify_error;

pub const FALLBACK_REPLY: &str = "I couldn't process your question";

pub const QUICK_ACTIONS: [&str; 4] = [
    "Analyze the gold market in Peru",
    "Who are the best mineral buyers in Trujillo?",
    "Write an email template to contact buyers",
    "Write a professional WhatsApp message",
];

pub fn handle(client: &ApiClient, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let mut log = ChatLog::default();
    match m.subcommand() {
        Some(("ask", sub)) => {
            let message = sub
                .get_many::<String>("message")
                .unwrap()
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            let context = sub
                .get_one::<String>("context")
                .map(String::as_str)
                .unwrap_or(&cfg.chat_context);
            if let Some(reply) = send(client, &mut log, &message, context) {
                println!("{}", reply.text);
            }
        }
        Some(("quick", sub)) => match sub.get_one::<usize>("n") {
            Some(&n) => {
                let Some(prompt) = n.checked_sub(1).and_then(|i| QUICK_ACTIONS.get(i)) else {
                    anyhow::bail!("Quick prompt must be between 1 and {}", QUICK_ACTIONS.len());
                };
                println!("> {}", prompt);
                if let Some(reply) = send(client, &mut log, prompt, &cfg.chat_context) {
                    println!("{}", reply.text);
                }
            }
            None => print!("{}", render_quick_actions()),
        },
        Some(("template", sub)) => template(client, sub)?,
        _ => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            repl(
                client,
                &cfg.chat_context,
                &mut log,
                stdin.lock(),
                stdout.lock(),
            )?;
        }
    }
    Ok(())
}

/// Asks the assistant one question.
pub fn ask(client: &ApiClient, message: &str, context: &str) -> ApiResult<String> {
    client
        .post("/chat/ask", &json!({ "message": message, "context": context }))
        .map(|v| reply_text(&v))
}

pub fn reply_text(body: &Value) -> String {
    body.get("response")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

/// Appends the user message and, if the call succeeds, the bot reply. Blank
/// input is ignored. A failed call leaves only the user message in the log.
pub fn send<'a>(
    client: &ApiClient,
    log: &'a mut ChatLog,
    message: &str,
    context: &str,
) -> Option<&'a ChatMessage> {
    if message.trim().is_empty() {
        return None;
    }
    log.push(Sender::User, message);
    match ask(client, message, context) {
        ApiResult::Success(text) => Some(log.push(Sender::Bot, text)),
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Could not reach the assistant: {}", error));
            None
        }
    }
}

pub fn render_message(m: &ChatMessage) -> String {
    match m.sender {
        Sender::User => format!("you> {}", m.text),
        Sender::Bot => format!("bot> {}", m.text),
    }
}

pub fn render_quick_actions() -> String {
    QUICK_ACTIONS
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}\n", i + 1, p))
        .collect()
}

/// Line-oriented chat. `/quick N` sends a quick prompt, `/exit` or EOF ends.
pub fn repl<R: BufRead, W: Write>(
    client: &ApiClient,
    context: &str,
    log: &mut ChatLog,
    input: R,
    mut out: W,
) -> Result<()> {
    for m in log.messages() {
        writeln!(out, "{}", render_message(m))?;
    }
    write!(out, "{}", render_quick_actions())?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line == "/exit" || line == "/quit" {
            break;
        }
        let message = match line.strip_prefix("/quick") {
            Some(n) => match n.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(i) if i < QUICK_ACTIONS.len() => QUICK_ACTIONS[i],
                _ => {
                    notify_error("Unknown quick prompt");
                    continue;
                }
            },
            None => line,
        };
        if let Some(reply) = send(client, log, message, context) {
            writeln!(out, "{}", render_message(reply))?;
            out.flush()?;
        }
    }
    Ok(())
}

fn template(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    let (endpoint, body) = match m.subcommand() {
        Some(("email", sub)) => (
            "/chat/templates/email",
            json!({
                "buyer_name": sub.get_one::<String>("buyer-name").unwrap(),
                "mineral_type": mineral(sub)?,
                "quantity_kg": sub.get_one::<f64>("quantity").unwrap(),
            }),
        ),
        Some(("whatsapp", sub)) => (
            "/chat/templates/whatsapp",
            json!({
                "buyer_name": sub.get_one::<String>("buyer-name").unwrap(),
                "mineral_type": mineral(sub)?,
            }),
        ),
        _ => return Ok(()),
    };
    match client.post(endpoint, &body) {
        ApiResult::Success(v) => println!(
            "{}",
            v.get("template").and_then(Value::as_str).unwrap_or(FALLBACK_REPLY)
        ),
        ApiResult::Failure { error, .. } => {
            notify_error(&format!("Could not draft the template: {}", error));
        }
    }
    Ok(())
}

fn mineral(sub: &clap::ArgMatches) -> Result<&'static str> {
    let raw = sub.get_one::<String>("mineral").unwrap();
    Mineral::parse(raw)
        .map(|m| m.as_str())
        .ok_or_else(|| anyhow::anyhow!("Unknown mineral '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_response_uses_fallback() {
        assert_eq!(reply_text(&json!({"response": "Hola"})), "Hola");
        assert_eq!(reply_text(&json!({})), FALLBACK_REPLY);
        assert_eq!(reply_text(&json!({"response": null})), FALLBACK_REPLY);
    }

    #[test]
    fn quick_actions_are_numbered_from_one() {
        let out = render_quick_actions();
        assert!(out.starts_with("1. Analyze the gold market"));
        assert_eq!(out.lines().count(), 4);
    }
}
