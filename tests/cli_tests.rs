// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use mineraldesk::cli;
use mineraldesk::commands::shell::split_words;

#[test]
fn search_requires_known_mineral() {
    assert!(cli::build_cli()
        .try_get_matches_from(["mineraldesk", "search", "--mineral", "zinc"])
        .is_err());
    let m = cli::build_cli()
        .try_get_matches_from(["mineraldesk", "search", "--mineral", "todos"])
        .unwrap();
    let (_, s) = m.subcommand().unwrap();
    assert_eq!(s.get_one::<String>("city").map(String::as_str), Some("Trujillo"));
    assert_eq!(s.get_one::<String>("state").map(String::as_str), Some("La Libertad"));
}

#[test]
fn task_budget_defaults() {
    let m = cli::build_cli()
        .try_get_matches_from(["mineraldesk", "tasks", "budget-sell", "--mineral", "oro"])
        .unwrap();
    let (_, t) = m.subcommand().unwrap();
    let (_, s) = t.subcommand().unwrap();
    assert_eq!(s.get_one::<f64>("transport"), Some(&100.0));
    assert_eq!(s.get_one::<f64>("fx"), Some(&3.70));
}

#[test]
fn chat_ask_joins_trailing_words() {
    let m = cli::build_cli()
        .try_get_matches_from(["mineraldesk", "chat", "ask", "precio", "del", "oro"])
        .unwrap();
    let (_, c) = m.subcommand().unwrap();
    let (_, a) = c.subcommand().unwrap();
    let words: Vec<&String> = a.get_many::<String>("message").unwrap().collect();
    assert_eq!(words.len(), 3);
}

#[test]
fn shell_lines_parse_like_argv() {
    let mut argv = vec!["mineraldesk".to_string(), "search".to_string()];
    argv.extend(split_words(r#"--mineral cobre --city "Santiago de Chuco""#));
    let m = cli::build_cli().try_get_matches_from(argv).unwrap();
    let (_, s) = m.subcommand().unwrap();
    assert_eq!(s.get_one::<String>("city").map(String::as_str), Some("Santiago de Chuco"));
}

#[test]
fn bare_prices_accepts_json_flags() {
    let m = cli::build_cli()
        .try_get_matches_from(["mineraldesk", "prices", "--json"])
        .unwrap();
    let (name, p) = m.subcommand().unwrap();
    assert_eq!(name, "prices");
    assert!(p.subcommand().is_none());
    assert!(p.get_flag("json"));
    assert!(cli::build_cli()
        .try_get_matches_from(["mineraldesk", "prices", "--jsonl"])
        .is_ok());
}

#[test]
fn task_create_collects_params_and_checks_type() {
    let m = cli::build_cli()
        .try_get_matches_from([
            "mineraldesk",
            "tasks",
            "create",
            "--type",
            "verify_company",
            "--description",
            "Verificar Minera Norte",
            "--param",
            "ruc=20123456789",
            "--param",
            "deep:=true",
        ])
        .unwrap();
    let (_, t) = m.subcommand().unwrap();
    let (_, c) = t.subcommand().unwrap();
    let params: Vec<&String> = c.get_many::<String>("param").unwrap().collect();
    assert_eq!(params, ["ruc=20123456789", "deep:=true"]);

    assert!(cli::build_cli()
        .try_get_matches_from([
            "mineraldesk",
            "tasks",
            "create",
            "--type",
            "mine_everything",
            "--description",
            "x",
        ])
        .is_err());
    assert!(cli::build_cli()
        .try_get_matches_from(["mineraldesk", "tasks", "create", "--type", "generate_report"])
        .is_err());
}
