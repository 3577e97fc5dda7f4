// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

use crate::commands::tasks::TASK_TYPES;

const MINERALS: [&str; 3] = ["oro", "plata", "cobre"];

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON instead of a table"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON document per line"),
    )
}

fn mineral_arg() -> Arg {
    Arg::new("mineral")
        .long("mineral")
        .short('m')
        .required(true)
        .value_parser(MINERALS)
}

fn mineral_pos() -> Arg {
    Arg::new("mineral").required(true).value_parser(MINERALS)
}

fn num(name: &'static str, long: &'static str, default: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .default_value(default)
        .value_parser(value_parser!(f64))
        .help(help)
}

pub fn build_cli() -> Command {
    Command::new("mineraldesk")
        .about("Terminal dashboard for the mineral-agent backend")
        .version(clap::crate_version!())
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL (overrides MINERALDESK_API_URL)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log requests to stderr (-vv for trace)"),
        )
        .subcommand(
            Command::new("health")
                .about("Check connectivity to the backend")
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .action(ArgAction::SetTrue)
                        .help("Keep checking on the health interval"),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_parser(value_parser!(u64))
                        .help("Stop watching after this many checks"),
                ),
        )
        .subcommand(json_flags(
            Command::new("dashboard").about("Buyer counts and headline metal prices"),
        ))
        .subcommand(
            Command::new("buyers")
                .about("Registered buyers")
                .subcommand(
                    json_flags(Command::new("list").about("List buyers"))
                        .arg(
                            Arg::new("skip")
                                .long("skip")
                                .default_value("0")
                                .value_parser(value_parser!(u64)),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .default_value("100")
                                .value_parser(value_parser!(u64)),
                        )
                        .arg(
                            Arg::new("filter")
                                .long("filter")
                                .short('f')
                                .help("Case-insensitive match on name, or substring of RUC"),
                        )
                        .arg(
                            Arg::new("csv")
                                .long("csv")
                                .help("Also write the listed buyers to this CSV file"),
                        ),
                )
                .subcommand(
                    json_flags(Command::new("show").about("Show one buyer")).arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("verify")
                        .about("Ask the backend to verify a buyer against SUNAT")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("verified").about("List verified buyers"),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Register a buyer")
                        .arg(Arg::new("ruc").long("ruc").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("address").long("address").required(true))
                        .arg(Arg::new("phone").long("phone").required(true))
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("website").long("website"))
                        .arg(
                            Arg::new("classification")
                                .long("classification")
                                .default_value("comprador"),
                        ),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search buyers for a mineral")
                .arg(
                    Arg::new("mineral")
                        .long("mineral")
                        .short('m')
                        .required(true)
                        .value_parser(["oro", "plata", "cobre", "todos"]),
                )
                .arg(Arg::new("city").long("city").default_value("Trujillo"))
                .arg(Arg::new("state").long("state").default_value("La Libertad")),
        )
        .subcommand(
            json_flags(Command::new("prices").about("Commodity and FX quotes"))
                .subcommand(json_flags(Command::new("show").about("Latest quotes")))
                .subcommand(Command::new("refresh").about("Ask the backend to fetch new quotes")),
        )
        .subcommand(
            Command::new("budget").about("Purchase/sale budgets").subcommand(
                Command::new("generate")
                    .about("Have the backend compute a budget")
                    .arg(
                        Arg::new("buyer")
                            .long("buyer")
                            .value_parser(value_parser!(i64))
                            .help("Buyer id"),
                    )
                    .arg(
                        Arg::new("mineral")
                            .long("mineral")
                            .short('m')
                            .value_parser(MINERALS),
                    )
                    .arg(
                        Arg::new("quantity")
                            .long("quantity")
                            .value_parser(value_parser!(f64))
                            .help("Quantity in kg"),
                    )
                    .arg(
                        Arg::new("law")
                            .long("law")
                            .value_parser(value_parser!(f64))
                            .help("Law (purity) percentage"),
                    )
                    .arg(num("recovery", "recovery", "95", "Recovery percentage"))
                    .arg(num("freight", "freight", "0", "Freight cost in PEN"))
                    .arg(num("discounts", "discounts", "0", "Discount percentage"))
                    .arg(num("taxes", "taxes", "18", "Tax (IGV) percentage"))
                    .arg(
                        Arg::new("out")
                            .long("out")
                            .short('o')
                            .help("Save the budget to a .json or .csv file"),
                    )
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue),
                    ),
            ),
        )
        .subcommand(
            Command::new("chat")
                .about("Talk to the AI assistant (interactive without a subcommand)")
                .subcommand(
                    Command::new("ask")
                        .about("Ask one question")
                        .arg(
                            Arg::new("message")
                                .required(true)
                                .num_args(1..)
                                .trailing_var_arg(true),
                        )
                        .arg(Arg::new("context").long("context")),
                )
                .subcommand(
                    Command::new("quick")
                        .about("List quick prompts, or send one by number")
                        .arg(Arg::new("n").value_parser(value_parser!(usize))),
                )
                .subcommand(
                    Command::new("template")
                        .about("Draft an outreach message")
                        .subcommand(
                            Command::new("email")
                                .arg(Arg::new("buyer-name").long("buyer-name").required(true))
                                .arg(mineral_arg())
                                .arg(
                                    Arg::new("quantity")
                                        .long("quantity")
                                        .required(true)
                                        .value_parser(value_parser!(f64)),
                                ),
                        )
                        .subcommand(
                            Command::new("whatsapp")
                                .arg(Arg::new("buyer-name").long("buyer-name").required(true))
                                .arg(mineral_arg()),
                        ),
                ),
        )
        .subcommand(
            Command::new("ai")
                .about("AI-driven market analyses")
                .subcommand(
                    json_flags(Command::new("providers").about("Search providers"))
                        .arg(mineral_pos())
                        .arg(Arg::new("location").long("location").default_value("Trujillo")),
                )
                .subcommand(
                    json_flags(Command::new("prices").about("Analyze prices")).arg(mineral_pos()),
                )
                .subcommand(
                    json_flags(Command::new("report").about("Generate a report")).arg(mineral_pos()),
                ),
        )
        .subcommand(
            Command::new("tasks")
                .about("Asynchronous backend tasks")
                .subcommand(json_flags(Command::new("list").about("List all tasks")))
                .subcommand(
                    json_flags(Command::new("show").about("Show one task"))
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    Command::new("watch")
                        .about("Refresh the task list until nothing is pending")
                        .arg(
                            Arg::new("max-ticks")
                                .long("max-ticks")
                                .value_parser(value_parser!(u64)),
                        ),
                )
                .subcommand(
                    Command::new("search-buyers")
                        .about("Start a buyer search task")
                        .arg(mineral_arg())
                        .arg(Arg::new("location").long("location").default_value("Trujillo")),
                )
                .subcommand(
                    Command::new("budget-buy")
                        .about("Start a purchase budget task")
                        .arg(mineral_arg())
                        .arg(num("weight", "weight", "1", "Weight in kg"))
                        .arg(num("law", "law", "100", "Law percentage"))
                        .arg(num("recovery", "recovery", "95", "Recovery percentage"))
                        .arg(num("freight", "freight", "0", "Freight cost"))
                        .arg(num("commission", "commission", "3", "Commission percentage"))
                        .arg(num("price", "price", "2000", "Price in USD/oz"))
                        .arg(num("fx", "fx", "3.70", "USD/PEN rate")),
                )
                .subcommand(
                    Command::new("budget-sell")
                        .about("Start a sale budget task")
                        .arg(mineral_arg())
                        .arg(num("weight", "weight", "1", "Weight in kg"))
                        .arg(num("law", "law", "100", "Law percentage"))
                        .arg(num("recovery", "recovery", "95", "Recovery percentage"))
                        .arg(num("transport", "transport", "100", "Transport cost"))
                        .arg(num(
                            "intermediary",
                            "intermediary",
                            "2",
                            "Intermediary percentage",
                        ))
                        .arg(num("taxes", "taxes", "5", "Tax percentage"))
                        .arg(num("price", "price", "2000", "Price in USD/oz"))
                        .arg(num("fx", "fx", "3.70", "USD/PEN rate")),
                )
                .subcommand(
                    Command::new("create")
                        .about("Start a task of any type")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(TASK_TYPES),
                        )
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(
                            Arg::new("param")
                                .long("param")
                                .action(ArgAction::Append)
                                .help("key=value, or key:=json for numbers and booleans"),
                        ),
                ),
        )
        .subcommand(
            Command::new("sunat")
                .about("Tax registry lookups")
                .subcommand(
                    json_flags(Command::new("ruc").about("Look up a company by RUC (11 digits)"))
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    json_flags(Command::new("dni").about("Look up a person by DNI (8 digits)"))
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    json_flags(Command::new("verify").about("Verify a company by RUC"))
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(Command::new("shell").about("Interactive dashboard"))
        .subcommand(Command::new("doctor").about("Show configuration and check the backend"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn budget_defaults_apply() {
        let m = build_cli().get_matches_from([
            "mineraldesk",
            "budget",
            "generate",
            "--buyer",
            "1",
            "--mineral",
            "oro",
            "--quantity",
            "2",
            "--law",
            "95",
        ]);
        let (_, b) = m.subcommand().unwrap();
        let (_, g) = b.subcommand().unwrap();
        assert_eq!(g.get_one::<f64>("taxes"), Some(&18.0));
        assert_eq!(g.get_one::<f64>("recovery"), Some(&95.0));
    }

    #[test]
    fn global_api_url_reaches_subcommands() {
        let m = build_cli().get_matches_from([
            "mineraldesk",
            "health",
            "--api-url",
            "http://example:9000",
        ]);
        assert_eq!(
            m.get_one::<String>("api-url").map(String::as_str),
            Some("http://example:9000")
        );
    }
}
