//! group-ledger CLI
//!
//! Split expenses and settle group balances from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Balances and suggested payments for a group snapshot
//! group-ledger balances --input group.json
//!
//! # Output as JSON
//! group-ledger balances --input group.json --format json
//!
//! # Preview how an amount would be split
//! group-ledger split --amount 1000 --policy percent --participants asha:33.33,ravi:66.67
//!
//! # Generate a random group for testing
//! group-ledger generate --members 6 --expenses 30
//! ```

use group_ledger::core::money::Money;
use group_ledger::core::participant::ParticipantId;
use group_ledger::simulation::generator::{generate_random_group, GroupConfig};
use group_ledger::split::{allocate_shares, SplitPolicy};
use group_ledger::store::{InMemoryLedger, LedgerSnapshot};
use log::{debug, error};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"group-ledger — shared-expense splitting and settlement

USAGE:
    group-ledger <COMMAND> [OPTIONS]

COMMANDS:
    balances    Compute net balances and suggested payments for a group
    split       Show how an amount is divided under a split policy
    generate    Generate a random group snapshot (for testing)
    help        Show this message

OPTIONS (balances):
    --input <FILE>        Path to JSON group snapshot
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (split):
    --amount <MINOR>      Amount in minor units (e.g. paise)
    --policy <POLICY>     equal, exact or percent
    --participants <LIST> equal:   asha,ravi,meera
                          exact:   asha:400,ravi:600
                          percent: asha:33.33,ravi:66.67
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (generate):
    --members <N>         Number of members (default: 6)
    --expenses <N>        Number of expenses (default: 20)
    --settlements <N>     Number of settlements (default: 4)
    --output <FILE>       Write to file instead of stdout

Set RUST_LOG=debug for diagnostic output.

EXAMPLES:
    group-ledger balances --input group.json
    group-ledger split --amount 999 --policy percent --participants a:50,b:50
    group-ledger generate --members 10 --expenses 100 --output group.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Pull the value following a flag, or exit with `hint`.
fn flag_value(args: &[String], i: &mut usize, hint: &str) -> String {
    *i += 1;
    args.get(*i).cloned().unwrap_or_else(|| fail(hint))
}

fn parse_format(value: String) -> String {
    if value == "text" || value == "json" {
        value
    } else {
        fail(format!("unknown format '{}': expected text or json", value))
    }
}

fn load_snapshot(path: &str) -> LedgerSnapshot {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));

    LedgerSnapshot::from_json(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "name": "Goa trip",
  "members": [{{ "user_id": "asha" }}, {{ "user_id": "ravi" }}],
  "expenses": [
    {{ "description": "Dinner", "amount": 1500, "paid_by": "asha",
      "split": {{ "type": "EQUAL", "participants": ["asha", "ravi"] }} }}
  ],
  "settlements": [{{ "from": "ravi", "to": "asha", "amount": 200 }}]
}}"#
        );
        process::exit(1);
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(format!("serializing output: {}", e)))
}

fn cmd_balances(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input_path = Some(flag_value(args, &mut i, "--input requires a file path")),
            "--format" => {
                format = parse_format(flag_value(args, &mut i, "--format requires 'text' or 'json'"))
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let snapshot = load_snapshot(&path);

    let mut store = InMemoryLedger::new();
    let group = snapshot
        .load_into(&mut store)
        .unwrap_or_else(|e| fail(format!("loading '{}': {}", path, e)));
    debug!("loaded {} expenses from {}", snapshot.expenses.len(), path);

    // load_into guarantees at least one member
    let viewer = &snapshot.members[0].user_id;
    let balances = store
        .group_balances(viewer, &group)
        .unwrap_or_else(|e| fail(e));

    if format == "json" {
        println!("{}", to_json(&balances));
    } else {
        println!("Group: {}\n", snapshot.name);
        println!("{}", balances);
        println!("Outstanding: {}", balances.total_outstanding().format_major(2));
    }
}

fn parse_policy(policy: &str, list: &str) -> SplitPolicy {
    let entries = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match policy {
        "equal" => SplitPolicy::Equal(entries.map(ParticipantId::new).collect()),
        "exact" => SplitPolicy::Exact(
            entries
                .map(|e| {
                    let (id, amount) = split_entry(e);
                    let amount: i64 = amount
                        .parse()
                        .unwrap_or_else(|err| fail(format!("invalid share '{}': {}", amount, err)));
                    (ParticipantId::new(id), Money::new(amount))
                })
                .collect(),
        ),
        "percent" => SplitPolicy::Percent(
            entries
                .map(|e| {
                    let (id, pct) = split_entry(e);
                    let pct: Decimal = pct
                        .parse()
                        .unwrap_or_else(|err| fail(format!("invalid percent '{}': {}", pct, err)));
                    (ParticipantId::new(id), pct)
                })
                .collect(),
        ),
        other => fail(format!("unknown policy '{}': expected equal, exact or percent", other)),
    }
}

fn split_entry(entry: &str) -> (&str, &str) {
    entry
        .split_once(':')
        .unwrap_or_else(|| fail(format!("expected <id>:<value>, got '{}'", entry)))
}

fn cmd_split(args: &[String]) {
    let mut amount: Option<i64> = None;
    let mut policy = None;
    let mut participants = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--amount" => {
                let raw = flag_value(args, &mut i, "--amount requires a number");
                amount = Some(
                    raw.parse()
                        .unwrap_or_else(|e| fail(format!("invalid amount '{}': {}", raw, e))),
                );
            }
            "--policy" => policy = Some(flag_value(args, &mut i, "--policy requires a value")),
            "--participants" => {
                participants = Some(flag_value(args, &mut i, "--participants requires a list"))
            }
            "--format" => {
                format = parse_format(flag_value(args, &mut i, "--format requires 'text' or 'json'"))
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let amount = Money::new(amount.unwrap_or_else(|| fail("--amount <MINOR> is required")));
    let policy = policy.unwrap_or_else(|| "equal".to_string());
    let list = participants.unwrap_or_else(|| fail("--participants <LIST> is required"));
    let policy = parse_policy(&policy.to_lowercase(), &list);

    let shares = allocate_shares(amount, &policy).unwrap_or_else(|e| fail(e));

    if format == "json" {
        println!("{}", to_json(&shares));
    } else {
        println!("{} split of {}:", policy.kind(), amount.format_major(2));
        for s in &shares {
            println!("  {:<24} {:>12}", s.user_id, s.share.format_major(2));
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                config.member_count = flag_value(args, &mut i, "--members requires a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--members requires a number"));
            }
            "--expenses" => {
                config.expense_count = flag_value(args, &mut i, "--expenses requires a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--expenses requires a number"));
            }
            "--settlements" => {
                config.settlement_count = flag_value(args, &mut i, "--settlements requires a number")
                    .parse()
                    .unwrap_or_else(|_| fail("--settlements requires a number"));
            }
            "--output" => output_path = Some(flag_value(args, &mut i, "--output requires a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let snapshot = generate_random_group(&config);
    let json = snapshot
        .to_json()
        .unwrap_or_else(|e| fail(format!("serializing snapshot: {}", e)));

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("writing to '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} members → {}",
            snapshot.expenses.len(),
            snapshot.members.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "split" => cmd_split(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
