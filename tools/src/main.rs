//! opsheet: headless runner for the open-positions sheet.
//!
//! Usage:
//!   opsheet --csv export.csv
//!   opsheet --csv export.csv --header-row 3 --fallback "Data Fecho=M" --json
//!   opsheet --csv export.csv --schema schema.json --group XP --item Ana

mod source;

use anyhow::{anyhow, Result};
use opsheet_core::{
    classify::{ClassificationPolicy, ClassificationSummary},
    config::SchemaConfig,
    drilldown::{OpenBook, Position},
    error::SchemaError,
    resolver::{resolve_schema, ResolvedMapping, ResolverOptions},
};
use std::collections::BTreeMap;
use std::env;

#[derive(serde::Serialize)]
struct Selection {
    group:     String,
    item:      String,
    positions: Vec<Position>,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    generated_at: String,
    source:       &'a str,
    header_row:   usize,
    mapping:      &'a ResolvedMapping,
    summary:      &'a ClassificationSummary,
    groups:       BTreeMap<String, Vec<String>>,
    selection:    Option<Selection>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(csv_path) = arg_value(&args, "--csv") else {
        eprintln!("Usage: opsheet --csv <file> [--header-row N] [--schema <json>]");
        eprintln!("               [--strict-blanks] [--no-partial] [--fallback FIELD=LETTER]");
        eprintln!("               [--group VALUE] [--item VALUE] [--json]");
        std::process::exit(2);
    };
    let header_row = parse_arg(&args, "--header-row", 1usize);
    let json = has_flag(&args, "--json");

    let mut config = match arg_value(&args, "--schema") {
        Some(path) => SchemaConfig::load(path)?,
        None => SchemaConfig::long_short(),
    };
    if has_flag(&args, "--strict-blanks") {
        config.policy = ClassificationPolicy::conservative();
    }
    if has_flag(&args, "--no-partial") {
        config.resolver = ResolverOptions::basic();
    }
    for spec in arg_values(&args, "--fallback") {
        let (field, letter) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("--fallback expects FIELD=LETTER, got '{spec}'"))?;
        config.override_fallback(field.trim(), letter)?;
    }

    let table = source::load_csv(csv_path, header_row)?;

    let mapping = match resolve_schema(table.headers(), &config) {
        Ok(mapping) => mapping,
        Err(e @ SchemaError::ColumnNotFound { .. }) => {
            eprintln!("{e}");
            eprintln!("Review the column names in the sheet or pass --fallback FIELD=LETTER.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let book = OpenBook::build(&table, &mapping, &config)?;

    let group = arg_value(&args, "--group")
        .map(str::to_string)
        .or_else(|| book.group_values().into_iter().next());
    let selection = group.and_then(|group| {
        let item = arg_value(&args, "--item")
            .map(str::to_string)
            .or_else(|| book.items_for(&group).into_iter().next())?;
        let positions = book.positions(&group, &item);
        Some(Selection { group, item, positions })
    });

    if json {
        let report = Report {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source: csv_path,
            header_row,
            mapping: &mapping,
            summary: book.summary(),
            groups: book.groups(),
            selection,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(csv_path, &mapping, &book, selection.as_ref());
    }
    Ok(())
}

fn print_summary(
    csv_path: &str,
    mapping: &ResolvedMapping,
    book: &OpenBook<'_>,
    selection: Option<&Selection>,
) {
    let summary = book.summary();
    println!("=== COLUMN MAPPING ({csv_path}) ===");
    for resolved in mapping.iter() {
        let r = &resolved.resolution;
        println!("  {:<18} → {} [{:?}]", resolved.field, r.column, r.rule);
    }

    println!();
    println!("=== CLASSIFICATION ===");
    println!("  rows:          {}", summary.rows);
    println!("  open:          {}", summary.open);
    println!("  closed:        {}", summary.closed);
    println!("  zero:          {}", summary.numeric_zero + summary.zero_literal);
    println!("  blank:         {}", summary.blank);
    println!("  other:         {}", summary.other);

    println!();
    let groups = book.groups();
    if groups.is_empty() {
        println!("No open positions found.");
        return;
    }
    println!("=== OPEN BY GROUP ===");
    for (group, items) in &groups {
        println!("  {group}: {}", items.join(", "));
    }

    let Some(selection) = selection else {
        return;
    };
    println!();
    println!(
        "=== POSITIONS: {} / {} ({} records) ===",
        selection.group,
        selection.item,
        selection.positions.len()
    );
    for position in &selection.positions {
        let line: Vec<String> = position
            .cells
            .iter()
            .map(|(label, value)| format!("{label}={value}"))
            .collect();
        println!("  #{:<5} {}", position.row, line.join(" | "));
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn arg_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
