//! Promtab CLI
//!
//! Command-line interface for running tabular metric queries:
//! - Query aliased metrics over a time range
//! - List configured aliases
//! - Show table schemas
//! - Generate a default config file

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promtab::config::{default_config_path, generate_default_config, FileConfigProvider};
use promtab::prom::{PromClient, Sample};
use promtab::query::{Qual, COLUMN_NAME};
use promtab::table::{Alias, AliasTable, MetricTable, TableDef};

#[derive(Parser)]
#[command(name = "promtab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prometheus metrics as tables")]
#[command(
    long_about = "Promtab runs aliased PromQL range queries and flattens the results into rows.\nAliases live in a config file that is re-read on every query."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: user config dir, or PROMTAB_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a metric query and stream its rows
    Query {
        /// Metric names (aliases or bare selectors)
        names: Vec<String>,
        /// Range start: RFC 3339, unix seconds, "now" or "now-<n><h|d|w|m>"
        #[arg(long)]
        from: Option<String>,
        /// Range end, same forms as --from
        #[arg(long)]
        to: Option<String>,
    },

    /// List configured aliases
    Aliases,

    /// Show table schemas
    Tables,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "promtab=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let provider = Arc::new(match &cli.config {
        Some(path) => FileConfigProvider::new(path.clone()),
        None => FileConfigProvider::default_location(),
    });

    match cli.command {
        Commands::Query { names, from, to } => {
            if names.is_empty() {
                bail!("at least one metric name is required");
            }

            let mut quals = vec![Qual::any_of(COLUMN_NAME, names)];
            if let Some(s) = from {
                quals.push(Qual::after(parse_time_arg(&s)?));
            }
            if let Some(s) = to {
                quals.push(Qual::before(parse_time_arg(&s)?));
            }

            let backend = Arc::new(PromClient::new(provider.clone()));
            let table = MetricTable::new(provider, backend);

            // Stream rows out as they arrive instead of collecting the result
            let (mut tx, mut rx) = mpsc::channel::<Sample>(64);
            let json = cli.format == "json";
            let printer = tokio::spawn(async move {
                let mut count = 0usize;
                while let Some(row) = rx.recv().await {
                    if count == 0 && !json {
                        println!(
                            "{:<24} {:<28} {:>16}  labels",
                            "NAME", "TIMESTAMP", "VALUE"
                        );
                    }
                    print_row(&row, json);
                    count += 1;
                }
                count
            });

            let result = table.list(&quals, &mut tx).await;
            drop(tx);
            let count = printer.await?;
            result?;

            if !json {
                eprintln!("{count} rows");
            }
        }

        Commands::Aliases => {
            let table = AliasTable::new(provider);
            let mut rows: Vec<Alias> = Vec::new();
            table.list(&mut rows).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No aliases configured ({})", default_config_path().display());
            } else {
                for alias in rows {
                    println!("{:<24} {}", alias.name, alias.template);
                }
            }
        }

        Commands::Tables => {
            print_table_def(MetricTable::def());
            println!();
            print_table_def(AliasTable::def());
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("creating {}", parent.display()))?;
                    }
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{content}"),
            }
        }
    }

    Ok(())
}

fn print_row(row: &Sample, json: bool) {
    if json {
        // One JSON object per line; rows stream, so no enclosing array
        match serde_json::to_string(row) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, "could not serialize row"),
        }
    } else {
        let labels = row
            .labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<24} {:<28} {:>16.6}  {}",
            row.name,
            row.timestamp.to_rfc3339(),
            row.value,
            labels
        );
    }
}

fn print_table_def(def: &TableDef) {
    println!("{}", def.name);
    println!("  {}", def.description);
    for col in def.columns {
        println!("  {:<12} {:<10} {}", col.name, col.column_type.to_string(), col.description);
    }
}

/// Parse a time argument: RFC 3339, unix seconds, "now" or "now-7d" style
fn parse_time_arg(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if s == "now" {
        return Ok(Utc::now());
    }

    if let Some(t) = parse_relative_time(s) {
        return Ok(t);
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }

    if let Ok(epoch) = s.parse::<i64>() {
        if let Some(t) = DateTime::from_timestamp(epoch, 0) {
            return Ok(t);
        }
    }

    bail!("cannot parse timestamp: {s}")
}

/// Parse relative time like "now-7d"
fn parse_relative_time(s: &str) -> Option<DateTime<Utc>> {
    let re = regex::Regex::new(r"^now-(\d+)([hdwm])$").ok()?;
    let caps = re.captures(s)?;

    let amount: i64 = caps[1].parse().ok()?;
    let secs = match &caps[2] {
        "h" => amount * 3600,
        "d" => amount * 24 * 3600,
        "w" => amount * 7 * 24 * 3600,
        "m" => amount * 30 * 24 * 3600,
        _ => return None,
    };

    Some(Utc::now() - chrono::Duration::seconds(secs))
}
