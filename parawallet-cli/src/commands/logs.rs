//! Logs command - inspect recorded backend calls

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Table;

use super::get_app_dir;
use crate::output::{create_table, info};
use parawallet_core::{EndpointStats, EntryPoint, LogEntry, LogFilter, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Only events for this backend call
        /// (create-account, authenticate, fetch-wallet, submit-transfer)
        #[arg(long)]
        endpoint: Option<String>,
        /// Only failed events
        #[arg(long)]
        errors: bool,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show calls and failures per backend call
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete recorded events
    Clear {
        /// Keep events from the last N days
        #[arg(long, default_value = "30", conflicts_with = "all")]
        keep_days: u64,
        /// Delete every event
        #[arg(long)]
        all: bool,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogsCommands) -> Result<()> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)?;
    let service = LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List {
            endpoint,
            errors,
            limit,
            json,
        } => {
            let filter = LogFilter {
                endpoint,
                errors_only: errors,
                limit,
            };
            let entries = service.query(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                info("No matching events.");
            } else {
                println!("{}", events_table(&entries));
            }
        }
        LogsCommands::Stats { json } => {
            let stats = service.endpoint_stats()?;
            let total = service.count()?;
            let failures = service.count_errors()?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "events": total,
                        "failures": failures,
                        "endpoints": stats,
                        "database": service.db_path().to_string_lossy(),
                    })
                );
            } else {
                println!("{} events, {} failed", total, failures);
                if stats.is_empty() {
                    info("No backend calls recorded yet.");
                } else {
                    println!("{}", stats_table(&stats));
                }
                println!("{}", service.db_path().display().to_string().dimmed());
            }
        }
        LogsCommands::Clear {
            keep_days,
            all,
            yes,
            json,
        } => {
            let cutoff = (!all).then_some(keep_days);

            if !yes && !json {
                let prompt = match cutoff {
                    Some(days) => format!("Delete events older than {} days?", days),
                    None => "Delete all recorded events?".to_string(),
                };
                if !dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()?
                {
                    info("Nothing deleted.");
                    return Ok(());
                }
            }

            let deleted = service.delete_before(cutoff_ms(cutoff, Utc::now().timestamp_millis()))?;

            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                println!("Deleted {} events", deleted);
            }
        }
    }

    Ok(())
}

/// Everything strictly older than the returned timestamp is deleted
fn cutoff_ms(keep_days: Option<u64>, now_ms: i64) -> i64 {
    match keep_days {
        Some(days) => now_ms - Duration::days(days as i64).num_milliseconds(),
        None => i64::MAX,
    }
}

fn format_time(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn outcome(entry: &LogEntry) -> String {
    match &entry.error_message {
        Some(msg) => msg.red().to_string(),
        None => "ok".green().to_string(),
    }
}

fn events_table(entries: &[LogEntry]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Time", "Call", "Event", "Outcome"]);
    for entry in entries {
        let call = entry
            .endpoint
            .as_deref()
            .or(entry.command.as_deref())
            .unwrap_or("-");
        table.add_row(vec![
            format_time(entry.timestamp),
            call.to_string(),
            entry.event.clone(),
            outcome(entry),
        ]);
    }
    table
}

fn stats_table(stats: &[EndpointStats]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Call", "Calls", "Failures", "Last failure"]);
    for s in stats {
        table.add_row(vec![
            s.endpoint.clone(),
            s.calls.to_string(),
            s.failures.to_string(),
            s.last_failure.map(format_time).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}
