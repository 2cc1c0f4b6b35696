//! Attrition CLI - progress and capacity calculations from the command line.

use anyhow::{Context, Result};
use attrition_capacity::{
    classify, CapacityAggregator, ReconcileConfig, Reconciler, RuleClassifier,
};
use attrition_core::{
    parse_timestamp, BonusContribution, BonusKind, CapacityReport, ConstructionTask,
};
use attrition_progress::{
    AnchoredClock, Clock, Countdown, CountdownConfig, Estimate, ProgressEstimator, SystemClock,
};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attrition")]
#[command(about = "Construction progress and capacity calculator", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate progress of a construction task
    Estimate {
        #[command(flatten)]
        task: TaskArgs,
        /// Evaluate at this time instead of now
        #[arg(long)]
        now: Option<String>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Live countdown, one line per second
    Watch {
        #[command(flatten)]
        task: TaskArgs,
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<usize>,
    },
    /// Aggregate a base capacity and bonus contributions
    Aggregate {
        /// JSON file with `base` and `contributions`
        input: PathBuf,
        /// JSON classifier rule table
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a server capacity report against recomputed values
    Reconcile {
        /// JSON capacity report
        input: PathBuf,
        /// Allowed relative difference
        #[arg(long, default_value = "0.000001")]
        tolerance: f64,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct TaskArgs {
    /// Completion timestamp (RFC 3339 or epoch milliseconds)
    #[arg(long)]
    completion_at: String,
    /// Start timestamp
    #[arg(long)]
    started_at: Option<String>,
    /// Credits cost, used when no start is given
    #[arg(long, default_value = "0")]
    cost: f64,
    /// Credits per hour, used when no start is given
    #[arg(long, default_value = "0")]
    throughput: f64,
}

impl TaskArgs {
    fn to_task(&self) -> Result<ConstructionTask> {
        ConstructionTask::from_raw(
            &self.completion_at,
            self.started_at.as_deref(),
            self.cost,
            self.throughput,
        )
        .context("Invalid construction task")
    }
}

#[derive(Debug, Deserialize)]
struct AggregateInput {
    base: f64,
    #[serde(default)]
    contributions: Vec<BonusContribution>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Estimate { task, now, json } => {
            let task = task.to_task()?;
            let now = match now {
                Some(raw) => parse_timestamp(&raw)?,
                None => SystemClock.now(),
            };
            let estimate = ProgressEstimator::new().estimate(&task, now)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                println!("{}", format_estimate(&estimate));
            }
        }
        Commands::Watch { task, ticks } => {
            let task = task.to_task()?;
            let countdown = Countdown::new(AnchoredClock::from_system()).with_config(
                CountdownConfig {
                    max_ticks: ticks,
                    ..Default::default()
                },
            );
            let (tx, mut rx) = mpsc::channel(8);

            let printer = async {
                while let Some(estimate) = rx.recv().await {
                    println!("{}", format_estimate(&estimate));
                }
            };

            tokio::select! {
                (delivered, ()) = async { tokio::join!(countdown.run(&task, tx), printer) } => {
                    let delivered = delivered?;
                    debug!("Countdown delivered {} estimates", delivered);
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Countdown cancelled");
                }
            }
        }
        Commands::Aggregate { input, rules, json } => {
            let input: AggregateInput = read_json(&input)?;
            let classifier = match rules {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    RuleClassifier::from_json(&raw)?
                }
                None => RuleClassifier::default(),
            };

            let aggregator = CapacityAggregator::new();
            let totals = aggregator.totals(input.base, &input.contributions)?;
            let result = aggregator.aggregate(input.base, &input.contributions)?;
            let grouped = classify(&result.breakdown, &classifier);

            if json {
                let out = serde_json::json!({
                    "value": result.value,
                    "totals": totals,
                    "breakdown": result.breakdown,
                    "grouped": grouped,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Capacity: {:.2}", result.value);
                println!(
                    "  Flat total: {:.2}  Percent total: {:+.2}%",
                    totals.flat_total,
                    totals.percent_total * 100.0
                );
                println!("  Base: {:.2}", input.base);
                for (category, bucket) in grouped.iter() {
                    if bucket.is_empty() {
                        continue;
                    }
                    println!("  {}:", category);
                    for contribution in bucket {
                        println!("    {}", format_contribution(contribution));
                    }
                }
            }
        }
        Commands::Reconcile { input, tolerance, json } => {
            let report: CapacityReport = read_json(&input)?;
            let reconciler = Reconciler::new().with_config(ReconcileConfig { tolerance });
            let results = reconciler.reconcile_report(&report)?;

            if json {
                let mut out = serde_json::Map::new();
                for (kind, r) in &results {
                    out.insert(kind.to_string(), serde_json::to_value(r)?);
                }
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Capacity reconciliation ({})", results.len());
                for (kind, r) in &results {
                    println!(
                        "  {} | {} | reported {:.2} | computed {:.2} | delta {:+.4}",
                        kind,
                        if r.consistent { "OK" } else { "MISMATCH" },
                        r.reported,
                        r.computed,
                        r.delta,
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn format_estimate(estimate: &Estimate) -> String {
    format!("{:5.1}% | {}", estimate.percent, estimate.remaining)
}

fn format_contribution(contribution: &BonusContribution) -> String {
    match contribution.kind {
        BonusKind::Flat => format!("{} {:+.2}/h", contribution.source, contribution.value),
        BonusKind::Percent => {
            format!("{} {:+.2}%", contribution.source, contribution.value * 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition_progress::RemainingTime;

    #[test]
    fn test_format_contribution() {
        assert_eq!(
            format_contribution(&BonusContribution::flat("Robotic Factories", 20.0)),
            "Robotic Factories +20.00/h"
        );
        assert_eq!(
            format_contribution(&BonusContribution::percent("Commander", 0.05)),
            "Commander +5.00%"
        );
    }

    #[test]
    fn test_format_estimate() {
        let estimate = Estimate {
            percent: 50.0,
            remaining: RemainingTime::from_duration(chrono::Duration::seconds(3600)),
        };
        assert_eq!(format_estimate(&estimate), " 50.0% | 1h 0m 0s");
    }

    #[test]
    fn test_aggregate_input_defaults_contributions() {
        let input: AggregateInput = serde_json::from_str(r#"{"base": 100}"#).unwrap();
        assert_eq!(input.base, 100.0);
        assert!(input.contributions.is_empty());
    }

    #[test]
    fn test_cli_parses_estimate() {
        let cli = Cli::try_parse_from([
            "attrition",
            "estimate",
            "--completion-at",
            "2025-03-01T12:00:00Z",
            "--cost",
            "1000",
            "--throughput",
            "500",
            "--now",
            "2025-03-01T11:00:00Z",
        ])
        .unwrap();
        let Commands::Estimate { task, now, json } = cli.command else {
            panic!("expected estimate");
        };
        assert!(!json);
        assert_eq!(now.as_deref(), Some("2025-03-01T11:00:00Z"));

        let estimate = ProgressEstimator::new()
            .estimate(&task.to_task().unwrap(), parse_timestamp("2025-03-01T11:00:00Z").unwrap())
            .unwrap();
        assert_eq!(estimate.percent, 50.0);
    }
}
