use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exam_duty_analyzer::{export, match_name, normalize, report, run_analysis, AnalysisConfig};

#[derive(Parser)]
#[command(name = "duty-analyzer")]
#[command(
    about = "Exam invigilation duty analyser with roster name reconciliation",
    long_about = None
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate every configured duty file and write a markdown report
    Analyze {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value = "duty_report.md")]
        out: PathBuf,
        /// Also dump the full analysis as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Also export long-form duty rows with match metadata as CSV
        #[arg(long)]
        long_csv: Option<PathBuf>,
    },
    /// Show how raw names resolve against the roster
    Match {
        #[arg(long)]
        config: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List the roster with normalized forms and collisions
    Roster {
        #[arg(long)]
        config: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            config,
            out,
            json,
            long_csv,
        } => {
            let config = AnalysisConfig::load(&config)?;
            let roster = config.roster()?;
            if config.input.is_empty() {
                anyhow::bail!("no [[input]] files configured");
            }

            let analysis = run_analysis(&config, &roster);
            let markdown = report::build_report(&analysis, Utc::now().date_naive());
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());

            if let Some(path) = json {
                export::write_json_file(&path, &analysis)?;
                println!("Analysis JSON written to {}.", path.display());
            }
            if let Some(path) = long_csv {
                export::write_long_csv_file(&path, &analysis)?;
                println!("Long-form duty rows written to {}.", path.display());
            }

            if !analysis.failures.is_empty() {
                println!(
                    "{} file(s) could not be processed; see the report.",
                    analysis.failures.len()
                );
            }
        }
        Commands::Match { config, names } => {
            let config = AnalysisConfig::load(&config)?;
            let roster = config.roster()?;
            for name in names {
                let result = match_name(&name, &roster, config.cutoff);
                println!(
                    "- '{}' -> {} ({}, {:.2}){}",
                    result.raw_name,
                    result.canonical_name.as_deref().unwrap_or("(unmatched)"),
                    result.strategy.label(),
                    result.confidence,
                    if result.ambiguous { " ambiguous" } else { "" }
                );
            }
        }
        Commands::Roster { config } => {
            let config = AnalysisConfig::load(&config)?;
            let roster = config.roster()?;
            println!("{} faculty in roster:", roster.len());
            for entry in roster.entries() {
                println!(
                    "- {} [{}] {}",
                    entry.name,
                    normalize(&entry.name),
                    entry.department.as_deref().unwrap_or("-")
                );
            }
            let collisions = roster.collisions();
            if !collisions.is_empty() {
                println!("Names that normalize identically (first one wins):");
                for group in collisions {
                    println!("- {}", group.join(", "));
                }
            }
        }
    }

    Ok(())
}
