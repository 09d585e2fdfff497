//! appscope CLI - classify connected SaaS apps and score a user's portfolio

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr; stdout carries only the rendered report

use anyhow::Context;
use appscope_core::validate::{self, parse_risk_level};
use appscope_core::{analyze_records, config, render_json, render_text, rescore_records, RiskLevel};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "appscope")]
#[command(about = "Threat classification and portfolio risk scoring for connected SaaS apps")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (overrides APPSCOPE_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every app in a portfolio file and compute the portfolio score
    Analyze {
        /// Path to a JSON file of app records
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only apps at or above this level (overrides config file)
        #[arg(long)]
        min_level: Option<String>,

        /// Show only top N apps (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Exit with status 1 if any app is at or above this level
        #[arg(long)]
        fail_on: Option<String>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Score a portfolio from previously stored risk levels
    Score {
        /// Path to a JSON file of app records, each with a riskLevel
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running analysis
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("APPSCOPE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_level_flag(flag: &str, value: Option<&str>) -> anyhow::Result<Option<RiskLevel>> {
    value
        .map(|v| parse_risk_level(v).with_context(|| format!("invalid --{} value", flag)))
        .transpose()
}

fn load_config(config_path: Option<&Path>) -> anyhow::Result<config::ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    config::load_and_resolve(&project_root, config_path).context("failed to load configuration")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            path,
            format,
            min_level,
            top,
            fail_on,
            config: config_path,
        } => {
            let resolved_config = load_config(config_path.as_deref())?;

            // CLI flags override config file values
            let effective_min_level =
                parse_level_flag("min-level", min_level.as_deref())?.or(resolved_config.min_level);
            let effective_top = top.or(resolved_config.top_n);
            let fail_on = parse_level_flag("fail-on", fail_on.as_deref())?;

            let records = validate::load_records(&path)?;
            let report = analyze_records(&records, &resolved_config)
                .with_context(|| format!("invalid app records in {}", path.display()))?;

            let blocking = fail_on.and_then(|level| {
                report
                    .summary
                    .highest
                    .filter(|highest| *highest >= level)
            });

            let report = report.filtered(effective_min_level, effective_top);
            match format {
                OutputFormat::Text => print!("{}", render_text(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }

            if let Some(highest) = blocking {
                tracing::warn!(level = %highest, "portfolio contains apps at or above --fail-on level");
                std::process::exit(1);
            }
        }
        Commands::Score {
            path,
            format,
            config: config_path,
        } => {
            let resolved_config = load_config(config_path.as_deref())?;
            let records = validate::load_records(&path)?;
            let summary = rescore_records(&records, &resolved_config)
                .with_context(|| format!("invalid app records in {}", path.display()))?;

            match format {
                OutputFormat::Text => {
                    println!("Portfolio score: {}", summary.score);
                    println!("  apps: {}", summary.total_apps);
                    for level in RiskLevel::ALL.iter().rev() {
                        let count = match level {
                            RiskLevel::Low => summary.low,
                            RiskLevel::Medium => summary.medium,
                            RiskLevel::High => summary.high,
                            RiskLevel::Critical => summary.critical,
                        };
                        println!("  {}: {}", level.as_str().to_lowercase(), count);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => match load_config(path.as_deref()) {
                Ok(config) => {
                    if let Some(ref p) = config.config_path {
                        println!("Config valid: {}", p.display());
                    } else {
                        println!("No config file found. Using defaults.");
                    }
                }
                Err(e) => {
                    eprintln!("Config validation failed: {:#}", e);
                    std::process::exit(1);
                }
            },
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                let analyzer = &resolved.analyzer;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Rule points:");
                println!("  breaches: {}", analyzer.points.breaches);
                println!("  third_party_sharing: {}", analyzer.points.third_party_sharing);
                println!("  sensitive_data: {}", analyzer.points.sensitive_data);
                println!();
                println!("Thresholds:");
                println!("  medium: {}", analyzer.thresholds.medium);
                println!("  high: {}", analyzer.thresholds.high);
                println!("  critical: {}", analyzer.thresholds.critical);
                println!();
                println!("Level weights:");
                println!("  low: {}", resolved.level_weights.low);
                println!("  medium: {}", resolved.level_weights.medium);
                println!("  high: {}", resolved.level_weights.high);
                println!("  critical: {}", resolved.level_weights.critical);
                println!();
                println!("Classification:");
                println!("  confidence: {}", analyzer.confidence);
                if analyzer.sensitive_data_types.is_empty() {
                    println!("  sensitive_data_types: none (rule disabled)");
                } else {
                    println!(
                        "  sensitive_data_types: {}",
                        analyzer.sensitive_data_types.join(", ")
                    );
                }
                println!();
                println!("Filters:");
                println!(
                    "  min_level: {}",
                    resolved
                        .min_level
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
                println!(
                    "  top: {}",
                    resolved
                        .top_n
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
            }
        },
    }

    Ok(())
}
