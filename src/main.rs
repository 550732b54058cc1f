//! Main entry point for the skill-estimate command line tool
//!
//! Loads an ordered dataset of pass/fail outcomes, runs the selected rating
//! estimator and prints the estimate with its 95% confidence interval. Also
//! generates synthetic datasets.

use anyhow::Result;
use clap::{Parser, Subcommand};
use skill_estimate::config::AppConfig;
use skill_estimate::dataset::{generate_dataset, load_records};
use skill_estimate::rating::glicko2::state_estimate;
use skill_estimate::rating::{EstimatorKind, Glicko2Estimator, WgdEstimator};
use skill_estimate::types::{Estimate, Record};
use std::path::PathBuf;
use tracing::{debug, error, info, info_span};

/// Skill Estimate - rating estimation from pass/fail outcomes
#[derive(Parser)]
#[command(
    name = "skill-estimate",
    version,
    about = "Estimate a skill rating and 95% confidence interval from pass/fail outcomes",
    long_about = "Estimates an agent's latent skill rating from an ordered sequence of \
                 outcomes against items of known difficulty, using either recency-weighted \
                 gradient descent on the Elo curve or a single-period Glicko-2 update."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with per-iteration logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate a rating from a dataset
    Estimate(EstimateArgs),
    /// Write a synthetic dataset
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct EstimateArgs {
    /// Dataset path (.csv, .yaml or .json)
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Estimator to run
    #[arg(short, long, value_name = "METHOD", help = "Estimator: wgd or glicko2")]
    method: Option<EstimatorKind>,

    #[arg(long, value_name = "RATING", help = "Starting rating for either estimator")]
    initial_score: Option<f64>,

    #[arg(long, value_name = "RATE")]
    learning_rate: Option<f64>,

    #[arg(long, value_name = "N")]
    max_iter: Option<usize>,

    #[arg(long, value_name = "FACTOR", help = "Recency decay, expected in (0, 1]")]
    decay_factor: Option<f64>,

    #[arg(long, value_name = "RD")]
    initial_rd: Option<f64>,

    #[arg(long, value_name = "SIGMA")]
    initial_volatility: Option<f64>,

    #[arg(long, value_name = "TAU")]
    tau: Option<f64>,

    /// Validate configuration and dataset, then exit
    #[arg(
        long,
        help = "Validate configuration and dataset and exit without estimating"
    )]
    dry_run: bool,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Output path (.csv, .yaml or .json)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    #[arg(short = 'n', long, default_value_t = skill_estimate::dataset::generator::DEFAULT_SAMPLES)]
    samples: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Command::Estimate(estimate) = &args.command {
        apply_estimate_overrides(&mut config, estimate);
    }

    skill_estimate::config::validate_config(&config)?;
    Ok(config)
}

fn apply_estimate_overrides(config: &mut AppConfig, args: &EstimateArgs) {
    let settings = &mut config.estimator;

    if let Some(method) = args.method {
        settings.method = method;
    }
    if let Some(initial_score) = args.initial_score {
        settings.wgd.initial_score = initial_score;
        settings.glicko2.initial_score = initial_score;
    }
    if let Some(learning_rate) = args.learning_rate {
        settings.wgd.learning_rate = learning_rate;
    }
    if let Some(max_iter) = args.max_iter {
        settings.wgd.max_iter = max_iter;
    }
    if let Some(decay_factor) = args.decay_factor {
        settings.wgd.decay_factor = decay_factor;
    }
    if let Some(initial_rd) = args.initial_rd {
        settings.glicko2.initial_rd = initial_rd;
    }
    if let Some(initial_volatility) = args.initial_volatility {
        settings.glicko2.initial_volatility = initial_volatility;
    }
    if let Some(tau) = args.tau {
        settings.glicko2.tau = tau;
    }
}

/// Log the effective service and estimator settings
fn display_startup_banner(config: &AppConfig) {
    info!("{} v{}", config.service.name, skill_estimate::VERSION);
    info!("   Log level: {}", config.service.log_level);
    info!("   Method: {}", config.estimator.method);
}

fn print_estimate(estimate: &Estimate) {
    println!("\nFinal Estimated Score: {:.2}", estimate.rating);
    let (low, high): (f64, f64) = estimate.interval.into();
    println!("95% Confidence Interval: ({:.2}, {:.2})", low, high);
}

fn run_estimate(config: &AppConfig, records: &[Record]) -> Result<()> {
    let settings = &config.estimator;
    info!(
        "Estimating rating from {} records with {}",
        records.len(),
        settings.method
    );

    match settings.method {
        EstimatorKind::Wgd => {
            let estimator = WgdEstimator::new(settings.wgd.clone())?;
            let estimate = estimator.estimate_with_progress(records, |progress| {
                debug!(
                    "Iteration {}: Estimated Score = {:.2}",
                    progress.iteration, progress.rating
                );
            })?;
            print_estimate(&estimate);
        }
        EstimatorKind::Glicko2 => {
            let estimator = Glicko2Estimator::new(settings.glicko2.clone())?;
            let state = estimator.rate(records)?;
            print_estimate(&state_estimate(&state));
            println!("Rating Deviation: {:.2}", state.deviation);
            println!("Volatility: {:.6}", state.volatility);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let span = info_span!("service", name = %config.service.name);
    let _enter = span.enter();
    display_startup_banner(&config);

    match &args.command {
        Command::Generate(generate) => {
            let records = generate_dataset(&generate.output, generate.samples, generate.seed)?;
            println!(
                "Data saved to {} ({} records)",
                generate.output.display(),
                records.len()
            );
        }
        Command::Estimate(estimate) => {
            let records = load_records(&estimate.data)?;

            if estimate.dry_run {
                info!(
                    "Configuration and dataset valid ({} records, method {})",
                    records.len(),
                    config.estimator.method
                );
                return Ok(());
            }

            if let Err(e) = run_estimate(&config, &records) {
                error!("Estimation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
