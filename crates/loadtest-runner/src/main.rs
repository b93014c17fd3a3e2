//! # OpenCloudHub Load Test CLI
//!
//! Command-line interface for running load tests against the platform.
//!
//! ## Usage
//!
//! ```bash
//! # Smoke test the wine classifier in the dev environment
//! och-loadtest --test-type smoke --target model-wine
//!
//! # Sustained load against the demo backend, via internal service DNS
//! och-loadtest --test-type load --target app-backend --environment internal
//!
//! # Ramp arrival rate against qwen until it breaks, saving results
//! och-loadtest --test-type breakpoint --target model-qwen --output results.json
//! ```

use clap::Parser;
use loadtest_core::{parse_duration, TestType};
use loadtest_env::Environment;
use loadtest_http::HttpClient;
use loadtest_runner::{evaluate, report, Runner};
use loadtest_scenarios::{available_targets, suite_for};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "och-loadtest")]
#[command(author = "OpenCloudHub Platform Team")]
#[command(version = "0.1.0")]
#[command(about = "Load testing tool for the OpenCloudHub platform", long_about = None)]
struct Cli {
    /// Test type: smoke, load, stress, spike, soak, breakpoint
    #[arg(short, long, default_value = "smoke")]
    test_type: String,

    /// Test target suite (see --list-targets)
    #[arg(short = 'T', long)]
    target: Option<String>,

    /// Target environment: dev or internal
    #[arg(short, long, env = "TEST_ENV", default_value = "dev")]
    environment: String,

    /// Environment definition file (TOML), overriding the built-in registry
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding request fixtures
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Pause between iterations per worker (e.g. 500ms, 1s)
    #[arg(long, default_value = "500ms")]
    think_time: String,

    /// Write the run summary and threshold outcomes to a JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the generated run configuration as JSON and exit
    #[arg(long)]
    dry_run: bool,

    /// List available test targets and exit
    #[arg(long)]
    list_targets: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if cli.list_targets {
        for target in available_targets() {
            println!("{target}");
        }
        return Ok(());
    }

    let target = cli
        .target
        .ok_or_else(|| anyhow::anyhow!("--target is required (see --list-targets)"))?;

    let env = match &cli.config {
        Some(path) => Environment::from_file(path)?,
        None => Environment::named(&cli.environment)?,
    };
    info!(environment = %env.name, target = %target, "resolved environment");

    let test_type: TestType = cli.test_type.parse()?;
    let suite = suite_for(&target, &env, &cli.data_dir)?;
    let config = suite.run_config(test_type)?;

    if cli.dry_run {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let think_time = parse_duration(&cli.think_time)?;
    let client = HttpClient::new(env.insecure_skip_tls_verify)?;
    let runner =
        Runner::new(config.clone(), suite.into_registry(), client).with_think_time(think_time);

    let summary = runner.run().await?;
    report::print_summary(&summary);

    let outcomes = evaluate(&config.thresholds, &summary)?;
    let passed = report::print_thresholds(&outcomes);

    if let Some(path) = &cli.output {
        let results = serde_json::json!({
            "summary": summary,
            "thresholds": outcomes,
        });
        std::fs::write(path, serde_json::to_string_pretty(&results)?)?;
        info!(path = %path.display(), "results saved");
    }

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}
