//! scriptact - CI job entrypoint runner.
//!
//! Reads the job's named parameters from the environment, compiles the
//! configured inline script (or loads the referenced module), invokes it
//! once with the collaborator context, and reports the encoded `result`
//! output. Any failure at any stage ends the run: the originating error's
//! message is logged and the process exits non-zero with no output
//! written.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};

use scriptact_core::{init_tracing, Error, HostPaths, Outputs, Params, RunConfig, ScriptSource};
use scriptact_engine::{template, Runner, ScriptHost};

#[derive(Parser)]
#[command(name = "scriptact")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Runs a user-supplied script as a CI job entrypoint", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the configured script and write the `result` output
    Run,

    /// Validate the configuration and parse inline scripts, without
    /// building or executing anything
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let outcome = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run().await,
        Commands::Check => cmd_check().await,
    };

    if let Err(err) = outcome {
        // The originating error's own message is the failure report.
        error!("{err:#}");
        std::process::exit(1);
    }
}

/// Full pipeline: validate, compile or load, execute, encode, report.
async fn cmd_run() -> Result<()> {
    let config = load_config()?;

    let runner = Runner::new();
    let report = runner.execute(&config).await?;

    Outputs::from_env()
        .emit("result", &report.result)
        .context("failed to report run result")?;
    info!(run_id = %report.run_id, "result reported");
    Ok(())
}

/// Validation-only mode: configuration plus, for inline scripts, the
/// template and parse stages.
async fn cmd_check() -> Result<()> {
    let config = load_config()?;

    if let ScriptSource::Inline(script) = &config.source {
        let host = ScriptHost::new();
        let source = template::wrap(script);
        host.parse_check(&source)
            .map_err(|e| Error::Parse(e.to_string()))?;
        info!("inline script parses");
    }

    info!("configuration OK");
    Ok(())
}

fn load_config() -> Result<RunConfig> {
    // Roots first: their absence is fatal before anything else runs.
    let paths = HostPaths::from_env()?;
    let params = Params::from_env();
    Ok(RunConfig::from_params(&params, &paths)?)
}
