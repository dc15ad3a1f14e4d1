//! CLI definitions and entry point

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use super::commands::{self, Context};
use storefront_ops::config::OpsConfig;
use storefront_ops::output::OutputMode;

/// storefront-ops - Deploy the popup function and clean up storefront script tags
#[derive(Parser, Debug)]
#[command(
    name = "storefront-ops",
    version,
    about = "Deploy the popup edge function and reconcile storefront script tags",
    long_about = "Operational fixes for the popup storefront integration.\n\n\
                  `deploy` pushes the edge function through a chain of CLI fallbacks\n\
                  and verifies it over HTTP. `reconcile` removes duplicate popup\n\
                  script tags and installs one canonical tag. `fix` does both."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./storefront-ops.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Exit non-zero on any failure, 2 for deployed-but-unverified
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy the edge function, trying each CLI variant in turn
    Deploy,

    /// Remove popup script tags and install a single canonical one
    Reconcile,

    /// Deploy the embed function, then reconcile script tags
    Fix,

    /// Print the effective configuration as TOML
    Config,
}

fn init_logging(verbose: bool, mode: OutputMode) {
    let level = if verbose { "debug" } else { "info" };
    // Keep stdout clean for the JSON document.
    let target = match mode {
        OutputMode::Human => env_logger::Target::Stdout,
        OutputMode::Json => env_logger::Target::Stderr,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(target)
        .format(|buf, record| {
            let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(buf, "[{now}] {}", record.args())
        })
        .init();
}

/// Run the CLI
pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    init_logging(cli.verbose, output_mode);

    let (config, source) = match OpsConfig::discover(cli.config.as_deref()) {
        Ok(found) => found,
        Err(e) => {
            log::error!("❌ {e}");
            return Ok(ExitCode::FAILURE);
        },
    };
    match &source {
        Some(path) => log::debug!("Using config {}", path.display()),
        None => log::debug!("Using built-in configuration"),
    }

    let ctx = Context {
        config,
        mode: output_mode,
        strict: cli.strict,
    };

    match cli.command {
        Command::Deploy => commands::deploy(&ctx),
        Command::Reconcile => commands::reconcile(&ctx),
        Command::Fix => commands::fix(&ctx),
        Command::Config => commands::show_config(&ctx),
    }
}
