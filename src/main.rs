use brewsync::batch::{BatchRunner, DEFAULT_PROBE_TIMEOUT, MAX_WORKERS};
use brewsync::brew::BrewCli;
use brewsync::commands::{self, Context};
use brewsync::config::{self, Config};
use brewsync::{colors, platform};
use clap::{Args, CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "brew-sync")]
#[command(author, version, about = "Sync Homebrew formulae and casks with a JSON list", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Package list (JSON with "formula" and "cask" arrays)
    #[arg(short, long, global = true, default_value_os_t = config::default_path())]
    config: PathBuf,

    /// Use this brew binary instead of searching for one
    #[arg(long, global = true)]
    brew: Option<PathBuf>,

    /// Maximum concurrent package checks
    #[arg(short, long, global = true, default_value_t = MAX_WORKERS)]
    jobs: usize,

    /// Seconds before a single package check is abandoned (0 = never)
    #[arg(long, global = true, default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
    probe_timeout: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update, upgrade, and install everything in the config (default)
    Sync(SyncArgs),

    /// Show configured packages that are not installed
    Missing,

    /// Show caveats for configured packages
    Caveats,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Default)]
struct SyncArgs {
    /// Exit with status 2 if any upgrade or install failed
    #[arg(long)]
    strict: bool,

    /// Fail instead of installing Homebrew when it is missing
    #[arg(long)]
    no_bootstrap: bool,

    /// Also write the final report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    colors::init_colors();

    let command = cli.command.unwrap_or_else(|| Commands::Sync(SyncArgs::default()));

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "brew-sync", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    platform::require_macos()?;
    println!("{} brew-sync starting", "==>".blue().bold());

    let config = Config::load(&cli.config)?;
    println!(
        "Loaded {}: {} formulae, {} casks",
        cli.config.display().to_string().cyan(),
        config.formula.len().to_string().bold(),
        config.cask.len().to_string().bold()
    );

    let allow_bootstrap = matches!(&command, Commands::Sync(args) if !args.no_bootstrap);
    let brew = BrewCli::new(platform::discover_brew(cli.brew, allow_bootstrap)?);
    tracing::debug!("brew binary: {}", brew.path().display());

    let timeout = (cli.probe_timeout > 0).then(|| Duration::from_secs(cli.probe_timeout));
    let runner = BatchRunner::new(cli.jobs)
        .with_timeout(timeout)
        .with_progress(std::io::stderr().is_terminal());
    let ctx = Context::new(&brew, runner);

    match command {
        Commands::Sync(args) => {
            let report = commands::sync(&ctx, &config).await;
            commands::print_report(&report)?;

            if let Some(path) = &args.report {
                std::fs::write(path, report.to_json()?)?;
                println!("Report written to {}", path.display().to_string().cyan());
            }

            if args.strict && report.has_errors() {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Missing => {
            commands::missing(&ctx, &config).await;
        }
        Commands::Caveats => {
            commands::caveats(&ctx, &config).await;
        }
        Commands::Completions { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}
