//! Gistshift CLI - move public gists into organization repositories.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::Term;
use gistshift::{MirrorMode, TargetKind};
use tracing_subscriber::EnvFilter;

use crate::commands::limits::OutputFormat;

/// Exit status for missing or invalid configuration.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "gistshift")]
#[command(version)]
#[command(about = "Migrate public gists into organization repositories")]
#[command(
    long_about = "Gistshift finds your public gists whose filename and description match the \
given patterns, then moves each one into a repository owned by an organization (or into a \
private gist). In conceal mode the original gist is overwritten and deleted afterwards."
)]
#[command(after_long_help = r#"EXAMPLES
    Mirror every shell script gist into the acme org:
        $ gistshift run --org acme --filename-filter '\.sh$'

    Prefix repository names and move the originals out of sight:
        $ gistshift run --org acme --name-match '^' --name-replace 'gist-' --mode conceal

    Preview what would happen:
        $ gistshift run --org acme --dry-run

    List matching gists as JSON:
        $ gistshift list --org acme --output json

    Generate shell completions:
        $ gistshift completions bash > ~/.local/share/bash-completion/completions/gistshift

CONFIGURATION
    Gistshift reads configuration from:
      1. ~/.config/gistshift/config.toml (or $XDG_CONFIG_HOME/gistshift/config.toml)
      2. ./gistshift.toml
      3. Environment variables (GISTSHIFT_* prefix, e.g., GISTSHIFT_GITHUB_TOKEN)
      4. .env file in current directory
    Command-line flags override all of the above.

ENVIRONMENT VARIABLES
    GISTSHIFT_GITHUB_TOKEN         GitHub personal access token (required)
    GISTSHIFT_ORGANIZATION         Target organization
    GISTSHIFT_THROTTLE_MS          Pause after each remote call (default: 4000)
    GISTSHIFT_MODE                 mirror or conceal (default: mirror)
    GISTSHIFT_TARGET               repository or private-snippet (default: repository)
    GISTSHIFT_RATE_LIMIT_RETRIES   Retries for rate-limited calls (default: 0)
    RUST_LOG                       Log filter when output is not a terminal
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover matching gists and migrate them
    Run {
        #[command(flatten)]
        args: MirrorArgs,

        /// Dry run - show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// List matching gists and their derived targets without changing anything
    List {
        #[command(flatten)]
        args: MirrorArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show GitHub API rate limits
    Limits {
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// How to reach GitHub. Unset flags fall back to config and environment.
#[derive(Debug, Clone, Default, clap::Args)]
struct ConnectionArgs {
    /// GitHub token (default from GISTSHIFT_GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// API base URL, for GitHub Enterprise
    #[arg(long)]
    api_url: Option<String>,

    /// Proactive request pacing inside the client (0 disables)
    #[arg(long)]
    requests_per_second: Option<u32>,

    /// Retries with exponential backoff for rate-limited calls (default 0)
    #[arg(long)]
    rate_limit_retries: Option<usize>,
}

/// Pipeline options. Unset flags fall back to config and environment.
#[derive(Debug, Clone, Default, clap::Args)]
struct MirrorArgs {
    /// Organization that receives the repositories
    #[arg(long)]
    org: Option<String>,

    /// Only gists whose description matches this regex (default .*)
    #[arg(short = 'd', long)]
    description_filter: Option<String>,

    /// Only gists with at least one filename matching this regex (default .*)
    #[arg(short = 'f', long)]
    filename_filter: Option<String>,

    /// Regex applied once to the first filename to build the repository name (default ^)
    #[arg(long)]
    name_match: Option<String>,

    /// Replacement for --name-match; may use $1 style groups (default "")
    #[arg(long)]
    name_replace: Option<String>,

    /// Regex applied once to the description (default ^)
    #[arg(long)]
    description_match: Option<String>,

    /// Replacement for --description-match (default "")
    #[arg(long)]
    description_replace: Option<String>,

    /// Pause after each remote call, in milliseconds (default 4000)
    #[arg(short = 't', long, allow_negative_numbers = true)]
    throttle_ms: Option<i64>,

    /// What happens to the source gist: mirror or conceal (default mirror)
    #[arg(short, long)]
    mode: Option<MirrorMode>,

    /// Where content lands: repository or private-snippet (default repository)
    #[arg(long)]
    target: Option<TargetKind>,

    /// Branch pushed to the target (default main)
    #[arg(long)]
    branch: Option<String>,

    /// Gists requested per listing page, 1 to 100 (default 100)
    #[arg(long)]
    page_size: Option<u32>,

    /// Directory for temporary clones (default system temp dir)
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Structured logging when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("gistshift=info,gistshift_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            if is_config_error(e.as_ref()) {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Commands that don't need configuration
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let config = config::Config::load()?;

    match cli.command {
        Commands::Run { args, dry_run } => {
            commands::run::handle_run(&config.with_overrides(&args), dry_run).await
        }
        Commands::List { args, output } => {
            commands::list::handle_list(&config.with_overrides(&args), output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Limits { connection, output } => {
            commands::limits::handle_limits(&config.with_connection(&connection), output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { .. } | Commands::Man { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Whether an error means the run never started because of bad configuration.
fn is_config_error(e: &(dyn std::error::Error + 'static)) -> bool {
    e.is::<gistshift::ConfigError>() || e.is::<::config::ConfigError>()
}
