//! Command-line interface for spxsift.
//!
//! Provides scriptable access to speech SDK log analysis with five
//! core commands:
//! - `sessions`: List every session a log mentions
//! - `info`: Full per-session report (config, metrics, results, timeline)
//! - `threads`: Thread role analysis for one or all sessions
//! - `session-log`: Reconstructed log excerpt for a session
//! - `thread-log`: Raw lines of one physical thread

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::error::Result;

/// Speech SDK diagnostic log session analyzer.
#[derive(Debug, Parser)]
#[command(name = "spxsift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "SPXSIFT_OUTPUT")]
    pub output: OutputFormat,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "SPXSIFT_JSON")]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "SPXSIFT_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "SPXSIFT_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "SPXSIFT_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every session the log mentions.
    #[command(alias = "ls")]
    Sessions(SessionsArgs),

    /// Show the full report for one session.
    #[command(alias = "i", alias = "show")]
    Info(InfoArgs),

    /// Analyze thread roles for one or all sessions.
    #[command(alias = "t")]
    Threads(ThreadsArgs),

    /// Print the reconstructed log excerpt for one session.
    #[command(name = "session-log", alias = "slog")]
    SessionLog(SessionLogArgs),

    /// Print every line of one physical thread.
    #[command(name = "thread-log", alias = "tlog")]
    ThreadLog(ThreadLogArgs),
}

/// Arguments for the sessions command.
#[derive(Debug, clap::Args)]
pub struct SessionsArgs {
    /// Path to the log file.
    pub file: PathBuf,
}

/// Arguments for the info command.
#[derive(Debug, clap::Args)]
pub struct InfoArgs {
    /// Path to the log file.
    pub file: PathBuf,

    /// Session ID to report on.
    pub session_id: String,
}

/// Arguments for the threads command.
#[derive(Debug, clap::Args)]
pub struct ThreadsArgs {
    /// Path to the log file.
    pub file: PathBuf,

    /// Restrict the analysis to one session.
    #[arg(short = 's', long)]
    pub session_id: Option<String>,
}

/// Arguments for the session-log command.
#[derive(Debug, clap::Args)]
pub struct SessionLogArgs {
    /// Path to the log file.
    pub file: PathBuf,

    /// Session ID to reconstruct.
    pub session_id: String,
}

/// Arguments for the thread-log command.
#[derive(Debug, clap::Args)]
pub struct ThreadLogArgs {
    /// Path to the log file.
    pub file: PathBuf,

    /// Thread ID to extract.
    pub thread_id: String,
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    let config = match &cli.config {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to load config from {}: {}",
                path.display(),
                e
            );
            Config::default()
        }),
        None => Config::load().unwrap_or_default(),
    };

    match &cli.command {
        Commands::Sessions(args) => commands::sessions(&cli, &config, args),
        Commands::Info(args) => commands::info(&cli, &config, args),
        Commands::Threads(args) => commands::threads(&cli, &config, args),
        Commands::SessionLog(args) => commands::session_log(&cli, &config, args),
        Commands::ThreadLog(args) => commands::thread_log(&cli, &config, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_json_flag_overrides_output() {
        let cli = Cli::parse_from(["spxsift", "--json", "sessions", "trace.log"]);
        assert_eq!(cli.effective_output(), OutputFormat::Json);

        let cli = Cli::parse_from(["spxsift", "sessions", "trace.log"]);
        assert_eq!(cli.effective_output(), OutputFormat::Text);
    }

    #[test]
    fn test_threads_session_filter() {
        let cli = Cli::parse_from([
            "spxsift",
            "threads",
            "trace.log",
            "-s",
            "abcdef12-3456-7890-abcd-ef1234567890",
        ]);
        let Commands::Threads(args) = &cli.command else {
            panic!("expected threads command");
        };
        assert_eq!(
            args.session_id.as_deref(),
            Some("abcdef12-3456-7890-abcd-ef1234567890")
        );
    }
}
