//! Stepwise - lesson progression for guided learning
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stepwise::config::{crash_log_path, Config};
use stepwise::core::{Catalog, Track};
use stepwise::error::exit_codes;
use stepwise::storage::FileProgressStore;
use stepwise::util::read_to_string_limited;

// =============================================================================
// CLI Definition
// =============================================================================

/// Stepwise - lesson progression, unlock rules and badges
#[derive(Parser)]
#[command(name = "stepwise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tracks, levels and lessons with their states
    Status {
        /// Only show this track
        #[arg(long, value_enum)]
        track: Option<TrackArg>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Submit code for a lesson
    Submit {
        /// Lesson ID
        lesson_id: String,
        /// Code to submit
        #[arg(long, short, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,
        /// Read the code from a file
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Skip the simulated execution delay
        #[arg(long)]
        no_delay: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show a hint for a lesson
    Hint {
        /// Lesson ID
        lesson_id: String,
        /// Hint position, starting at 0
        #[arg(long, short, default_value_t = 0)]
        index: usize,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List earned and locked badges
    Badges {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Select the learning track
    Track {
        /// Track to select
        #[arg(value_enum)]
        track: TrackArg,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Mark onboarding as completed
    Onboard {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Reset all progress (the selected track is kept)
    Reset {
        /// Remove the stored record entirely
        #[arg(long)]
        clear: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

/// Track names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TrackArg {
    Swift,
    #[value(name = "swiftui", alias = "swift-ui")]
    SwiftUi,
}

impl From<TrackArg> for Track {
    fn from(arg: TrackArg) -> Self {
        match arg {
            TrackArg::Swift => Track::Swift,
            TrackArg::SwiftUi => Track::SwiftUi,
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("stepwise error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Install the log subscriber. Logs go to stderr so JSON output stays clean.
fn setup_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.stepwise/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("stepwise panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status { track, json, quiet } => run_status(track.map(Track::from), json, quiet),
        Commands::Submit {
            lesson_id,
            code,
            file,
            no_delay,
            json,
            quiet,
        } => run_submit(&lesson_id, code, file, no_delay, json, quiet),
        Commands::Hint {
            lesson_id,
            index,
            json,
            quiet,
        } => run_hint(&lesson_id, index, json, quiet),
        Commands::Badges { json, quiet } => run_badges(json, quiet),
        Commands::Track { track, json, quiet } => run_track(track.into(), json, quiet),
        Commands::Onboard { json, quiet } => run_onboard(json, quiet),
        Commands::Reset { clear, json, quiet } => run_reset(clear, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Load config, open the progress record and resolve the catalog.
fn open() -> Result<(FileProgressStore, Catalog, Config), Box<dyn std::error::Error>> {
    let config = Config::load_fail_open();
    let store = FileProgressStore::new(&config.storage.record_name)?;
    let catalog = Catalog::load_or_builtin(config.content.path.as_deref());
    Ok((store, catalog, config))
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::OK as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
}

fn run_status(
    track: Option<Track>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::status::{StatusCommand, StatusOptions};

    let (store, catalog, config) = open()?;
    let cmd = StatusCommand::new(store, catalog, config);
    let options = StatusOptions { json, quiet, track };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(true))
}

fn run_submit(
    lesson_id: &str,
    code: Option<String>,
    file: Option<PathBuf>,
    no_delay: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::submit::{SubmitCommand, SubmitOptions};

    let code = match (code, file) {
        (Some(code), _) => code,
        (None, Some(path)) => read_to_string_limited(&path)?,
        (None, None) => String::new(),
    };

    let (store, catalog, config) = open()?;
    let mut cmd = SubmitCommand::new(store, catalog, config);
    let options = SubmitOptions {
        json,
        quiet,
        no_delay,
    };

    let output = cmd.run(lesson_id, &code, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_hint(
    lesson_id: &str,
    index: usize,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::hint::{HintCommand, HintOptions};

    let (store, catalog, config) = open()?;
    let cmd = HintCommand::new(store, catalog, config);
    let options = HintOptions { json, quiet, index };

    let output = cmd.run(lesson_id, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_badges(json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::badges_cmd::{BadgesCommand, BadgesOptions};

    let (store, catalog, config) = open()?;
    let cmd = BadgesCommand::new(store, catalog, config);
    let options = BadgesOptions { json, quiet };

    let output = cmd.run();
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(true))
}

fn run_track(track: Track, json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::track::{TrackCommand, TrackOptions};

    let (store, catalog, config) = open()?;
    let mut cmd = TrackCommand::new(store, catalog, config);
    let options = TrackOptions { json, quiet };

    let output = cmd.run(track);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_onboard(json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::onboard::{OnboardCommand, OnboardOptions};

    let (store, catalog, config) = open()?;
    let mut cmd = OnboardCommand::new(store, catalog, config);
    let options = OnboardOptions { json, quiet };

    let output = cmd.run();
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_reset(clear: bool, json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stepwise::cli::reset::{ResetCommand, ResetOptions};

    let (store, catalog, config) = open()?;
    let mut cmd = ResetCommand::new(store, catalog, config);
    let options = ResetOptions { json, quiet, clear };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::OK, 0);
        assert_eq!(exit_codes::ERROR, 1);
        assert_eq!(exit_codes::CRASH, 3);
    }

    #[test]
    fn test_success_to_exit_code() {
        assert_eq!(success_to_exit_code(true), ExitCode::from(exit_codes::OK as u8));
        assert_eq!(
            success_to_exit_code(false),
            ExitCode::from(exit_codes::ERROR as u8)
        );
    }

    #[test]
    fn test_track_arg_conversion() {
        assert_eq!(Track::from(TrackArg::Swift), Track::Swift);
        assert_eq!(Track::from(TrackArg::SwiftUi), Track::SwiftUi);
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["stepwise", "status", "--track", "swiftui", "--json"]);
        match cli.command {
            Commands::Status { track, json, quiet } => {
                assert_eq!(track, Some(TrackArg::SwiftUi));
                assert!(json);
                assert!(!quiet);
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_parse_submit_code() {
        let cli = Cli::parse_from([
            "stepwise",
            "submit",
            "swift-0-variables",
            "--code",
            "var message = \"Hello, World!\"",
            "--no-delay",
        ]);
        match cli.command {
            Commands::Submit {
                lesson_id,
                code,
                file,
                no_delay,
                ..
            } => {
                assert_eq!(lesson_id, "swift-0-variables");
                assert_eq!(code.as_deref(), Some("var message = \"Hello, World!\""));
                assert!(file.is_none());
                assert!(no_delay);
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_cli_parse_submit_file() {
        let cli = Cli::parse_from(["stepwise", "submit", "l1", "--file", "answer.swift"]);
        match cli.command {
            Commands::Submit { code, file, .. } => {
                assert!(code.is_none());
                assert_eq!(file, Some(PathBuf::from("answer.swift")));
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_cli_submit_requires_code_or_file() {
        assert!(Cli::try_parse_from(["stepwise", "submit", "l1"]).is_err());
        assert!(Cli::try_parse_from([
            "stepwise", "submit", "l1", "--code", "x", "--file", "y"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parse_hint() {
        let cli = Cli::parse_from(["stepwise", "hint", "l1", "--index", "2"]);
        match cli.command {
            Commands::Hint {
                lesson_id, index, ..
            } => {
                assert_eq!(lesson_id, "l1");
                assert_eq!(index, 2);
            }
            _ => panic!("Expected Hint command"),
        }
    }

    #[test]
    fn test_cli_parse_track() {
        let cli = Cli::parse_from(["stepwise", "track", "swift-ui"]);
        match cli.command {
            Commands::Track { track, .. } => assert_eq!(track, TrackArg::SwiftUi),
            _ => panic!("Expected Track command"),
        }
        assert!(Cli::try_parse_from(["stepwise", "track", "kotlin"]).is_err());
    }

    #[test]
    fn test_cli_parse_reset() {
        let cli = Cli::parse_from(["stepwise", "reset", "--clear", "-q"]);
        match cli.command {
            Commands::Reset { clear, quiet, .. } => {
                assert!(clear);
                assert!(quiet);
            }
            _ => panic!("Expected Reset command"),
        }
    }

    #[test]
    fn test_cli_parse_badges_and_onboard() {
        assert!(matches!(
            Cli::parse_from(["stepwise", "badges", "--json"]).command,
            Commands::Badges { json: true, .. }
        ));
        assert!(matches!(
            Cli::parse_from(["stepwise", "onboard"]).command,
            Commands::Onboard { .. }
        ));
    }
}
