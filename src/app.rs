//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If config file doesn't exist, runs full setup
/// 2. If config version is older than app version, runs setup and logs migration
/// 3. If config version matches app version, does nothing
async fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = crate::config::file::get_config_path()
        .map_err(|e| anyhow!("Could not determine config path: {e}"))?;

    match crate::setup::version::check_setup_needed(&config_path)? {
        Some(old_version) => {
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - migrated to version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A terminal voice-memo pad
#[derive(Parser)]
#[command(name = "voxpad")]
#[command(version)]
#[command(about = "A terminal voice-memo pad")]
#[command(
    long_about = "A terminal voice-memo pad.\n\nRecord a memo from the microphone, review the draft, then save it to the\ntake list or export it as a file. Existing audio files can be imported as\ndrafts too.\n\nDEFAULT COMMAND:\n    If no command is specified, the pad opens directly.\n    An audio file argument is loaded as the initial draft.\n\nEXAMPLES:\n    # Open the pad\n    $ voxpad\n\n    # Open with an existing file as the draft\n    $ voxpad memo.wav\n    $ voxpad open memo.wav\n\n    # Pick the capture device interactively\n    $ voxpad device\n\n    # Edit configuration file\n    $ voxpad config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voxpad/voxpad.toml\n    Exports:            ~/Downloads by default, override in config\n    Logs:               ~/.local/state/voxpad/voxpad.log.*\n\nKEYS (inside the pad):\n    r record/stop, p play draft, s save draft, d export draft, i import,\n    Up/Down select take, Enter play, e export, x delete, q quit"
)]
struct Cli {
    /// Audio file to load as the initial draft (open default command)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the voice-memo pad (default)
    ///
    /// Press r to record, p to play the draft, s to save it to the take
    /// list, d to export it. Imported and recorded drafts behave the same.
    #[command(visible_alias = "o")]
    Open {
        /// Audio file to load as the initial draft
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Select the capture device interactively
    ///
    /// Lists available input devices and writes the chosen one to the
    /// config file. "default" defers to the system default device.
    #[command(visible_alias = "d")]
    Device,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio settings, export directory, and other configuration.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in voxpad.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   voxpad completions bash > voxpad.bash
    ///   voxpad completions zsh > _voxpad
    ///   voxpad completions fish > voxpad.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails (e.g., recording or device selection)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxpad", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup().await?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Open { .. }) => {
            // Default command is open
            // Merge the top-level file argument with the explicit open form;
            // the explicit form takes precedence when both are given
            let file = match cli.command {
                Some(Commands::Open { file }) => file.or(cli.file),
                None => cli.file,
                _ => unreachable!(),
            };
            commands::handle_pad(file).await?;
        }
        Some(Commands::Device) => {
            if let Err(e) = commands::handle_device().await {
                // Check if it's a cancellation error (cliclack already displayed the message)
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
