//! Application orchestration and command routing.
//!
//! Parses the command line and delegates to the command handlers.

use crate::commands::{self, PlaylistAction};
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// A terminal voice memo recorder with a live amplitude meter
#[derive(Parser, Debug)]
#[command(name = "voicerec")]
#[command(version)]
#[command(about = "A terminal voice memo recorder with a live amplitude meter")]
#[command(long_about = "A terminal voice memo recorder with a live amplitude meter.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nEXAMPLES:\n    # Record a memo (Enter saves, Space pauses, v switches style, Esc discards)\n    $ voicerec\n\n    # Record straight into a playlist\n    $ voicerec record -p ideas\n\n    # Save the running recording from another process\n    $ pkill -USR1 voicerec\n\n    # Browse and inspect recordings\n    $ voicerec list\n    $ voicerec show 2\n    $ voicerec show --print")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voicerec/voicerec.toml\n    Recordings:         ~/.local/share/voicerec/recordings\n    Logs:               ~/.local/state/voicerec/voicerec.log.*"
)]
struct Cli {
    /// Add the recording to this playlist (record default command)
    #[arg(short, long, value_name = "PLAYLIST")]
    playlist: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a voice memo with a live amplitude meter (default)
    ///
    /// Press Enter to save, Space to pause/resume, v to change the
    /// visualizer style, Escape/q to discard. SIGUSR1 also saves.
    #[command(visible_alias = "r")]
    Record {
        /// Add the saved recording to this playlist (name or id)
        #[arg(short, long, value_name = "PLAYLIST")]
        playlist: Option<String>,
    },

    /// List stored recordings, most recent first
    #[command(visible_alias = "ls")]
    List,

    /// Show the waveform of a recording
    Show {
        /// Recording index (1 = most recent)
        #[arg(value_name = "N")]
        index: Option<usize>,

        /// Print a one-line waveform to stdout instead of opening a screen
        #[arg(long)]
        print: bool,
    },

    /// Play a recording using the system audio player
    #[command(visible_alias = "p")]
    Play {
        /// Recording index (1 = most recent)
        #[arg(value_name = "N")]
        index: Option<usize>,
    },

    /// Delete a recording and remove it from all playlists
    Delete {
        /// Recording index (1 = most recent)
        #[arg(value_name = "N")]
        index: usize,
    },

    /// Manage playlists
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },

    /// Open configuration file in your preferred editor
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   voicerec completions bash > voicerec.bash
    ///   voicerec completions zsh > _voicerec
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that must work without logging.
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voicerec", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None => commands::handle_record(cli.playlist).await?,
        // An explicit record option wins over the top-level one.
        Some(Commands::Record { playlist }) => {
            commands::handle_record(playlist.or(cli.playlist)).await?
        }
        Some(Commands::List) => commands::handle_list()?,
        Some(Commands::Show { index, print }) => commands::handle_show(index, print).await?,
        Some(Commands::Play { index }) => commands::handle_play(index).await?,
        Some(Commands::Delete { index }) => commands::handle_delete(index)?,
        Some(Commands::Playlist { action }) => commands::handle_playlist(action)?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_record() {
        let cli = Cli::try_parse_from(["voicerec", "-p", "ideas"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.playlist.as_deref(), Some("ideas"));
    }

    #[test]
    fn test_playlist_subcommands_parse() {
        let cli = Cli::try_parse_from(["voicerec", "playlist", "add", "ideas", "3"]).unwrap();
        match cli.command {
            Some(Commands::Playlist { action }) => assert_eq!(
                action,
                PlaylistAction::Add {
                    playlist: "ideas".to_string(),
                    recording: "3".to_string(),
                }
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_show_print_flag() {
        let cli = Cli::try_parse_from(["voicerec", "show", "2", "--print"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Show {
                index: Some(2),
                print: true
            })
        ));
    }
}
