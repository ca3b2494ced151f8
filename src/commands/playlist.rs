//! Playlist management commands.

use crate::commands::list::format_duration;
use crate::config::VoicerecConfig;
use crate::library::{PlaylistStore, Recording, RecordingLibrary};
use anyhow::anyhow;
use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PlaylistAction {
    /// List all playlists
    #[command(visible_alias = "ls")]
    List,

    /// Create an empty playlist
    Create {
        /// Playlist name, unique ignoring case
        name: String,
    },

    /// Show the recordings in a playlist
    Show {
        /// Playlist name or id (a unique id prefix is enough)
        playlist: String,
    },

    /// Add a recording to a playlist
    Add {
        /// Playlist name or id
        playlist: String,
        /// Recording index from 'voicerec list', or recording id
        recording: String,
    },

    /// Remove a recording from a playlist
    #[command(visible_alias = "rm")]
    Remove {
        /// Playlist name or id
        playlist: String,
        /// Recording index from 'voicerec list', or recording id
        recording: String,
    },

    /// Delete a playlist (its recordings are kept)
    Delete {
        /// Playlist name or id
        playlist: String,
    },
}

/// Runs one playlist action.
///
/// # Errors
/// - If configuration cannot be loaded
/// - If the playlist file is unreadable or corrupt
/// - If a playlist or recording reference cannot be resolved
pub fn handle_playlist(action: PlaylistAction) -> anyhow::Result<()> {
    let config_data = VoicerecConfig::load()?;
    let mut store = PlaylistStore::open(&config_data.playlists_path()?)?;
    let library = RecordingLibrary::open(&config_data.recordings_dir()?)?;

    match action {
        PlaylistAction::List => {
            if store.playlists().is_empty() {
                println!("No playlists. Create one with 'voicerec playlist create <NAME>'.");
                return Ok(());
            }
            for playlist in store.playlists() {
                println!(
                    "{}  {:<24}  {} recording(s)",
                    playlist.short_id(),
                    playlist.name,
                    playlist.recordings.len()
                );
            }
        }
        PlaylistAction::Create { name } => {
            let playlist = store.create(&name)?;
            println!("Created playlist '{}' ({})", playlist.name, playlist.short_id());
        }
        PlaylistAction::Show { playlist } => {
            let playlist = store.find(&playlist)?;
            println!("{} ({})", playlist.name, playlist.short_id());
            if playlist.recordings.is_empty() {
                println!("  (empty)");
            }
            let recordings = library.list()?;
            for (position, id) in playlist.recordings.iter().enumerate() {
                let detail = match recordings.iter().find(|r| &r.id == id) {
                    Some(recording) => recording
                        .duration_secs()
                        .map(format_duration)
                        .unwrap_or_else(|| "?".to_string()),
                    None => "missing".to_string(),
                };
                println!("{:>3}  {}  {}", position + 1, id, detail);
            }
        }
        PlaylistAction::Add {
            playlist,
            recording,
        } => {
            let recording = resolve_recording(&library, &recording)?;
            if store.add_recording(&playlist, &recording.id)? {
                println!("Added {} to '{}'", recording.id, store.find(&playlist)?.name);
            } else {
                println!("{} is already in '{}'", recording.id, store.find(&playlist)?.name);
            }
        }
        PlaylistAction::Remove {
            playlist,
            recording,
        } => {
            // Deleted recordings can still be referenced by id.
            let id = match resolve_recording(&library, &recording) {
                Ok(found) => found.id,
                Err(_) => recording,
            };
            if store.remove_recording(&playlist, &id)? {
                println!("Removed {id} from '{}'", store.find(&playlist)?.name);
            } else {
                println!("{id} is not in '{}'", store.find(&playlist)?.name);
            }
        }
        PlaylistAction::Delete { playlist } => {
            let removed = store.delete(&playlist)?;
            println!("Deleted playlist '{}'", removed.name);
        }
    }

    Ok(())
}

/// Resolves a recording given as a list index or as an id.
fn resolve_recording(library: &RecordingLibrary, reference: &str) -> anyhow::Result<Recording> {
    if let Ok(index) = reference.parse::<usize>() {
        return library.get(index);
    }
    library
        .find(reference)?
        .ok_or_else(|| anyhow!("Recording '{reference}' not found. Use 'voicerec list' to see recordings."))
}
