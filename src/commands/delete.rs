//! Delete a stored recording.

use crate::config::VoicerecConfig;
use crate::library::{PlaylistStore, RecordingLibrary};

/// Deletes recording `index` and drops it from every playlist.
///
/// # Errors
/// - If the recording does not exist
/// - If the file cannot be removed
/// - If the playlists cannot be updated
pub fn handle_delete(index: usize) -> anyhow::Result<()> {
    let config_data = VoicerecConfig::load()?;
    let library = RecordingLibrary::open(&config_data.recordings_dir()?)?;
    let recording = library.get(index)?;

    // Open first: a corrupt playlist file should stop us before the file is gone.
    let mut playlists = PlaylistStore::open(&config_data.playlists_path()?)?;

    library.delete(&recording)?;
    let affected = playlists.forget_recording(&recording.id)?;

    println!("Deleted {}", recording.id);
    if affected > 0 {
        println!("Removed from {affected} playlist(s)");
    }
    Ok(())
}
