//! Play a stored recording with the system audio player.

use crate::config::VoicerecConfig;
use crate::library::RecordingLibrary;
use std::path::Path;
use std::process::Command;

/// Players tried on Linux when `xdg-open` is unavailable.
#[cfg(target_os = "linux")]
const FALLBACK_PLAYERS: [&str; 4] = ["mpv", "vlc", "ffplay", "paplay"];

/// Plays recording `index` (1 = most recent, default).
///
/// On macOS the default application is used via `open`. On Linux `xdg-open`
/// is tried first, then common players.
///
/// # Errors
/// - If the recording does not exist
/// - If no player could be started
pub async fn handle_play(index: Option<usize>) -> anyhow::Result<()> {
    let config_data = VoicerecConfig::load()?;
    let library = RecordingLibrary::open(&config_data.recordings_dir()?)?;

    let index = index.unwrap_or(1);
    let recording = library.get(index)?;

    tracing::info!(
        "Playing recording #{} from {}",
        index,
        recording.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    play_file(&recording.path)?;

    tracing::info!("Playback finished for recording #{}", index);
    Ok(())
}

#[cfg(target_os = "macos")]
fn play_file(path: &Path) -> anyhow::Result<()> {
    Command::new("open")
        .arg(path)
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to open audio player: {e}"))?
        .wait()
        .map_err(|e| anyhow::anyhow!("Audio player error: {e}"))?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn play_file(path: &Path) -> anyhow::Result<()> {
    if let Ok(mut child) = Command::new("xdg-open").arg(path).spawn() {
        child
            .wait()
            .map_err(|e| anyhow::anyhow!("Audio player error: {e}"))?;
        return Ok(());
    }

    for player in FALLBACK_PLAYERS {
        if let Ok(mut child) = Command::new(player).arg(path).spawn() {
            tracing::debug!("Playing with {}", player);
            let _ = child.wait();
            return Ok(());
        }
    }

    Err(anyhow::anyhow!(
        "No audio player found. Install mpv, vlc, ffplay, or paplay"
    ))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn play_file(path: &Path) -> anyhow::Result<()> {
    Err(anyhow::anyhow!(
        "Playback is not supported on this platform. The file is at {}",
        path.display()
    ))
}
