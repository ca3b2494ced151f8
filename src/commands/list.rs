//! Numbered list of stored recordings.

use crate::config::VoicerecConfig;
use crate::library::RecordingLibrary;

/// Prints every recording, newest first, with the index other commands take.
///
/// # Errors
/// - If configuration cannot be loaded
/// - If the recordings directory cannot be read
pub fn handle_list() -> anyhow::Result<()> {
    let config_data = VoicerecConfig::load()?;
    let library = RecordingLibrary::open(&config_data.recordings_dir()?)?;
    let recordings = library.list()?;

    if recordings.is_empty() {
        println!("No recordings yet. Run 'voicerec record' to make one.");
        return Ok(());
    }

    println!();
    println!("  #  {:<19}  {:>8}  {:>9}  id", "date", "length", "size");
    for (i, recording) in recordings.iter().enumerate() {
        let length = recording
            .duration_secs()
            .map(format_duration)
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{:>3}  {}  {:>8}  {:>9}  {}",
            i + 1,
            recording.created_at.format("%Y-%m-%d %H:%M:%S"),
            length,
            format_size(recording.size_bytes),
            recording.id
        );
    }
    println!();
    println!("Stored in {}", library.dir().display());

    Ok(())
}

/// Formats seconds as `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats a byte count with a binary unit.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
