//! Waveform of a stored recording.

use crate::amplitude::{load_envelope, MonoDecoder, WavDecoder};
use crate::config::VoicerecConfig;
use crate::library::RecordingLibrary;
use crate::recording::visualizations::block_line;
use crate::ui::WaveformScreen;
use std::sync::Arc;

/// Width used for `--print` when stdout is not a terminal.
const FALLBACK_PRINT_WIDTH: usize = 80;

/// Shows the waveform of recording `index` (1 = most recent).
///
/// With `print`, writes a single line of block characters to stdout instead
/// of opening the full-screen view.
///
/// # Errors
/// - If configuration cannot be loaded
/// - If the recording does not exist
/// - If the file cannot be decoded (print mode; the screen shows it instead)
pub async fn handle_show(index: Option<usize>, print: bool) -> anyhow::Result<()> {
    let config_data = VoicerecConfig::load()?;
    let library = RecordingLibrary::open(&config_data.recordings_dir()?)?;
    let recording = library.get(index.unwrap_or(1))?;
    let decoder: Arc<dyn MonoDecoder> = Arc::new(WavDecoder);

    tracing::info!("Showing waveform of {}", recording.id);

    if print {
        let width = crossterm::terminal::size()
            .map(|(columns, _)| usize::from(columns))
            .unwrap_or(FALLBACK_PRINT_WIDTH);
        let resolution = config_data.waveform.resolution.min(width.max(1));

        let envelope = load_envelope(decoder, recording.path.clone(), resolution).await?;
        println!("{}", block_line(envelope.peaks()));
        return Ok(());
    }

    let task = tokio::spawn(load_envelope(
        decoder,
        recording.path.clone(),
        config_data.waveform.resolution,
    ));

    let mut screen = WaveformScreen::new()?;
    let result = screen.run(&recording.id, task).await;
    screen.cleanup()?;
    result
}
