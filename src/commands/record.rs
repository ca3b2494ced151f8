//! Audio recording with a live amplitude meter.
//!
//! Records from the configured input device while the meter window is drawn
//! in the terminal. The recording is saved to the library on Enter or on
//! SIGUSR1, and discarded on Esc.

use crate::amplitude::{AmplitudeMeter, PowerSource};
use crate::config::VoicerecConfig;
use crate::library::{PlaylistStore, RecordingLibrary};
use crate::recording::{AudioRecorder, MicrophoneAccess, RecorderTui, RecordingCommand};
use crate::ui::report_error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long each loop iteration waits for input; also the redraw cadence.
const FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Shows an error screen for a failure that happens before or outside the TUI.
fn fail(title: &str, err: anyhow::Error, hint: &str) -> anyhow::Error {
    tracing::error!("{}: {}", title, err);
    if let Err(screen_err) = report_error(title, &format!("{err}\n\n{hint}")) {
        tracing::warn!("Failed to show error screen: {}", screen_err);
    }
    err
}

/// Records a new voice memo.
///
/// # Arguments
/// * `playlist` - Playlist (name or id) to add the saved recording to
///
/// # Errors
/// - If configuration is invalid
/// - If the playlist does not exist
/// - If the microphone cannot be opened
/// - If the recording cannot be written
pub async fn handle_record(playlist: Option<String>) -> anyhow::Result<()> {
    tracing::info!("=== voicerec Recorder Started ===");

    let config_data = VoicerecConfig::load().map_err(|err| {
        fail(
            "Configuration Error",
            err,
            "Please check your ~/.config/voicerec/voicerec.toml file and try again.",
        )
    })?;

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, meter={}..{}dB, style={}",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.meter.min_db,
        config_data.meter.max_db,
        config_data.visualization.style
    );

    let library = RecordingLibrary::open(&config_data.recordings_dir()?)?;

    // Resolve the playlist up front so a typo does not cost a take.
    let mut playlists = match &playlist {
        Some(reference) => {
            let store = PlaylistStore::open(&config_data.playlists_path()?)?;
            store.find(reference)?;
            Some(store)
        }
        None => None,
    };

    let access = MicrophoneAccess::request(&config_data.audio.device).map_err(|err| {
        fail(
            "Microphone Error",
            err,
            "Check [audio] device in your config. 'voicerec list-devices' shows what is available.",
        )
    })?;

    let mut audio_recorder = AudioRecorder::new(access, config_data.audio.sample_rate);
    audio_recorder.start_recording().map_err(|err| {
        fail(
            "Recording Error",
            err,
            "Please check your audio configuration and try again.",
        )
    })?;

    let probe: Arc<dyn PowerSource> = Arc::new(audio_recorder.power_probe());
    let mut meter = AmplitudeMeter::new(
        config_data.meter.curve()?,
        config_data.meter.window_capacity,
        config_data.meter.tick_interval(),
    );
    meter.start(Arc::clone(&probe));
    let reader = meter.reader();

    let mut tui = RecorderTui::new(
        config_data.visualization.style,
        config_data.audio.peak_threshold,
    )?;

    let external_save = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&external_save))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    tracing::debug!("Entering recording loop");
    let mut frame_count = 0u64;

    let save = loop {
        if external_save.load(Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: saving via external trigger");
            break true;
        }

        let command = match tui.handle_input(FRAME_INTERVAL) {
            Ok(command) => command,
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                meter.stop();
                tui.cleanup().ok();
                audio_recorder.stop_recording(None).ok();
                return Err(e);
            }
        };

        match command {
            RecordingCommand::Save => break true,
            RecordingCommand::Cancel => break false,
            RecordingCommand::TogglePause => {
                if audio_recorder.toggle_pause() {
                    meter.stop();
                } else {
                    meter.start(Arc::clone(&probe));
                }
            }
            RecordingCommand::CycleStyle | RecordingCommand::Continue => {}
        }

        frame_count += 1;
        if frame_count.is_multiple_of(100) {
            tracing::trace!("Recording: {:.1}s captured", audio_recorder.duration_secs());
        }

        tui.render(&reader.snapshot(), reader.latest())?;
    };

    meter.stop();
    tui.cleanup()?;

    if !save {
        audio_recorder.stop_recording(None)?;
        tracing::info!("Recording cancelled, nothing saved");
        println!("Recording discarded.");
        return Ok(());
    }

    let path = library.new_recording_path();
    let duration = audio_recorder.stop_recording(Some(&path)).map_err(|e| {
        tracing::error!("Failed to save recording: {}", e);
        e
    })?;

    let Some(duration) = duration else {
        println!("Nothing was captured, no recording saved.");
        return Ok(());
    };

    let recording_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    println!("Saved {recording_id} ({duration:.1}s)");

    if let (Some(store), Some(reference)) = (playlists.as_mut(), playlist.as_deref()) {
        store.add_recording(reference, &recording_id)?;
        println!("Added to playlist '{}'", store.find(reference)?.name);
    }

    tracing::info!("=== voicerec Recorder Exited Successfully ===");
    Ok(())
}
