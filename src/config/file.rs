//! Configuration file management for voicerec.
//!
//! This module handles loading application configuration from TOML files.
//! Configuration is stored in the user's config directory and is created from an
//! embedded default on first run.

use crate::amplitude::envelope::DEFAULT_RESOLUTION;
use crate::amplitude::meter::{DEFAULT_CAPACITY, DEFAULT_TICK_INTERVAL};
use crate::amplitude::normalize::{
    DEFAULT_EXPONENT, DEFAULT_FLOOR, DEFAULT_MAX_DB, DEFAULT_MIN_DB,
};
use crate::amplitude::NormalizationCurve;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/voicerec.toml");

/// Visualizer style for the live recording display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisualizerStyle {
    /// Vertical bars rising from the bottom edge
    #[default]
    Bars,
    /// Connected polyline through the window samples
    Line,
    /// Bars reflected around the horizontal centre line
    Mirror,
}

impl VisualizerStyle {
    /// Next style in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Bars => Self::Line,
            Self::Line => Self::Mirror,
            Self::Mirror => Self::Bars,
        }
    }
}

impl std::fmt::Display for VisualizerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bars => write!(f, "bars"),
            Self::Line => write!(f, "line"),
            Self::Mirror => write!(f, "mirror"),
        }
    }
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `voicerec list-devices`
    /// - device name from `voicerec list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested recording sample rate in Hz (the device rate wins if they differ)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Meter amplitude (0-1) at which the level readout turns red
    #[serde(default = "default_peak_threshold")]
    pub peak_threshold: f32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_peak_threshold() -> f32 {
    0.9
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            peak_threshold: default_peak_threshold(),
        }
    }
}

/// Live meter configuration: response curve, window size and tick rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterConfig {
    /// Reading treated as silence, in dBFS
    #[serde(default = "default_min_db")]
    pub min_db: f32,
    /// Reading treated as full scale, in dBFS
    #[serde(default = "default_max_db")]
    pub max_db: f32,
    /// Power applied after linear rescaling (2.0 = squared response)
    #[serde(default = "default_curve_exponent")]
    pub curve_exponent: f32,
    /// Minimum displayed height for a live reading (0 disables)
    #[serde(default = "default_floor")]
    pub floor: f32,
    /// Number of samples in the sliding window
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// Milliseconds between meter ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_min_db() -> f32 {
    DEFAULT_MIN_DB
}

fn default_max_db() -> f32 {
    DEFAULT_MAX_DB
}

fn default_curve_exponent() -> f32 {
    DEFAULT_EXPONENT
}

fn default_floor() -> f32 {
    DEFAULT_FLOOR
}

fn default_window_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            min_db: default_min_db(),
            max_db: default_max_db(),
            curve_exponent: default_curve_exponent(),
            floor: default_floor(),
            window_capacity: default_window_capacity(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl MeterConfig {
    /// Builds the normalization curve described by this section.
    ///
    /// # Errors
    /// - If the decibel range, exponent or floor is invalid
    pub fn curve(&self) -> anyhow::Result<NormalizationCurve> {
        NormalizationCurve::new(self.min_db, self.max_db, self.curve_exponent, self.floor)
            .map_err(|e| anyhow!("Invalid [meter] settings: {e}"))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Stored-file waveform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Number of peak buckets computed per recording
    #[serde(default = "default_resolution")]
    pub resolution: usize,
}

fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
        }
    }
}

/// Visualization configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Style of the live display: "bars", "line" or "mirror"
    #[serde(default)]
    pub style: VisualizerStyle,
}

/// Where recordings and playlists are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for recordings. Defaults to ~/.local/share/voicerec/recordings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recordings_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoicerecConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub meter: MeterConfig,
    #[serde(default)]
    pub waveform: WaveformConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl VoicerecConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// Writes the default configuration first if no file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read or created
    /// - If the TOML is malformed or a value is out of range
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        ensure_config_file(&config_path)?;
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed or a value is out of range
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
        let config: VoicerecConfig = toml::from_str(&config_content)
            .map_err(|e| anyhow!("Failed to parse {}: {e}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot express as types.
    ///
    /// # Errors
    /// - If the meter curve is invalid
    /// - If the window capacity, tick interval or waveform resolution is zero
    /// - If the peak threshold is outside 0-1
    pub fn validate(&self) -> anyhow::Result<()> {
        self.meter.curve()?;

        if self.meter.window_capacity == 0 {
            return Err(anyhow!("[meter] window_capacity must be at least 1"));
        }
        if self.meter.tick_interval_ms == 0 {
            return Err(anyhow!("[meter] tick_interval_ms must be at least 1"));
        }
        if self.waveform.resolution == 0 {
            return Err(anyhow!("[waveform] resolution must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.audio.peak_threshold) {
            return Err(anyhow!(
                "[audio] peak_threshold must be between 0 and 1, got {}",
                self.audio.peak_threshold
            ));
        }

        Ok(())
    }

    /// Directory holding the recording files.
    ///
    /// # Errors
    /// - If the home directory cannot be determined
    pub fn recordings_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.storage.recordings_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_data_dir()?.join("recordings")),
        }
    }

    /// Path of the playlists file.
    ///
    /// # Errors
    /// - If the home directory cannot be determined
    pub fn playlists_path(&self) -> anyhow::Result<PathBuf> {
        Ok(get_data_dir()?.join("playlists.json"))
    }
}

/// Writes the embedded default configuration if `path` does not exist.
///
/// # Errors
/// - If the parent directory or the file cannot be created
pub fn ensure_config_file(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| anyhow!("Failed to write default config {}: {e}", path.display()))?;
    tracing::info!("Default configuration written to {}", path.display());
    Ok(())
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".config")
        .join("voicerec");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("voicerec.toml"))
}

/// Retrieves the data directory (recordings, playlists).
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("voicerec");
    Ok(data_dir)
}
