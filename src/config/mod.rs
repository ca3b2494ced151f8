//! Configuration management for voicerec.
//!
//! Loads the TOML configuration from the user's config directory and resolves the
//! data directories for recordings and playlists.

pub mod file;

pub use file::{get_config_path, VoicerecConfig, VisualizerStyle};
