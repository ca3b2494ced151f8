//! Application command handlers for voicerec.
//!
//! # Commands
//! - `record`: Record a voice memo with a live amplitude meter
//! - `list`: List stored recordings
//! - `show`: Waveform of a stored recording
//! - `play`: Play a recording with the system player
//! - `delete`: Delete a recording
//! - `playlist`: Playlist management
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod delete;
pub mod list;
pub mod list_devices;
pub mod logs;
pub mod play;
pub mod playlist;
pub mod record;
pub mod show;

pub use config::handle_config;
pub use delete::handle_delete;
pub use list::handle_list;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use play::handle_play;
pub use playlist::{handle_playlist, PlaylistAction};
pub use record::handle_record;
pub use show::handle_show;
