//! Stored recordings and the playlists that group them.

pub mod playlists;
pub mod recordings;

pub use playlists::{Playlist, PlaylistStore};
pub use recordings::{Recording, RecordingLibrary};
