//! Playlist storage.
//!
//! Playlists are kept as one JSON list in `playlists.json` next to the
//! recordings. They reference recordings by id (file stem), never by path, so
//! moving the recordings directory keeps playlists intact.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A named, ordered list of recording ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub recordings: Vec<String>,
    pub created_at: DateTime<Local>,
}

impl Playlist {
    fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            recordings: Vec::new(),
            created_at: Local::now(),
        }
    }

    /// First eight characters of the id, enough to address it on the command line.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// All playlists, saved after every change.
pub struct PlaylistStore {
    path: PathBuf,
    playlists: Vec<Playlist>,
}

impl PlaylistStore {
    /// Loads playlists from `path`; a missing file is an empty store.
    ///
    /// # Errors
    /// - If the file exists but cannot be read
    /// - If the file is not a valid playlist list (it is left untouched)
    pub fn open(path: &Path) -> Result<Self> {
        let playlists = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
            serde_json::from_str(&content).map_err(|e| {
                anyhow!(
                    "Playlist file {} is corrupt ({e}). Fix or remove it to continue.",
                    path.display()
                )
            })?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            playlists,
        })
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Resolves a playlist by exact id, unique id prefix or name (case-insensitive).
    ///
    /// # Errors
    /// - If nothing matches or the prefix is ambiguous
    pub fn find(&self, reference: &str) -> Result<&Playlist> {
        let index = self.position(reference)?;
        Ok(&self.playlists[index])
    }

    /// Creates an empty playlist.
    ///
    /// # Errors
    /// - If the name is empty or already taken
    /// - If the store cannot be saved
    pub fn create(&mut self, name: &str) -> Result<&Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Playlist name cannot be empty"));
        }
        if self
            .playlists
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Err(anyhow!("A playlist named '{name}' already exists"));
        }

        self.playlists.push(Playlist::new(name));
        self.save()?;

        let created = &self.playlists[self.playlists.len() - 1];
        tracing::info!("Playlist created: {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Appends a recording to a playlist. Adding a recording twice is a no-op.
    ///
    /// Returns whether the playlist changed.
    ///
    /// # Errors
    /// - If the playlist cannot be resolved
    /// - If the store cannot be saved
    pub fn add_recording(&mut self, reference: &str, recording_id: &str) -> Result<bool> {
        let index = self.position(reference)?;
        let playlist = &mut self.playlists[index];

        if playlist.recordings.iter().any(|r| r == recording_id) {
            tracing::debug!("{} already in playlist {}", recording_id, playlist.name);
            return Ok(false);
        }

        playlist.recordings.push(recording_id.to_string());
        tracing::info!("Added {} to playlist {}", recording_id, playlist.name);
        self.save()?;
        Ok(true)
    }

    /// Removes a recording from a playlist.
    ///
    /// Returns whether the recording was in the playlist.
    ///
    /// # Errors
    /// - If the playlist cannot be resolved
    /// - If the store cannot be saved
    pub fn remove_recording(&mut self, reference: &str, recording_id: &str) -> Result<bool> {
        let index = self.position(reference)?;
        let playlist = &mut self.playlists[index];

        let before = playlist.recordings.len();
        playlist.recordings.retain(|r| r != recording_id);
        if playlist.recordings.len() == before {
            return Ok(false);
        }

        tracing::info!("Removed {} from playlist {}", recording_id, playlist.name);
        self.save()?;
        Ok(true)
    }

    /// Deletes a playlist. The recordings themselves are kept.
    ///
    /// # Errors
    /// - If the playlist cannot be resolved
    /// - If the store cannot be saved
    pub fn delete(&mut self, reference: &str) -> Result<Playlist> {
        let index = self.position(reference)?;
        let removed = self.playlists.remove(index);
        self.save()?;
        tracing::info!("Playlist deleted: {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Drops a recording from every playlist, e.g. after its file was deleted.
    ///
    /// Returns the number of playlists that referenced it.
    ///
    /// # Errors
    /// - If the store cannot be saved
    pub fn forget_recording(&mut self, recording_id: &str) -> Result<usize> {
        let mut affected = 0;
        for playlist in self.playlists.iter_mut() {
            let before = playlist.recordings.len();
            playlist.recordings.retain(|r| r != recording_id);
            if playlist.recordings.len() != before {
                affected += 1;
            }
        }

        if affected > 0 {
            self.save()?;
        }
        Ok(affected)
    }

    fn position(&self, reference: &str) -> Result<usize> {
        let reference = reference.trim();

        if let Ok(id) = Uuid::parse_str(reference) {
            if let Some(index) = self.playlists.iter().position(|p| p.id == id) {
                return Ok(index);
            }
        }

        if let Some(index) = self
            .playlists
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(reference))
        {
            return Ok(index);
        }

        let prefix = reference.to_ascii_lowercase().replace('-', "");
        if !prefix.is_empty() {
            let matches: Vec<usize> = self
                .playlists
                .iter()
                .enumerate()
                .filter(|(_, p)| p.id.simple().to_string().starts_with(&prefix))
                .map(|(index, _)| index)
                .collect();

            match matches.as_slice() {
                [index] => return Ok(*index),
                [] => {}
                _ => return Err(anyhow!("Playlist id prefix '{reference}' is ambiguous")),
            }
        }

        Err(anyhow!(
            "Playlist '{reference}' not found. Use 'voicerec playlist list' to see playlists."
        ))
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.playlists)?;
        fs::write(&self.path, json)
            .map_err(|e| anyhow!("Failed to write {}: {e}", self.path.display()))?;
        tracing::debug!("Playlists saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &Path) -> PlaylistStore {
        PlaylistStore::open(&dir.join("playlists.json")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        assert!(store(dir.path()).playlists().is_empty());
    }

    #[test]
    fn test_create_and_reload() {
        let dir = tempdir().unwrap();
        let id = {
            let mut playlists = store(dir.path());
            playlists.create("Interviews").unwrap().id
        };

        let reloaded = store(dir.path());
        assert_eq!(reloaded.playlists().len(), 1);
        assert_eq!(reloaded.playlists()[0].id, id);
        assert_eq!(reloaded.playlists()[0].name, "Interviews");
    }

    #[test]
    fn test_create_rejects_empty_and_duplicate_names() {
        let dir = tempdir().unwrap();
        let mut playlists = store(dir.path());
        playlists.create("Ideas").unwrap();

        assert!(playlists.create("   ").is_err());
        assert!(playlists.create("ideas").is_err());
        assert_eq!(playlists.playlists().len(), 1);
    }

    #[test]
    fn test_add_and_remove_keep_playlist_id() {
        let dir = tempdir().unwrap();
        let mut playlists = store(dir.path());
        let id = playlists.create("Ideas").unwrap().id;

        assert!(playlists.add_recording("Ideas", "Recording-a").unwrap());
        assert!(playlists.add_recording("ideas", "Recording-b").unwrap());
        assert!(!playlists.add_recording("Ideas", "Recording-a").unwrap());

        let playlist = playlists.find("Ideas").unwrap();
        assert_eq!(playlist.id, id);
        assert_eq!(playlist.recordings, vec!["Recording-a", "Recording-b"]);

        assert!(playlists.remove_recording("Ideas", "Recording-a").unwrap());
        assert!(!playlists.remove_recording("Ideas", "Recording-a").unwrap());

        let reloaded = store(dir.path());
        assert_eq!(reloaded.find("Ideas").unwrap().recordings, vec!["Recording-b"]);
        assert_eq!(reloaded.find("Ideas").unwrap().id, id);
    }

    #[test]
    fn test_find_by_id_and_prefix() {
        let dir = tempdir().unwrap();
        let mut playlists = store(dir.path());
        let playlist = playlists.create("Ideas").unwrap().clone();

        assert_eq!(playlists.find(&playlist.id.to_string()).unwrap().name, "Ideas");
        assert_eq!(playlists.find(&playlist.short_id()).unwrap().name, "Ideas");
        assert!(playlists.find("Nope").is_err());
    }

    #[test]
    fn test_delete_and_forget_recording() {
        let dir = tempdir().unwrap();
        let mut playlists = store(dir.path());
        playlists.create("One").unwrap();
        playlists.create("Two").unwrap();
        playlists.add_recording("One", "Recording-x").unwrap();
        playlists.add_recording("Two", "Recording-x").unwrap();
        playlists.add_recording("Two", "Recording-y").unwrap();

        assert_eq!(playlists.forget_recording("Recording-x").unwrap(), 2);
        assert_eq!(playlists.forget_recording("Recording-x").unwrap(), 0);

        let removed = playlists.delete("One").unwrap();
        assert_eq!(removed.name, "One");

        let reloaded = store(dir.path());
        assert_eq!(reloaded.playlists().len(), 1);
        assert_eq!(reloaded.playlists()[0].recordings, vec!["Recording-y"]);
    }

    #[test]
    fn test_corrupt_file_is_an_error_and_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("playlists.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(PlaylistStore::open(&path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
