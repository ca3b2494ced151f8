//! Recordings directory management.
//!
//! Recordings are plain WAV files named after the moment recording started,
//! e.g. `Recording-2024-05-01-14-03-59.wav`. The file stem doubles as the
//! recording id referenced by playlists.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "Recording-";
const FILE_EXTENSION: &str = "wav";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// One audio file in the recordings directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// File stem, stable for the lifetime of the file
    pub id: String,
    pub path: PathBuf,
    pub created_at: DateTime<Local>,
    pub size_bytes: u64,
}

impl Recording {
    /// Reads duration from the WAV header without decoding samples.
    pub fn duration_secs(&self) -> Option<f64> {
        let reader = hound::WavReader::open(&self.path).ok()?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return None;
        }
        Some(f64::from(reader.duration()) / f64::from(spec.sample_rate))
    }
}

/// Flat directory of recordings, newest first.
pub struct RecordingLibrary {
    dir: PathBuf,
}

impl RecordingLibrary {
    /// Opens the library, creating its directory if needed.
    ///
    /// # Errors
    /// - If the directory cannot be created
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| anyhow!("Failed to create recordings directory {}: {e}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a recording started now.
    ///
    /// Appends a counter if a recording with the same second already exists.
    pub fn new_recording_path(&self) -> PathBuf {
        self.recording_path_at(Local::now())
    }

    fn recording_path_at(&self, at: DateTime<Local>) -> PathBuf {
        let stem = format!("{FILE_PREFIX}{}", at.format(TIMESTAMP_FORMAT));
        let mut path = self.dir.join(format!("{stem}.{FILE_EXTENSION}"));
        let mut counter = 2;
        while path.exists() {
            path = self.dir.join(format!("{stem}-{counter}.{FILE_EXTENSION}"));
            counter += 1;
        }
        path
    }

    /// Lists all recordings ordered by most recent first.
    ///
    /// # Errors
    /// - If the directory cannot be read
    pub fn list(&self) -> Result<Vec<Recording>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| anyhow!("Failed to read {}: {e}", self.dir.display()))?;

        let mut recordings: Vec<Recording> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().is_some_and(|ext| ext == FILE_EXTENSION) {
                    recording_from_path(&path)
                } else {
                    None
                }
            })
            .collect();

        recordings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(recordings)
    }

    /// Retrieves a recording by 1-based index (1 = most recent).
    ///
    /// # Errors
    /// - If the directory cannot be read
    /// - If the library is empty or the index is out of range
    pub fn get(&self, index: usize) -> Result<Recording> {
        let recordings = self.list()?;
        if recordings.is_empty() {
            return Err(anyhow!("No recordings found in {}", self.dir.display()));
        }
        if index < 1 || index > recordings.len() {
            return Err(anyhow!(
                "Recording index out of range. Available recordings: 1-{}",
                recordings.len()
            ));
        }
        Ok(recordings[index - 1].clone())
    }

    /// Retrieves a recording by id.
    ///
    /// # Errors
    /// - If the directory cannot be read
    pub fn find(&self, id: &str) -> Result<Option<Recording>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Deletes a recording's file.
    ///
    /// # Errors
    /// - If the file cannot be removed
    pub fn delete(&self, recording: &Recording) -> Result<()> {
        fs::remove_file(&recording.path)
            .map_err(|e| anyhow!("Failed to delete {}: {e}", recording.path.display()))?;
        tracing::info!("Deleted recording {}", recording.id);
        Ok(())
    }
}

fn recording_from_path(path: &Path) -> Option<Recording> {
    let id = path.file_stem()?.to_string_lossy().to_string();
    let metadata = fs::metadata(path).ok()?;
    let created_at = parse_timestamp(&id)
        .or_else(|| metadata.created().ok().map(DateTime::<Local>::from))
        .or_else(|| metadata.modified().ok().map(DateTime::<Local>::from))
        .unwrap_or_else(Local::now);

    Some(Recording {
        id,
        path: path.to_path_buf(),
        created_at,
        size_bytes: metadata.len(),
    })
}

/// Parses the timestamp out of a `Recording-YYYY-MM-DD-HH-MM-SS[-N]` stem.
fn parse_timestamp(stem: &str) -> Option<DateTime<Local>> {
    let rest = stem.strip_prefix(FILE_PREFIX)?;
    // "YYYY-MM-DD-HH-MM-SS" is 19 characters; anything after is a counter.
    let stamp = rest.get(..19)?;
    let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"RIFF").unwrap();
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("Recording-2024-05-01-14-03-59").unwrap();
        assert_eq!(parsed.format(TIMESTAMP_FORMAT).to_string(), "2024-05-01-14-03-59");

        let with_counter = parse_timestamp("Recording-2024-05-01-14-03-59-2").unwrap();
        assert_eq!(with_counter, parsed);

        assert!(parse_timestamp("memo").is_none());
        assert!(parse_timestamp("Recording-yesterday").is_none());
    }

    #[test]
    fn test_list_orders_newest_first_and_skips_other_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Recording-2024-01-01-10-00-00.wav");
        touch(dir.path(), "Recording-2024-03-01-10-00-00.wav");
        touch(dir.path(), "Recording-2024-02-01-10-00-00.wav");
        touch(dir.path(), "notes.txt");

        let library = RecordingLibrary::open(dir.path()).unwrap();
        let ids: Vec<String> = library.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                "Recording-2024-03-01-10-00-00",
                "Recording-2024-02-01-10-00-00",
                "Recording-2024-01-01-10-00-00",
            ]
        );
    }

    #[test]
    fn test_get_by_index() {
        let dir = tempdir().unwrap();
        let library = RecordingLibrary::open(dir.path()).unwrap();
        assert!(library.get(1).is_err());

        touch(dir.path(), "Recording-2024-01-01-10-00-00.wav");
        touch(dir.path(), "Recording-2024-01-02-10-00-00.wav");

        assert_eq!(library.get(1).unwrap().id, "Recording-2024-01-02-10-00-00");
        assert_eq!(library.get(2).unwrap().id, "Recording-2024-01-01-10-00-00");
        assert!(library.get(0).is_err());
        assert!(library.get(3).is_err());
    }

    #[test]
    fn test_new_recording_path_avoids_collisions() {
        let dir = tempdir().unwrap();
        let library = RecordingLibrary::open(dir.path()).unwrap();
        let at = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();

        let first = library.recording_path_at(at);
        assert_eq!(
            first.file_name().unwrap(),
            "Recording-2024-06-01-09-30-00.wav"
        );
        fs::write(&first, b"RIFF").unwrap();

        let second = library.recording_path_at(at);
        assert_eq!(
            second.file_name().unwrap(),
            "Recording-2024-06-01-09-30-00-2.wav"
        );
    }

    #[test]
    fn test_find_and_delete() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Recording-2024-01-01-10-00-00.wav");
        let library = RecordingLibrary::open(dir.path()).unwrap();

        let recording = library
            .find("Recording-2024-01-01-10-00-00")
            .unwrap()
            .unwrap();
        library.delete(&recording).unwrap();

        assert!(library.find("Recording-2024-01-01-10-00-00").unwrap().is_none());
        assert!(library.list().unwrap().is_empty());
    }

    #[test]
    fn test_duration_from_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Recording-2024-01-01-10-00-00.wav");
        crate::recording::audio::write_wav(&vec![0i16; 8000], 16000, &path).unwrap();

        let library = RecordingLibrary::open(dir.path()).unwrap();
        let recording = library.get(1).unwrap();
        assert_eq!(recording.duration_secs(), Some(0.5));
    }
}
