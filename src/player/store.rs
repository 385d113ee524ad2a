// Durable queue state
// The browser build keeps the same snapshot in localStorage; here it is a
// JSON file under the user's config directory. The volume preference is
// keyed separately, in its own file.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::player::queue::QueueSnapshot;

pub trait QueueStore {
    /// `Ok(None)` means no snapshot has ever been written.
    fn load(&self) -> Result<Option<QueueSnapshot>>;
    fn save(&self, snapshot: &QueueSnapshot) -> Result<()>;
}

/// Pretty-printed JSON file, one snapshot per player.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        JsonFileStore { path }
    }

    /// `<config dir>/tubeplayer/playlist.json`.
    pub fn default_location() -> Result<Self> {
        Ok(JsonFileStore::new(config_dir()?.join("playlist.json")))
    }
}

impl QueueStore for JsonFileStore {
    fn load(&self) -> Result<Option<QueueSnapshot>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context("failed to read queue snapshot"),
        };
        let snapshot = serde_json::from_str(&data).context("failed to parse queue snapshot")?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &QueueSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create snapshot directory")?;
        }
        let json =
            serde_json::to_string_pretty(snapshot).context("failed to serialize queue snapshot")?;
        fs::write(&self.path, json).context("failed to write queue snapshot")?;
        Ok(())
    }
}

/// Discards everything; for controllers that should stay purely in memory.
pub struct NullStore;

impl QueueStore for NullStore {
    fn load(&self) -> Result<Option<QueueSnapshot>> {
        Ok(None)
    }

    fn save(&self, _snapshot: &QueueSnapshot) -> Result<()> {
        Ok(())
    }
}

/// Volume preference (0-100), stored as a bare number.
pub struct VolumeStore {
    path: PathBuf,
}

impl VolumeStore {
    pub fn new(path: PathBuf) -> Self {
        VolumeStore { path }
    }

    /// `<config dir>/tubeplayer/volume`.
    pub fn default_location() -> Result<Self> {
        Ok(VolumeStore::new(config_dir()?.join("volume")))
    }

    pub fn load(&self) -> Result<Option<u32>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context("failed to read volume preference"),
        };
        let volume = data
            .trim()
            .parse()
            .context("failed to parse volume preference")?;
        Ok(Some(volume))
    }

    pub fn save(&self, volume: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create preference directory")?;
        }
        fs::write(&self.path, volume.to_string()).context("failed to write volume preference")?;
        Ok(())
    }
}

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("could not find config directory")?
        .join("tubeplayer");
    fs::create_dir_all(&dir).context("failed to create config directory")?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;

    #[test]
    fn missing_snapshot_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("playlist.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn snapshot_roundtrips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("playlist.json"));

        let snapshot = QueueSnapshot {
            queue: vec![Track::new("abc123", "Some Song", "Some Channel")],
            current_index: 0,
            shuffle_mode: true,
            repeat_mode: crate::player::queue::RepeatMode::All,
        };
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap().expect("snapshot present");
        assert_eq!(loaded.queue.len(), 1);
        assert_eq!(loaded.queue[0].id, "abc123");
        assert_eq!(loaded.current_index, 0);
        assert!(loaded.shuffle_mode);
    }

    #[test]
    fn snapshot_uses_the_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.json");
        let store = JsonFileStore::new(path.clone());
        store.save(&QueueSnapshot::default()).unwrap();

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"currentIndex\": -1"));
        assert!(raw.contains("\"shuffleMode\""));
        assert!(raw.contains("\"repeatMode\": \"off\""));
    }

    #[test]
    fn volume_roundtrips_and_defaults_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = VolumeStore::new(dir.path().join("volume"));
        assert!(store.load().unwrap().is_none());
        store.save(35).unwrap();
        assert_eq!(store.load().unwrap(), Some(35));
    }
}
