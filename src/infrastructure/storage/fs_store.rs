use crate::domain::storage::{Storage, StorageKeys};
use crate::domain::{Event, ListingRecord, Movie};
use crate::error::Result;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn get_path_for_key(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }

    /// Replaces whatever was stored under `key` with `data`, pretty-printed.
    fn write_json_file<T: serde::Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        self.ensure_dir()?;

        let path = self.get_path_for_key(key);
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&path, content)?;
        info!("Wrote {:?}", path);
        Ok(())
    }
}

impl Storage for FileSystemStore {
    fn has_listings(&self, key: &str) -> bool {
        self.get_path_for_key(key).exists()
    }

    fn save_listings(&self, key: &str, listings: &[ListingRecord]) -> Result<()> {
        self.write_json_file(key, listings)
    }

    fn save_events(&self, events: &[Event]) -> Result<()> {
        self.write_json_file(StorageKeys::EVENTS, events)
    }

    fn save_movies(&self, movies: &[Movie]) -> Result<()> {
        self.write_json_file(StorageKeys::MOVIES, movies)
    }
}
