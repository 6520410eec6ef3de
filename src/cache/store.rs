// Cache store for raw API responses.
// Handles mtime-based freshness checks and filesystem reads/writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::api::Params;
use crate::error::Result;

use super::paths::{cache_key, entry_path};

/// Default lifetime of a cache entry: 5 minutes.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// File-backed response cache rooted at a single flat directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the entry for a request signature.
    pub fn path_for(&self, route: &str, params: &Params) -> Result<PathBuf> {
        let key = cache_key(route, params)?;
        Ok(entry_path(&self.dir, &key))
    }

    /// Check whether an entry exists and was written within `lifetime`.
    pub fn is_fresh(&self, path: &Path, lifetime: Duration) -> bool {
        match age(path) {
            Some(age) => age <= lifetime,
            None => false,
        }
    }

    /// Read the raw bytes of an entry.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    /// Overwrite an entry with `bytes`, creating the cache directory if needed.
    pub fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

/// Time since the entry was last written, or None if it does not exist.
/// A modification time in the future counts as zero age.
pub fn age(path: &Path) -> Option<Duration> {
    let modified: DateTime<Utc> = fs::metadata(path).ok()?.modified().ok()?.into();

    let elapsed = Utc::now()
        .signed_duration_since(modified)
        .to_std()
        .unwrap_or(Duration::ZERO);

    Some(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn backdate(path: &Path, by: Duration) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("cache"));
        let path = store.path_for("https://node/api/blocks/getHeight", &Params::new()).unwrap();

        store.write(&path, br#"{"height":12345}"#).unwrap();

        assert_eq!(store.read(&path).unwrap(), br#"{"height":12345}"#.to_vec());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_write_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        let path = store.path_for("https://node/api/peers", &Params::new()).unwrap();

        store.write(&path, b"first response, longer").unwrap();
        store.write(&path, b"second").unwrap();

        assert_eq!(store.read(&path).unwrap(), b"second".to_vec());
    }

    #[test]
    fn test_missing_entry_is_stale() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        let path = temp_dir.path().join("nonexistent");

        assert!(!store.is_fresh(&path, DEFAULT_LIFETIME));
        assert!(store.read(&path).is_err());
    }

    #[test]
    fn test_fresh_then_expired() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path());
        let path = temp_dir.path().join("entry");
        store.write(&path, b"{}").unwrap();

        assert!(store.is_fresh(&path, Duration::from_secs(300)));

        backdate(&path, Duration::from_secs(600));
        assert!(!store.is_fresh(&path, Duration::from_secs(300)));
        assert!(store.is_fresh(&path, Duration::from_secs(3600)));
    }

    #[test]
    fn test_future_mtime_is_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry");
        fs::write(&path, b"{}").unwrap();

        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60)).unwrap();

        assert_eq!(age(&path), Some(Duration::ZERO));
    }
}
