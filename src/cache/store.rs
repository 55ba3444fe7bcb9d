//! File-based session cache
//!
//! Persists the [`SessionSnapshot`] as a JSON file. The file's modification
//! time doubles as the freshness clock: a session is never renewed except by
//! being rewritten. Writes go through a temp file in the same directory plus
//! an atomic rename so a concurrent reader can never observe a torn blob.

use crate::{Error, Result, session::SessionSnapshot};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, warn};

/// Extension used for cache files derived from a host name
const CACHE_FILE_SUFFIX: &str = "session.json";

/// File-backed store for a single session snapshot
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Path to the cache file
    path: PathBuf,
}

impl CacheStore {
    /// Create a store over the given cache file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a regular file exists at the cache path.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Seconds since the cache file was last written.
    ///
    /// Returns [`Error::CacheMissing`] if the file is absent. The result can
    /// be negative when the clock moved backwards past the file's mtime;
    /// callers must treat negative age as fresh.
    pub fn age_seconds(&self) -> Result<i64> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CacheMissing {
                    path: self.path.clone(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let modified = metadata.modified()?;
        let age = match SystemTime::now().duration_since(modified) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            // mtime in the future: report the skew as negative age
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Ok(age)
    }

    /// Load and validate the snapshot.
    ///
    /// Malformed content and mismatched type tags come back as
    /// [`Error::CorruptCache`], distinct from plain I/O failures; both are
    /// cache misses to the session controller, never fatal.
    pub async fn read(&self) -> Result<SessionSnapshot> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CacheMissing {
                    path: self.path.clone(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let snapshot: SessionSnapshot = serde_json::from_str(&content)
            .map_err(|e| Error::corrupt_cache(format!("not a session snapshot: {e}")))?;
        snapshot.validate_tag()?;

        debug!("Loaded session snapshot from {:?}", self.path);
        Ok(snapshot)
    }

    /// Serialize the snapshot and atomically replace the cache file.
    ///
    /// Always refreshes the file's modification time, which is the sole
    /// mechanism resetting session freshness. Any failure is reported as
    /// [`Error::CachePersist`].
    pub async fn write(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| Error::cache_persist(&self.path, format!("serialization failed: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = fs::create_dir_all(parent).await
        {
            warn!("Failed to create cache directory {:?}: {}", parent, e);
            return Err(Error::cache_persist(
                &self.path,
                format!("directory creation failed: {e}"),
            ));
        }

        // Temp file lives in the destination directory so the rename stays
        // on one filesystem and is atomic.
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| Error::cache_persist(&self.path, format!("write failed: {e}")))?;

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(Error::cache_persist(
                &self.path,
                format!("rename failed: {e}"),
            ));
        }

        debug!("Session snapshot saved to {:?}", self.path);
        Ok(())
    }
}

/// Default cache file path for a site: a temp-directory file named after
/// the target host.
pub fn default_cache_path(host: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{host}.{CACHE_FILE_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn sample_snapshot() -> SessionSnapshot {
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), "test-agent/1.0".to_string());
        SessionSnapshot::new(headers, HashMap::new(), serde_json::json!([]))
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("site.session.json"));

        let snapshot = sample_snapshot();
        store.write(&snapshot).await.unwrap();

        let restored = store.read().await.unwrap();
        assert_eq!(restored, snapshot);
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("site.session.json"));
        store.write(&sample_snapshot()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("site.session.json")]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("absent.session.json"));

        assert!(!store.exists());
        assert!(matches!(
            store.age_seconds().unwrap_err(),
            Error::CacheMissing { .. }
        ));
        assert!(store.read().await.unwrap_err().is_cache_miss());
    }

    #[tokio::test]
    async fn test_fresh_write_has_small_age() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("site.session.json"));
        store.write(&sample_snapshot()).await.unwrap();

        let age = store.age_seconds().unwrap();
        assert!((0..5).contains(&age), "unexpected age {age}");
    }

    #[tokio::test]
    async fn test_future_mtime_reports_negative_age() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("site.session.json"));
        store.write(&sample_snapshot()).await.unwrap();

        // Clock skew: mtime two minutes ahead of now
        let file = std::fs::File::options()
            .write(true)
            .open(store.path())
            .unwrap();
        file.set_modified(SystemTime::now() + std::time::Duration::from_secs(120))
            .unwrap();

        let age = store.age_seconds().unwrap();
        assert!(age < 0, "expected negative age, got {age}");
    }

    #[tokio::test]
    async fn test_malformed_content_is_corrupt_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("site.session.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = CacheStore::new(path);
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, Error::CorruptCache { .. }));
        assert!(err.is_cache_miss());
    }

    #[tokio::test]
    async fn test_foreign_blob_is_corrupt_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("site.session.json");
        // Valid JSON produced by some other tool
        std::fs::write(&path, r#"{"type":"other.tool.state","payload":[1,2,3]}"#).unwrap();

        let store = CacheStore::new(path);
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, Error::CorruptCache { .. }));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_content() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("site.session.json"));

        store.write(&sample_snapshot()).await.unwrap();

        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), "updated/2.0".to_string());
        let updated = SessionSnapshot::new(headers.clone(), HashMap::new(), serde_json::json!([]));
        store.write(&updated).await.unwrap();

        let restored = store.read().await.unwrap();
        assert_eq!(restored.headers, headers);
    }

    #[test]
    fn test_default_cache_path_uses_host() {
        let path = default_cache_path("example.com");
        assert!(path.to_string_lossy().ends_with("example.com.session.json"));
        assert!(path.starts_with(std::env::temp_dir()));
    }
}
