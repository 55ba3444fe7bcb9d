//! Serializable session snapshot
//!
//! The snapshot is the only thing ever written to disk: a versioned,
//! type-tagged projection of the client-level session state (headers,
//! proxy map, cookie jar contents). The live transport object is never
//! serialized, only its data, so the on-disk format stays stable across
//! library versions.
//!
//! The cache file holds plaintext session secrets (cookies). That is an
//! accepted, documented risk; protect the file with filesystem permissions
//! if it matters.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type tag embedded in every snapshot so foreign files are rejected on load
pub const SNAPSHOT_KIND: &str = "relogin.session-snapshot";

/// On-disk schema version. A loader accepts exactly its own version;
/// anything else is treated as a corrupt cache (i.e. a miss).
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable subset of the session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Type tag, always [`SNAPSHOT_KIND`]
    #[serde(rename = "type")]
    kind: String,
    /// Schema version, always [`SNAPSHOT_VERSION`] for files we write
    version: u32,
    /// Time the snapshot was taken. Informational only: cache freshness is
    /// judged from the file's modification time, never from this field.
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
    /// Client-level headers applied to every request
    pub headers: HashMap<String, String>,
    /// Proxy configuration, scheme to proxy URL
    pub proxies: HashMap<String, String>,
    /// Cookie jar contents. Opaque: produced and consumed only by the HTTP
    /// capability, never interpreted here.
    pub cookies: serde_json::Value,
}

impl SessionSnapshot {
    /// Create a snapshot tagged with the current schema version.
    pub fn new(
        headers: HashMap<String, String>,
        proxies: HashMap<String, String>,
        cookies: serde_json::Value,
    ) -> Self {
        Self {
            kind: SNAPSHOT_KIND.to_string(),
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            headers,
            proxies,
            cookies,
        }
    }

    /// Reject snapshots whose type tag or version does not match this
    /// loader. Fails closed: a foreign or future-versioned blob is a
    /// corrupt cache, which callers treat as a miss.
    pub fn validate_tag(&self) -> Result<()> {
        if self.kind != SNAPSHOT_KIND {
            return Err(Error::corrupt_cache(format!(
                "type tag mismatch: expected '{SNAPSHOT_KIND}', found '{}'",
                self.kind
            )));
        }
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::corrupt_cache(format!(
                "unsupported snapshot version {} (loader supports {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_snapshot() -> SessionSnapshot {
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), "test-agent".to_string());
        SessionSnapshot::new(headers, HashMap::new(), serde_json::json!([]))
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, restored);
        assert!(restored.validate_tag().is_ok());
    }

    #[test]
    fn test_tag_is_embedded() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        assert_eq!(json["type"], SNAPSHOT_KIND);
        assert_eq!(json["version"], SNAPSHOT_VERSION);
    }

    #[test]
    fn test_foreign_tag_rejected() {
        let mut snapshot = sample_snapshot();
        snapshot.kind = "some.other.tool".to_string();
        let err = snapshot.validate_tag().unwrap_err();
        assert!(err.is_cache_miss());
    }

    #[test]
    fn test_future_version_rejected() {
        let mut snapshot = sample_snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let err = snapshot.validate_tag().unwrap_err();
        assert!(matches!(err, Error::CorruptCache { .. }));
    }
}
