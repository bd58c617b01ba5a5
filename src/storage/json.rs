//! JSON file-based trace archive.
//!
//! Every trace is stored as its own pretty-printed JSON document so records can
//! be read and diffed by hand. Writes go to a uniquely named temporary file in
//! the group directory first and are then renamed into place, so a reader never
//! observes a half-written record.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── compute_total/
//! │   ├── 1718000000.123456.json
//! │   └── 1718000004.5.json
//! └── fetch_price/
//!     └── 1718000001.25.json
//! ```
//!
//! No fsync is issued: a crash can still lose the most recent records.

use crate::domain::error::{Result, TracelogError};
use crate::domain::Trace;
use crate::storage::backend::TraceStore;
use crate::storage::key::StorageKey;
use serde_json::Number;
use std::path::{Path, PathBuf};

/// File-per-trace JSON archive rooted at a directory.
///
/// # Thread Safety
///
/// The store holds no mutable state; concurrent calls only share the
/// filesystem. Two writes with the same key resolve as last-writer-wins.
///
/// # Examples
///
/// ```no_run
/// use tracelog::storage::{JsonTraceStore, TraceStore};
/// use tracelog::Trace;
///
/// let store = JsonTraceStore::new("/tmp/tracelog/traces");
/// let path = store.persist(&Trace::new("compute_total"))?;
/// println!("stored at {}", path.display());
/// # Ok::<(), tracelog::TracelogError>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonTraceStore {
    /// Archive root; group directories are created below it on demand.
    root: PathBuf,
}

impl JsonTraceStore {
    /// Creates a store rooted at `root`. Nothing is touched on disk until the
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the record for `key`.
    #[must_use]
    pub fn record_path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    fn load_from_file(path: &Path) -> Result<Trace> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| TracelogError::Storage(format!("failed to parse JSON: {e}")))
    }
}

impl TraceStore for JsonTraceStore {
    fn persist(&self, trace: &Trace) -> Result<PathBuf> {
        let key = StorageKey::for_trace(trace)?;
        let _span = tracing::debug_span!("json_persist_trace",
            function_name = %key.group(),
            record = %key.record()
        ).entered();

        let group_dir = self.root.join(key.group());
        tracing::trace!(group_dir = ?group_dir, "creating group directory");
        std::fs::create_dir_all(&group_dir)?;

        let json = serde_json::to_string_pretty(trace)
            .map_err(|e| TracelogError::Storage(format!("failed to serialize JSON: {e}")))?;

        let path = group_dir.join(key.record());
        let tmp_path = group_dir.join(format!(".{}.{}.tmp", key.record(), uuid::Uuid::new_v4().simple()));

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;

        tracing::trace!("renaming temporary file to final location");
        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
                tracing::warn!(tmp_path = ?tmp_path, error = %cleanup, "failed to remove temporary file");
            }
            return Err(e.into());
        }

        tracing::debug!(path = ?path, event_count = trace.events().len(), "trace persisted");
        Ok(path)
    }

    fn load(&self, function_name: &str, time_start: &Number) -> Result<Option<Trace>> {
        let key = StorageKey::new(function_name, time_start)?;
        let _span = tracing::debug_span!("json_load_trace",
            function_name = %key.group(),
            record = %key.record()
        ).entered();

        let path = self.record_path(&key);
        if !path.exists() {
            tracing::debug!("no record for key");
            return Ok(None);
        }

        Self::load_from_file(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trace_at(function_name: &str, time_start: f64) -> Trace {
        Trace::from_value(json!({
            "function_name": function_name,
            "function_args": {"n": 3},
            "time_start": time_start,
            "events": [
                {"type": "event", "name": "start", "time_delta_ms": 0},
                {"type": "event", "name": "validated", "time_delta_ms": 4, "data": {"ok": true}}
            ]
        }))
        .unwrap()
    }

    fn seconds(value: f64) -> Number {
        Number::from_f64(value).unwrap()
    }

    #[test]
    fn persist_writes_pretty_json_under_function_group() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path().join("traces"));
        let trace = trace_at("compute_total", 1_718_000_000.25);

        let path = store.persist(&trace).unwrap();

        assert_eq!(path, dir.path().join("traces/compute_total/1718000000.25.json"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains('\n'), "record should be pretty-printed");
        assert_eq!(Trace::from_json(&contents).unwrap(), trace);
    }

    #[test]
    fn foreign_tree_is_stored_as_received() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path());
        let input = r#"{"function_name":"f","time_start":1718000000,"events":[{"name":"start","time_delta_ms":0}],"host":"a"}"#;

        let path = store.persist(&Trace::from_json(input).unwrap()).unwrap();

        assert_eq!(path, dir.path().join("f/1718000000.json"));
        let stored: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(serde_json::to_string(&stored).unwrap(), input);

        let loaded = store.load("f", &Number::from(1_718_000_000_u64)).unwrap().unwrap();
        assert_eq!(loaded.to_json().unwrap(), input);
    }

    #[test]
    fn distinct_start_times_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path());

        store.persist(&trace_at("f", 10.25)).unwrap();
        store.persist(&trace_at("f", 10.5)).unwrap();

        let mut names: Vec<_> = std::fs::read_dir(dir.path().join("f"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["10.25.json", "10.5.json"]);
    }

    #[test]
    fn same_key_is_overwritten_by_later_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path());

        store.persist(&trace_at("f", 7.5)).unwrap();
        let mut replacement = trace_at("f", 7.5);
        replacement.record_event("extra", None);
        store.persist(&replacement).unwrap();

        let loaded = store.load("f", &seconds(7.5)).unwrap().unwrap();
        assert_eq!(loaded.events().len(), 3);
        assert_eq!(std::fs::read_dir(dir.path().join("f")).unwrap().count(), 1);
    }

    #[test]
    fn load_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path());
        assert!(store.load("never_called", &Number::from(1)).unwrap().is_none());
    }

    #[test]
    fn invalid_group_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path().join("traces"));

        let err = store.persist(&trace_at("../outside", 1.0)).unwrap_err();

        assert!(matches!(err, TracelogError::InvalidTrace(_)));
        assert!(!dir.path().join("traces").exists());
        assert!(!dir.path().join("outside").exists());
    }

    #[test]
    fn corrupt_record_surfaces_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonTraceStore::new(dir.path());
        std::fs::create_dir_all(dir.path().join("f")).unwrap();
        std::fs::write(dir.path().join("f/2.5.json"), "{ truncated").unwrap();

        let err = store.load("f", &seconds(2.5)).unwrap_err();
        assert!(matches!(err, TracelogError::Storage(_)));
    }
}
