//! # Run Store
//!
//! Persistence sink for refinement-loop transcripts. Each completed loop
//! run becomes one `RunRecord`: the inputs, the ordered candidate trace,
//! and how the run ended.
//!
//! The store is an explicitly constructed handle passed to whoever needs
//! it - there is no module-level connection. `FileStore` keeps one JSON
//! file per run under a base directory; `MemoryStore` backs tests.

use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Transcript of one refinement-loop run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Record identifier
    pub id: String,
    /// The product molecule the run started from
    pub product: String,
    /// The reaction class passed to the predictor
    pub reaction_class: String,
    /// Ordered valid candidates, as produced
    pub trace: Vec<String>,
    /// How the run ended, e.g. "accepted" or a failure reason
    pub outcome: String,
    /// Predictor calls made before termination
    pub iterations: u32,
    /// When the run started (unix seconds)
    pub started_at: u64,
    /// When the run finished (unix seconds)
    pub finished_at: u64,
}

impl RunRecord {
    /// Start a record for a new run; trace and outcome are filled at the end
    pub fn begin(product: impl Into<String>, reaction_class: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: Self::generate_id(),
            product: product.into(),
            reaction_class: reaction_class.into(),
            trace: Vec::new(),
            outcome: String::new(),
            iterations: 0,
            started_at: now,
            finished_at: now,
        }
    }

    /// Generate a unique record ID
    pub fn generate_id() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        format!("run_{:x}", ts)
    }

    /// Close the record with the final trace and outcome description
    pub fn finish(
        mut self,
        trace: Vec<String>,
        outcome: impl Into<String>,
        iterations: u32,
    ) -> Self {
        self.trace = trace;
        self.outcome = outcome.into();
        self.iterations = iterations;
        self.finished_at = current_timestamp();
        self
    }
}

// =============================================================================
// Run Store Trait
// =============================================================================

/// Trait for run-record storage backends
pub trait RunStore: Send + Sync {
    /// Persist a record (overwrites an existing record with the same id)
    fn save(&self, record: &RunRecord) -> Result<()>;

    /// Load a record by ID
    fn load(&self, id: &str) -> Result<RunRecord>;

    /// List all record IDs
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a record
    fn delete(&self, id: &str) -> Result<()>;

    /// Check if a record exists
    fn exists(&self, id: &str) -> bool {
        self.load(id).is_ok()
    }

    /// Get backend name for debugging
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// File-based Store (JSON files)
// =============================================================================

/// File-based run store: `{base_path}/{run_id}.json`
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)
            .map_err(|e| error::io_error(format!("failed to create run directory: {}", e)))?;
        Ok(Self { base_path })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        let safe_id = id.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.base_path.join(format!("{}.json", safe_id))
    }
}

impl RunStore for FileStore {
    fn save(&self, record: &RunRecord) -> Result<()> {
        let path = self.record_path(&record.id);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| error::serialization_error(e.to_string()))?;
        std::fs::write(&path, json)
            .map_err(|e| error::io_error(format!("failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn load(&self, id: &str) -> Result<RunRecord> {
        let path = self.record_path(id);
        let json = std::fs::read_to_string(&path)
            .map_err(|e| error::storage_not_found(format!("{}: {}", id, e)))?;
        let record: RunRecord = serde_json::from_str(&json)
            .map_err(|e| error::parse_error(format!("failed to parse record {}: {}", id, e)))?;
        Ok(record)
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.base_path)
            .map_err(|e| error::io_error(format!("failed to read run directory: {}", e)))?;

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                error::io_error(format!("failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// =============================================================================
// In-Memory Store (for testing)
// =============================================================================

/// In-memory run store (useful for testing)
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, RunRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for MemoryStore {
    fn save(&self, record: &RunRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| error::storage_failed("run store lock poisoned"))?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<RunRecord> {
        let records = self
            .records
            .read()
            .map_err(|_| error::storage_failed("run store lock poisoned"))?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| error::storage_not_found(id))
    }

    fn list(&self) -> Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| error::storage_failed("run store lock poisoned"))?;
        let mut ids: Vec<String> = records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| error::storage_failed("run store lock poisoned"))?;
        records.remove(id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> RunRecord {
        RunRecord::begin("C1=CC=CC=C1", "Hydrogenation").finish(
            vec!["C1CCCCC1".to_string()],
            "accepted",
            1,
        )
    }

    #[test]
    fn test_record_lifecycle() {
        let record = sample_record();
        assert!(record.id.starts_with("run_"));
        assert_eq!(record.product, "C1=CC=CC=C1");
        assert_eq!(record.trace, vec!["C1CCCCC1"]);
        assert_eq!(record.outcome, "accepted");
        assert!(record.finished_at >= record.started_at);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let record = sample_record();

        store.save(&record).unwrap();
        let loaded = store.load(&record.id).unwrap();
        assert_eq!(loaded.product, record.product);
        assert_eq!(loaded.trace, record.trace);

        assert!(store.exists(&record.id));
        assert_eq!(store.list().unwrap(), vec![record.id.clone()]);

        store.delete(&record.id).unwrap();
        assert!(!store.exists(&record.id));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();
        let record = sample_record();

        store.save(&record).unwrap();
        let loaded = store.load(&record.id).unwrap();
        assert_eq!(loaded.reaction_class, "Hydrogenation");
        assert_eq!(loaded.iterations, 1);

        let ids = store.list().unwrap();
        assert_eq!(ids, vec![record.id.clone()]);

        store.delete(&record.id).unwrap();
        assert!(store.load(&record.id).is_err());
    }

    #[test]
    fn test_file_store_sanitizes_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).unwrap();

        let mut record = sample_record();
        record.id = "run/../../escape".to_string();
        store.save(&record).unwrap();

        // the file lands inside the base directory, not outside it
        let ids = store.list().unwrap();
        assert_eq!(ids.len(), 1);
        assert!(!ids[0].contains('/'));
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load("run_missing").unwrap_err();
        assert_eq!(err.kind(), retrosynth_error::ErrorKind::StorageNotFound);
    }

    #[test]
    fn test_backend_names() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(FileStore::new(temp_dir.path()).unwrap().backend_name(), "file");
        assert_eq!(MemoryStore::new().backend_name(), "memory");
    }
}
