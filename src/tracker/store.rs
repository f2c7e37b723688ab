use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{CandidateDraft, CandidateId, CandidateRecord};

/// Storage abstraction so ranking and regeneration can be exercised in
/// isolation. Implementations must hand out ids in increasing order and
/// return scans in physical (insertion) order.
pub trait CandidateStore: Send + Sync {
    /// Durably append one candidate. Missing fields are stored absent,
    /// never rejected.
    fn insert(&self, draft: CandidateDraft) -> Result<CandidateId, StoreError>;

    /// Remove all matching rows. Unknown ids are silently ignored; an empty
    /// id set is a no-op returning 0.
    fn delete(&self, ids: &[CandidateId]) -> Result<usize, StoreError>;

    /// Every stored candidate, in an order stable for a single call.
    fn scan_all(&self) -> Result<Vec<CandidateRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt candidate record at line {line}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable candidate store holding one JSON record per line.
///
/// Inserts append a single line; deletes rewrite the file through a
/// temporary sibling and rename it into place so a scan never observes a
/// half-applied mutation.
pub struct JsonlCandidateStore {
    path: PathBuf,
    sequence: AtomicU64,
    file_lock: Mutex<()>,
}

impl JsonlCandidateStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = read_records(&path)?;
        let highest = records.iter().map(|record| record.id.0).max().unwrap_or(0);

        Ok(Self {
            path,
            sequence: AtomicU64::new(highest + 1),
            file_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_id(&self) -> CandidateId {
        CandidateId(self.sequence.fetch_add(1, Ordering::Relaxed))
    }
}

impl CandidateStore for JsonlCandidateStore {
    fn insert(&self, draft: CandidateDraft) -> Result<CandidateId, StoreError> {
        let record = CandidateRecord::from_draft(self.next_id(), Utc::now(), draft);
        let mut line = serde_json::to_string(&record)
            .map_err(|source| StoreError::Corrupt { line: 0, source })?;
        line.push('\n');

        let _guard = self.file_lock.lock().expect("store mutex poisoned");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        Ok(record.id)
    }

    fn delete(&self, ids: &[CandidateId]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let _guard = self.file_lock.lock().expect("store mutex poisoned");
        let records = read_records(&self.path)?;
        let kept: Vec<&CandidateRecord> = records
            .iter()
            .filter(|record| !ids.contains(&record.id))
            .collect();
        let removed = records.len() - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let staging = self.path.with_extension("jsonl.tmp");
        let mut buffer = String::new();
        for record in &kept {
            let line = serde_json::to_string(record)
                .map_err(|source| StoreError::Corrupt { line: 0, source })?;
            buffer.push_str(&line);
            buffer.push('\n');
        }
        fs::write(&staging, buffer)?;
        fs::rename(&staging, &self.path)?;

        Ok(removed)
    }

    fn scan_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let _guard = self.file_lock.lock().expect("store mutex poisoned");
        read_records(&self.path)
    }
}

fn read_records(path: &Path) -> Result<Vec<CandidateRecord>, StoreError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, domain: &str, final_score: f64) -> CandidateDraft {
        CandidateDraft {
            name: Some(name.to_string()),
            domain: Some(domain.to_string()),
            final_score: Some(final_score),
            ..CandidateDraft::default()
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> JsonlCandidateStore {
        JsonlCandidateStore::open(dir.path().join("candidates.jsonl")).expect("store opens")
    }

    #[test]
    fn scan_preserves_insertion_order_and_ids_increase() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        let first = store.insert(draft("Asha", "RF", 90.0)).expect("insert");
        let second = store.insert(draft("Birk", "RF", 80.0)).expect("insert");
        let third = store.insert(draft("Chen", "FPGA", 70.0)).expect("insert");
        assert!(first < second && second < third);

        let records = store.scan_all().expect("scan");
        let names: Vec<_> = records
            .iter()
            .map(|record| record.name.as_deref().expect("name stored"))
            .collect();
        assert_eq!(names, ["Asha", "Birk", "Chen"]);
    }

    #[test]
    fn missing_fields_round_trip_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        store
            .insert(CandidateDraft::default())
            .expect("empty draft accepted");
        let records = store.scan_all().expect("scan");
        assert_eq!(records.len(), 1);
        assert!(records[0].name.is_none());
        assert!(records[0].final_score.is_none());
        assert!(records[0].domain.is_none());
    }

    #[test]
    fn delete_ignores_unknown_ids_and_reports_removed_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);

        let first = store.insert(draft("Asha", "RF", 90.0)).expect("insert");
        let second = store.insert(draft("Birk", "RF", 80.0)).expect("insert");

        let removed = store
            .delete(&[first, CandidateId(999)])
            .expect("delete succeeds");
        assert_eq!(removed, 1);

        let records = store.scan_all().expect("scan");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, second);
    }

    #[test]
    fn empty_delete_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        store.insert(draft("Asha", "RF", 90.0)).expect("insert");

        assert_eq!(store.delete(&[]).expect("noop"), 0);
        assert_eq!(store.scan_all().expect("scan").len(), 1);
    }

    #[test]
    fn reopen_continues_the_id_sequence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("candidates.jsonl");

        let store = JsonlCandidateStore::open(&path).expect("store opens");
        store.insert(draft("Asha", "RF", 90.0)).expect("insert");
        let second = store.insert(draft("Birk", "RF", 80.0)).expect("insert");
        drop(store);

        let reopened = JsonlCandidateStore::open(&path).expect("store reopens");
        let third = reopened.insert(draft("Chen", "RF", 70.0)).expect("insert");
        assert!(third > second);
    }

    #[test]
    fn scan_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_store(&dir);
        assert!(store.scan_all().expect("scan").is_empty());
    }
}
