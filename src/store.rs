//! # Store: Verification Record Persistence
//!
//! The verification engine never touches the filesystem. It is handed a
//! [`VerificationRecord`] and returns an updated one; a [`RecordStore`]
//! loads and saves it around the run.
//!
//! ## Atomic Writes
//!
//! [`JsonFileStore`] writes to a `.tmp` file and renames it over the target,
//! so a crash mid-write never leaves a truncated record behind. The
//! previous record is rotated to `<path>.1` first; if the current file is
//! unreadable, loading falls back to that generation.
//!
//! ## Locking
//!
//! A run is a read-modify-write. [`JsonFileStore::lock`] creates
//! `<path>.lock` exclusively for the duration of the run, so a second
//! overlapping run fails fast instead of silently losing an update.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::record::VerificationRecord;

/// Number of record generations kept on disk (current + backups).
const GENERATIONS: usize = 2;

/// Where verification records live.
pub trait RecordStore {
    /// `Ok(None)` when no record has been written yet.
    fn load(&self) -> Result<Option<VerificationRecord>>;
    fn save(&self, record: &VerificationRecord) -> Result<()>;
    /// Claim exclusive access for a read-modify-write cycle.
    fn lock(&self) -> Result<StoreLock>;
}

/// Held for the duration of a run; releases the lock on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: Option<PathBuf>,
}

impl StoreLock {
    /// A lock that guards nothing, for stores without shared state.
    pub fn none() -> Self {
        StoreLock { path: None }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(path) = &self.path {
            let _ = fs::remove_file(path);
        }
    }
}

/// The record as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }
}

/// `<path>.<suffix>`, keeping the original extension.
fn sibling(base: &Path, suffix: &str) -> PathBuf {
    let mut p = base.as_os_str().to_os_string();
    p.push(format!(".{}", suffix));
    PathBuf::from(p)
}

/// Path for generation `gen` (0 = current, 1 = .1, ...).
fn generation_path(base: &Path, gen: usize) -> PathBuf {
    if gen == 0 {
        base.to_path_buf()
    } else {
        sibling(base, &gen.to_string())
    }
}

fn load_single(path: &Path) -> Result<Option<VerificationRecord>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let record = serde_json::from_str(&raw)
        .with_context(|| format!("parsing verification record {}", path.display()))?;
    Ok(Some(record))
}

impl RecordStore for JsonFileStore {
    /// Load the newest readable generation.
    ///
    /// A missing current file with no backups is a fresh start. A corrupt
    /// current file falls back to the previous generation; if none is
    /// readable, the original parse error is returned.
    fn load(&self) -> Result<Option<VerificationRecord>> {
        let current = load_single(&self.path);
        if let Ok(record) = &current {
            if record.is_some() || !generation_path(&self.path, 1).exists() {
                return current;
            }
        }
        for gen in 1..GENERATIONS {
            let p = generation_path(&self.path, gen);
            if let Ok(Some(record)) = load_single(&p) {
                warn!(
                    generation = gen,
                    path = %p.display(),
                    "recovered verification record from backup"
                );
                return Ok(Some(record));
            }
        }
        current
    }

    fn save(&self, record: &VerificationRecord) -> Result<()> {
        // Rotate: current -> .1 (oldest generation is overwritten).
        for gen in (1..GENERATIONS).rev() {
            let src = generation_path(&self.path, gen - 1);
            let dst = generation_path(&self.path, gen);
            if src.exists() {
                if let Err(e) = fs::rename(&src, &dst) {
                    warn!(
                        error = %e,
                        from = %src.display(),
                        to = %dst.display(),
                        "failed to rotate verification record"
                    );
                }
            }
        }

        let mut json = serde_json::to_string_pretty(record)?;
        json.push('\n');

        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, &json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        debug!(path = %self.path.display(), "verification record saved");
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock> {
        let lock = self.lock_path();
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock)
        {
            Ok(_) => Ok(StoreLock { path: Some(lock) }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => anyhow::bail!(
                "verification record is locked by another run (remove {} if stale)",
                lock.display()
            ),
            Err(e) => Err(e).with_context(|| format!("creating {}", lock.display())),
        }
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<VerificationRecord>>,
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Option<VerificationRecord>> {
        let guard = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, record: &VerificationRecord) -> Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        *guard = Some(record.clone());
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock> {
        Ok(StoreLock::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChangeAction;
    use chrono::{TimeZone, Utc};

    fn record(note: &str) -> VerificationRecord {
        VerificationRecord::default().with_run(
            Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
            ChangeAction::Verified,
            note.into(),
        )
    }

    #[test]
    fn missing_file_is_fresh_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        let rec = record("first");
        store.save(&rec).unwrap();
        assert_eq!(store.load().unwrap(), Some(rec));
        assert!(!sibling(store.path(), "tmp").exists());
    }

    #[test]
    fn written_file_uses_shared_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        store.save(&record("first")).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"lastVerified\": \"2026-05-01T12:00:00.000Z\""));
        assert!(raw.contains("\"nextVerificationDue\": \"2026-05-08T12:00:00.000Z\""));
        assert!(raw.contains("\"changelog\""));
    }

    #[test]
    fn rotation_keeps_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        store.save(&record("first")).unwrap();
        store.save(&record("second")).unwrap();

        let backup = load_single(&generation_path(store.path(), 1)).unwrap().unwrap();
        assert_eq!(backup.latest().unwrap().note, "first");
        let current = store.load().unwrap().unwrap();
        assert_eq!(current.latest().unwrap().note, "second");
    }

    #[test]
    fn rotation_failure_does_not_block_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        // A non-empty directory at the backup path makes the rename fail.
        let backup = generation_path(store.path(), 1);
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("occupied"), b"x").unwrap();

        store.save(&record("first")).unwrap();
        store.save(&record("second")).unwrap();

        let current = store.load().unwrap().unwrap();
        assert_eq!(current.latest().unwrap().note, "second");
        assert!(backup.is_dir());
    }

    #[test]
    fn fallback_on_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        store.save(&record("first")).unwrap();
        store.save(&record("second")).unwrap();
        fs::write(store.path(), b"corrupted data!!!").unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.latest().unwrap().note, "first");
    }

    #[test]
    fn corruption_without_backup_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        fs::write(store.path(), b"{not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(format!("{:#}", err).contains("parsing verification record"));
    }

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("verification.json"));
        let guard = store.lock().unwrap();
        let err = store.lock().unwrap_err();
        assert!(err.to_string().contains("locked by another run"));
        drop(guard);
        assert!(!store.lock_path().exists());
        let _again = store.lock().unwrap();
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&record("mem")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().latest().unwrap().note, "mem");
        let _lock = store.lock().unwrap();
        let _second = store.lock().unwrap();
    }
}
