//! # Persistence
//!
//! Four collections back the estimator: the project archive, the
//! single autosaved draft slot, the material library, and the company
//! config. The `Storage` trait abstracts where they live so the store
//! can be driven by disk-backed or in-memory implementations.
//!
//! `JsonStorage` keeps one JSON file per collection inside a store
//! directory, with the safety features shared drives need:
//! - **Atomic saves**: write to .tmp, sync, rename to prevent corruption
//! - **Store locking**: one writer per store directory at a time
//! - **Version validation**: each file carries a schema version envelope
//!
//! ## Store Layout
//!
//! ```text
//! <store dir>/
//! ├── templates.json   archive of committed projects
//! ├── draft.json       autosaved unsaved draft (absent when clean)
//! ├── library.json     materials + categories + accent overrides
//! ├── config.json      company identity and default rates
//! └── store.json.lock  lock metadata while a writer is attached
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::storage::{JsonStorage, Storage};
//!
//! let mut storage = JsonStorage::open("estimates", "sales@exhibiprice.com")?;
//! let archive = storage.load_archive()?;
//! println!("{} archived projects", archive.len());
//! # Ok::<(), quote_core::errors::EstimateError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::MaterialCatalog;
use crate::config::AppConfig;
use crate::errors::{EstimateError, EstimateResult};
use crate::project::Project;

/// Schema version stamped into every persisted file
pub const SCHEMA_VERSION: &str = "0.1.0";

const ARCHIVE_FILE: &str = "templates.json";
const DRAFT_FILE: &str = "draft.json";
const LIBRARY_FILE: &str = "library.json";
const CONFIG_FILE: &str = "config.json";
/// Phantom path the store-wide lock is derived from
const LOCK_SENTINEL: &str = "store.json";

/// Repository boundary for the four persisted collections.
///
/// Loads distinguish "nothing persisted yet" (`Ok(None)` / empty
/// archive) from corrupt data (`Err`); callers decide whether corrupt
/// data is fatal or falls back to defaults.
pub trait Storage {
    /// All committed projects. Missing file reads as an empty archive.
    fn load_archive(&self) -> EstimateResult<Vec<Project>>;
    fn save_archive(&mut self, projects: &[Project]) -> EstimateResult<()>;

    /// The autosaved draft, if one was left behind.
    fn load_draft(&self) -> EstimateResult<Option<Project>>;
    fn save_draft(&mut self, draft: &Project) -> EstimateResult<()>;
    fn clear_draft(&mut self) -> EstimateResult<()>;

    /// The persisted material library, if the user has customized it.
    fn load_catalog(&self) -> EstimateResult<Option<MaterialCatalog>>;
    fn save_catalog(&mut self, catalog: &MaterialCatalog) -> EstimateResult<()>;

    /// The persisted company config, if one was saved.
    fn load_config(&self) -> EstimateResult<Option<AppConfig>>;
    fn save_config(&mut self, config: &AppConfig) -> EstimateResult<()>;
}

/// Versioned wrapper every collection file is stored inside
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: String,
    data: T,
}

/// Lock file metadata stored next to the collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Store lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. a .lock file with metadata for user visibility
#[derive(Debug)]
pub struct StoreLock {
    lock_path: PathBuf,
    /// The underlying file handle (keeps the OS lock)
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl StoreLock {
    /// Acquire an exclusive lock derived from `path`.
    ///
    /// Returns `EstimateError::StoreLocked` when another live process
    /// holds the lock; stale locks (dead pid on this machine, or older
    /// than 24 hours) are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> EstimateResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(EstimateError::store_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                // Stale lock, take it over
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                EstimateError::storage_error(
                    "create lock",
                    lock_path.display().to_string(),
                    e.to_string(),
                )
            })?;

        // Non-blocking OS-level exclusive lock
        lock_file.try_lock_exclusive().map_err(|_| {
            EstimateError::store_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json = serde_json::to_string_pretty(&info)
            .map_err(|e| EstimateError::SerializationError { reason: e.to_string() })?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            EstimateError::storage_error(
                "write lock",
                lock_path.display().to_string(),
                e.to_string(),
            )
        })?;

        lock_file.sync_all().map_err(|e| {
            EstimateError::storage_error(
                "sync lock",
                lock_path.display().to_string(),
                e.to_string(),
            )
        })?;

        Ok(StoreLock { lock_path, _lock_file: lock_file, info })
    }

    /// Check whether `path` is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // OS lock is released when _lock_file is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Get the lock file path for a data file
fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Read lock info from a lock file
fn read_lock_info(lock_path: &Path) -> EstimateResult<LockInfo> {
    let mut file = File::open(lock_path).map_err(|e| {
        EstimateError::storage_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        EstimateError::storage_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    serde_json::from_str(&contents)
        .map_err(|e| EstimateError::SerializationError { reason: e.to_string() })
}

/// Check if a lock is stale (the process that created it is gone)
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            // Same machine, check if the process is still running
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    // Locks older than 24 hours are considered abandoned
    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> EstimateResult<()> {
    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(EstimateError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(EstimateError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        });
    }

    // For 0.x versions a newer minor is a breaking change
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 {
        if file_parts[1] > current_parts[1] {
            return Err(EstimateError::VersionMismatch {
                file_version: file_version.to_string(),
                expected_version: SCHEMA_VERSION.to_string(),
            });
        }
    }

    Ok(())
}

/// Disk-backed storage: one versioned JSON file per collection.
///
/// Opening the store acquires the store-wide lock; it is released when
/// the storage value is dropped.
#[derive(Debug)]
pub struct JsonStorage {
    dir: PathBuf,
    _lock: StoreLock,
}

impl JsonStorage {
    /// Open (creating if needed) a store directory and lock it.
    pub fn open(dir: impl Into<PathBuf>, user_id: impl Into<String>) -> EstimateResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            EstimateError::storage_error(
                "create store dir",
                dir.display().to_string(),
                e.to_string(),
            )
        })?;

        let lock = StoreLock::acquire(&dir.join(LOCK_SENTINEL), user_id)?;
        Ok(JsonStorage { dir, _lock: lock })
    }

    /// Check whether a store directory is locked by a live process.
    pub fn check_locked(dir: &Path) -> Option<LockInfo> {
        StoreLock::check(&dir.join(LOCK_SENTINEL))
    }

    /// Directory this store lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Atomic write: serialize into an envelope, write .tmp, sync,
    /// rename over the final path.
    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> EstimateResult<()> {
        let envelope = Envelope { version: SCHEMA_VERSION.to_string(), data: value };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| EstimateError::SerializationError { reason: e.to_string() })?;

        let path = self.dir.join(name);
        let tmp_path = path.with_extension("json.tmp");

        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            EstimateError::storage_error(
                "create temp file",
                tmp_path.display().to_string(),
                e.to_string(),
            )
        })?;

        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            EstimateError::storage_error(
                "write temp file",
                tmp_path.display().to_string(),
                e.to_string(),
            )
        })?;

        tmp_file.sync_all().map_err(|e| {
            EstimateError::storage_error(
                "sync temp file",
                tmp_path.display().to_string(),
                e.to_string(),
            )
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            // Clean up the temp file if the rename fails
            let _ = fs::remove_file(&tmp_path);
            EstimateError::storage_error(
                "rename to final",
                path.display().to_string(),
                e.to_string(),
            )
        })?;

        Ok(())
    }

    /// Load one collection file; `Ok(None)` when it does not exist.
    fn load_json<T: DeserializeOwned>(&self, name: &str) -> EstimateResult<Option<T>> {
        let path = self.dir.join(name);

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(EstimateError::storage_error(
                    "open",
                    path.display().to_string(),
                    e.to_string(),
                ))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            EstimateError::storage_error("read", path.display().to_string(), e.to_string())
        })?;

        let envelope: Envelope<T> =
            serde_json::from_str(&contents).map_err(|e| EstimateError::SerializationError {
                reason: format!("Invalid JSON in {}: {}", path.display(), e),
            })?;

        validate_version(&envelope.version)?;
        Ok(Some(envelope.data))
    }

    fn remove_file(&self, name: &str) -> EstimateResult<()> {
        let path = self.dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EstimateError::storage_error(
                "remove",
                path.display().to_string(),
                e.to_string(),
            )),
        }
    }
}

impl Storage for JsonStorage {
    fn load_archive(&self) -> EstimateResult<Vec<Project>> {
        Ok(self.load_json(ARCHIVE_FILE)?.unwrap_or_default())
    }

    fn save_archive(&mut self, projects: &[Project]) -> EstimateResult<()> {
        self.save_json(ARCHIVE_FILE, &projects)
    }

    fn load_draft(&self) -> EstimateResult<Option<Project>> {
        self.load_json(DRAFT_FILE)
    }

    fn save_draft(&mut self, draft: &Project) -> EstimateResult<()> {
        self.save_json(DRAFT_FILE, draft)
    }

    fn clear_draft(&mut self) -> EstimateResult<()> {
        self.remove_file(DRAFT_FILE)
    }

    fn load_catalog(&self) -> EstimateResult<Option<MaterialCatalog>> {
        self.load_json(LIBRARY_FILE)
    }

    fn save_catalog(&mut self, catalog: &MaterialCatalog) -> EstimateResult<()> {
        self.save_json(LIBRARY_FILE, catalog)
    }

    fn load_config(&self) -> EstimateResult<Option<AppConfig>> {
        self.load_json(CONFIG_FILE)
    }

    fn save_config(&mut self, config: &AppConfig) -> EstimateResult<()> {
        self.save_json(CONFIG_FILE, config)
    }
}

/// In-memory storage for tests and headless runs. No locking, no
/// versioning, collections live only as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    archive: Vec<Project>,
    draft: Option<Project>,
    catalog: Option<MaterialCatalog>,
    config: Option<AppConfig>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Whether a draft is currently persisted
    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }
}

impl Storage for MemoryStorage {
    fn load_archive(&self) -> EstimateResult<Vec<Project>> {
        Ok(self.archive.clone())
    }

    fn save_archive(&mut self, projects: &[Project]) -> EstimateResult<()> {
        self.archive = projects.to_vec();
        Ok(())
    }

    fn load_draft(&self) -> EstimateResult<Option<Project>> {
        Ok(self.draft.clone())
    }

    fn save_draft(&mut self, draft: &Project) -> EstimateResult<()> {
        self.draft = Some(draft.clone());
        Ok(())
    }

    fn clear_draft(&mut self) -> EstimateResult<()> {
        self.draft = None;
        Ok(())
    }

    fn load_catalog(&self) -> EstimateResult<Option<MaterialCatalog>> {
        Ok(self.catalog.clone())
    }

    fn save_catalog(&mut self, catalog: &MaterialCatalog) -> EstimateResult<()> {
        self.catalog = Some(catalog.clone());
        Ok(())
    }

    fn load_config(&self) -> EstimateResult<Option<AppConfig>> {
        Ok(self.config.clone())
    }

    fn save_config(&mut self, config: &AppConfig) -> EstimateResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> JsonStorage {
        JsonStorage::open(dir.path().join("store"), "test@example.com").unwrap()
    }

    #[test]
    fn test_lock_path_generation() {
        let path = Path::new("/data/store/store.json");
        assert_eq!(lock_path_for(path), Path::new("/data/store/store.json.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@example.com");
        assert_eq!(info.user_id, "test@example.com");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_archive_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut storage = open_store(&dir);

        // Fresh store reads as empty
        assert!(storage.load_archive().unwrap().is_empty());

        let mut project = Project::default();
        project.id = "1700000000000".to_string();
        project.name = "Tech Expo Stand".to_string();
        storage.save_archive(std::slice::from_ref(&project)).unwrap();

        let loaded = storage.load_archive().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], project);
    }

    #[test]
    fn test_draft_slot() {
        let dir = TempDir::new().unwrap();
        let mut storage = open_store(&dir);

        assert!(storage.load_draft().unwrap().is_none());

        let draft = Project::default();
        storage.save_draft(&draft).unwrap();
        assert_eq!(storage.load_draft().unwrap(), Some(draft));

        storage.clear_draft().unwrap();
        assert!(storage.load_draft().unwrap().is_none());
        // Clearing an already clean slot is not an error
        storage.clear_draft().unwrap();
    }

    #[test]
    fn test_catalog_and_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut storage = open_store(&dir);

        assert!(storage.load_catalog().unwrap().is_none());
        assert!(storage.load_config().unwrap().is_none());

        let catalog = MaterialCatalog::seeded();
        storage.save_catalog(&catalog).unwrap();
        assert_eq!(storage.load_catalog().unwrap(), Some(catalog));

        let mut config = AppConfig::default();
        config.app_name = "BoothWorks".to_string();
        storage.save_config(&config).unwrap();
        assert_eq!(storage.load_config().unwrap(), Some(config));
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let mut storage = open_store(&dir);

        storage.save_archive(&[]).unwrap();

        let final_path = storage.dir().join(ARCHIVE_FILE);
        let tmp_path = final_path.with_extension("json.tmp");
        assert!(final_path.exists());
        assert!(!tmp_path.exists());
    }

    #[test]
    fn test_saved_files_carry_schema_version() {
        let dir = TempDir::new().unwrap();
        let mut storage = open_store(&dir);
        storage.save_config(&AppConfig::default()).unwrap();

        let raw = fs::read_to_string(storage.dir().join(CONFIG_FILE)).unwrap();
        assert!(raw.contains(&format!("\"version\": \"{}\"", SCHEMA_VERSION)));
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let storage = open_store(&dir);

        fs::write(storage.dir().join(DRAFT_FILE), "{not json").unwrap();
        let err = storage.load_draft().unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.1.5").is_ok());

        // Different major fails
        assert!(validate_version("1.0.0").is_err());
        // Newer minor in 0.x fails
        assert!(validate_version("0.2.0").is_err());
        // Garbage fails
        assert!(validate_version("abc").is_err());
    }

    #[test]
    fn test_store_lock_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("store");

        let storage = JsonStorage::open(&store_dir, "test@example.com").unwrap();
        let lock_path = store_dir.join("store.json.lock");
        assert!(lock_path.exists());
        assert!(JsonStorage::check_locked(&store_dir).is_some());

        drop(storage);
        assert!(!lock_path.exists());
        assert!(JsonStorage::check_locked(&store_dir).is_none());
    }

    #[test]
    fn test_second_writer_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store_dir = dir.path().join("store");

        let _first = JsonStorage::open(&store_dir, "first@example.com").unwrap();
        let err = JsonStorage::open(&store_dir, "second@example.com").unwrap_err();
        assert_eq!(err.error_code(), "STORE_LOCKED");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load_archive().unwrap().is_empty());

        let draft = Project::default();
        storage.save_draft(&draft).unwrap();
        assert!(storage.has_draft());

        storage.clear_draft().unwrap();
        assert!(!storage.has_draft());
    }
}
