use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::StorageError;

/// Raw string key/value medium behind the durable mirror.
pub trait StorageBackend {
	fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
	fn delete(&self, key: &str) -> Result<(), StorageError>;
}

struct MemoryState {
	entries: HashMap<String, String>,
	available: bool,
	quota: Option<usize>,
}

impl MemoryState {
	fn used_bytes(&self) -> usize {
		self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
	}
}

/// Process-local storage. Clones share the same entries, so a clone stands
/// in for another page load against the same origin.
#[derive(Clone)]
pub struct MemoryBackend {
	state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		MemoryBackend {
			state: Arc::new(Mutex::new(MemoryState {
				entries: HashMap::new(),
				available: true,
				quota: None,
			})),
		}
	}

	/// Storage that rejects every call, like a browser in privacy mode.
	pub fn disabled() -> Self {
		let backend = Self::new();
		if let Ok(mut state) = backend.state.lock() {
			state.available = false;
		}
		backend
	}

	/// Limit the total bytes (keys plus values) the backend will hold.
	pub fn with_quota(limit: usize) -> Self {
		let backend = Self::new();
		if let Ok(mut state) = backend.state.lock() {
			state.quota = Some(limit);
		}
		backend
	}

	pub fn set_available(&self, available: bool) {
		if let Ok(mut state) = self.state.lock() {
			state.available = available;
		}
	}

	/// Copy of the current entries, for inspection.
	pub fn snapshot(&self) -> BTreeMap<String, String> {
		match self.state.lock() {
			Ok(state) => state
				.entries
				.iter()
				.map(|(k, v)| (k.clone(), v.clone()))
				.collect(),
			Err(_) => BTreeMap::new(),
		}
	}

	fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
		let state = self
			.state
			.lock()
			.map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;

		if !state.available {
			return Err(StorageError::Unavailable("storage is disabled".to_string()));
		}
		Ok(state)
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

impl StorageBackend for MemoryBackend {
	fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
		let state = self.lock()?;
		Ok(state.entries.get(key).cloned())
	}

	fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let mut state = self.lock()?;

		if let Some(limit) = state.quota {
			let replaced = state.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
			let needed = state.used_bytes() - replaced + key.len() + value.len();
			if needed > limit {
				return Err(StorageError::QuotaExceeded {
					key: key.to_string(),
					needed,
					limit,
				});
			}
		}

		state.entries.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut state = self.lock()?;
		state.entries.remove(key);
		Ok(())
	}
}

/// Storage kept in a single JSON object file.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
	path: PathBuf,
}

impl FileBackend {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		FileBackend {
			path: path.as_ref().to_path_buf(),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Read the file. A missing or blank file is empty. Entries whose value
	/// is not a string are dropped and the file is rewritten without them;
	/// only a document that is not a JSON object is `Corrupt`.
	fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
		let text = match fs::read_to_string(&self.path) {
			Ok(text) => text,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
			Err(e) => {
				return Err(StorageError::Unavailable(format!(
					"failed to read {}: {}",
					self.path.display(),
					e
				)))
			}
		};

		if text.trim().is_empty() {
			return Ok(BTreeMap::new());
		}

		let document: Map<String, Value> = serde_json::from_str(&text)
			.map_err(|e| StorageError::Corrupt(format!("{}: {}", self.path.display(), e)))?;

		let mut entries = BTreeMap::new();
		let mut dropped = 0;
		for (key, value) in document {
			match value {
				Value::String(value) => {
					entries.insert(key, value);
				}
				other => {
					warn!("Dropping non-string storage entry {} ({})", key, other);
					dropped += 1;
				}
			}
		}

		if dropped > 0 {
			if let Err(e) = self.save(&entries) {
				warn!("Failed to rewrite {} after dropping entries: {}", self.path.display(), e);
			}
		}
		Ok(entries)
	}

	// A corrupt file is treated as empty when writing so the next write repairs it
	fn load_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
		match self.load() {
			Err(StorageError::Corrupt(reason)) => {
				debug!("Replacing corrupt storage file ({})", reason);
				Ok(BTreeMap::new())
			}
			other => other,
		}
	}

	fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
		let text = serde_json::to_string_pretty(entries)
			.map_err(|e| StorageError::Unavailable(format!("failed to encode storage: {}", e)))?;

		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).map_err(|e| {
					StorageError::Unavailable(format!("failed to create {}: {}", parent.display(), e))
				})?;
			}
		}

		let tmp = self.path.with_extension("tmp");
		let write_tmp = || -> std::io::Result<()> {
			let mut file = fs::File::create(&tmp)?;
			file.write_all(text.as_bytes())?;
			file.sync_all()?;
			fs::rename(&tmp, &self.path)
		};

		write_tmp().map_err(|e| {
			let _ = fs::remove_file(&tmp);
			StorageError::Unavailable(format!("failed to write {}: {}", self.path.display(), e))
		})
	}
}

impl StorageBackend for FileBackend {
	fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.load()?.get(key).cloned())
	}

	fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let mut entries = self.load_for_update()?;
		entries.insert(key.to_string(), value.to_string());
		self.save(&entries)
	}

	fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut entries = self.load_for_update()?;
		if entries.remove(key).is_some() {
			self.save(&entries)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_clones_share_entries() {
		let a = MemoryBackend::new();
		let b = a.clone();

		a.write("k", "v").unwrap();
		assert_eq!(b.read("k").unwrap().as_deref(), Some("v"));

		b.delete("k").unwrap();
		assert_eq!(a.read("k").unwrap(), None);
	}

	#[test]
	fn disabled_memory_rejects_everything() {
		let backend = MemoryBackend::disabled();
		assert!(matches!(backend.read("k"), Err(StorageError::Unavailable(_))));
		assert!(matches!(backend.write("k", "v"), Err(StorageError::Unavailable(_))));
		assert!(matches!(backend.delete("k"), Err(StorageError::Unavailable(_))));

		backend.set_available(true);
		backend.write("k", "v").unwrap();
		assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
	}

	#[test]
	fn quota_counts_replaced_values() {
		let backend = MemoryBackend::with_quota(10);
		backend.write("ab", "12345").unwrap(); // 7 bytes
		backend.write("ab", "12345678").unwrap(); // replaces, 10 bytes

		match backend.write("c", "x") {
			Err(StorageError::QuotaExceeded { key, needed, limit }) => {
				assert_eq!(key, "c");
				assert_eq!(needed, 12);
				assert_eq!(limit, 10);
			}
			other => panic!("unexpected result: {:?}", other),
		}
		assert_eq!(backend.snapshot().len(), 1);
	}

	#[test]
	fn file_backend_persists_between_handles() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("storage.json");

		let first = FileBackend::new(&path);
		assert_eq!(first.read("k").unwrap(), None);
		first.write("k", "v").unwrap();
		first.write("other", "w").unwrap();

		let second = FileBackend::new(&path);
		assert_eq!(second.read("k").unwrap().as_deref(), Some("v"));

		second.delete("k").unwrap();
		assert_eq!(first.read("k").unwrap(), None);
		assert_eq!(first.read("other").unwrap().as_deref(), Some("w"));
		assert!(!path.with_extension("tmp").exists());
	}

	#[test]
	fn corrupt_file_reports_then_repairs_on_write() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("storage.json");
		fs::write(&path, "{not json").unwrap();

		let backend = FileBackend::new(&path);
		assert!(matches!(backend.read("k"), Err(StorageError::Corrupt(_))));

		backend.write("k", "v").unwrap();
		assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
	}

	#[test]
	fn non_object_document_is_corrupt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("storage.json");
		fs::write(&path, "[\"session-user\"]").unwrap();

		assert!(matches!(
			FileBackend::new(&path).read("session-user"),
			Err(StorageError::Corrupt(_))
		));
	}

	#[test]
	fn non_string_entry_is_dropped_and_the_rest_kept() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("storage.json");
		fs::write(&path, r#"{"good": "kept", "bad": 4, "nested": {"a": 1}}"#).unwrap();

		let backend = FileBackend::new(&path);
		assert_eq!(backend.read("good").unwrap().as_deref(), Some("kept"));
		assert_eq!(backend.read("bad").unwrap(), None);

		let on_disk: BTreeMap<String, String> =
			serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
		assert_eq!(on_disk.len(), 1);
		assert_eq!(on_disk.get("good").map(String::as_str), Some("kept"));

		backend.write("other", "w").unwrap();
		assert_eq!(backend.read("good").unwrap().as_deref(), Some("kept"));
	}
}
