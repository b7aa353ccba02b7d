use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::session::transition::StorageEffect;
use crate::storage::backend::StorageBackend;

/// Soft-failing view over a storage backend.
///
/// Backend errors are logged and swallowed: reads come back empty and
/// writes report `false`. Callers keep working from memory.
pub struct DurableMirror<B: StorageBackend> {
	backend: B,
}

impl<B: StorageBackend> DurableMirror<B> {
	pub fn new(backend: B) -> Self {
		DurableMirror { backend }
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	/// Read a raw string. Missing keys and backend failures both give `None`.
	pub fn get(&self, key: &str) -> Option<String> {
		match self.backend.read(key) {
			Ok(value) => value,
			Err(e) => {
				warn!("Durable read of {} skipped: {}", key, e);
				None
			}
		}
	}

	/// Write a raw string. Returns whether the value reached storage.
	pub fn set(&self, key: &str, value: &str) -> bool {
		match self.backend.write(key, value) {
			Ok(()) => {
				debug!("Stored {} ({} bytes)", key, value.len());
				true
			}
			Err(e) => {
				warn!("Durable write of {} skipped: {}", key, e);
				false
			}
		}
	}

	pub fn remove(&self, key: &str) -> bool {
		match self.backend.delete(key) {
			Ok(()) => {
				debug!("Removed {}", key);
				true
			}
			Err(e) => {
				warn!("Durable removal of {} skipped: {}", key, e);
				false
			}
		}
	}

	/// Read and parse a JSON value. An entry that does not parse is removed
	/// and treated as absent.
	pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let text = self.get(key)?;
		match serde_json::from_str(&text) {
			Ok(value) => Some(value),
			Err(e) => {
				warn!("Discarding malformed value stored under {}: {}", key, e);
				self.remove(key);
				None
			}
		}
	}

	pub fn store<T: Serialize>(&self, key: &str, value: &T) -> bool {
		match serde_json::to_string(value) {
			Ok(text) => self.set(key, &text),
			Err(e) => {
				warn!("Could not serialise value for {}: {}", key, e);
				false
			}
		}
	}

	/// Execute transition effects in order. Returns how many reached storage.
	pub fn apply(&self, effects: &[StorageEffect]) -> usize {
		let mut written = 0;
		for effect in effects {
			let ok = match effect {
				StorageEffect::Put { key, value } => self.set(key, value),
				StorageEffect::PutUser { key, user } => self.store(key, user),
				StorageEffect::Remove { key } => self.remove(key),
			};
			if ok {
				written += 1;
			} else {
				debug!("Effect on {} kept in memory only", effect.key());
			}
		}
		written
	}
}
