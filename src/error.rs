use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Failures raised by a storage backend.
///
/// The durable mirror absorbs all of these; they never reach code that
/// drives the session store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	#[error("storage unavailable: {0}")]
	Unavailable(String),

	#[error("storage quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
	QuotaExceeded {
		key: String,
		needed: usize,
		limit: usize,
	},

	#[error("storage contents are corrupt: {0}")]
	Corrupt(String),
}

/// Per-field form validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
	fields: BTreeMap<String, String>,
}

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record an error for `field`. The first message for a field wins.
	pub fn add(&mut self, field: &str, message: &str) {
		self.fields
			.entry(field.to_string())
			.or_insert_with(|| message.to_string());
	}

	pub fn get(&self, field: &str) -> Option<&str> {
		self.fields.get(field).map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// `Ok(())` when nothing was recorded, otherwise the collected errors.
	pub fn into_result(self) -> Result<()> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(SessionError::Validation(self))
		}
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for (field, message) in &self.fields {
			if !first {
				write!(f, "; ")?;
			}
			write!(f, "{}: {}", field, message)?;
			first = false;
		}
		Ok(())
	}
}

#[derive(Debug, Error)]
pub enum SessionError {
	#[error(transparent)]
	Storage(#[from] StorageError),

	#[error("malformed value stored under {key}: {reason}")]
	MalformedStoredValue { key: String, reason: String },

	#[error("invalid plan value: {0}")]
	InvalidPlan(String),

	#[error("token error: {0}")]
	Token(String),

	#[error("validation failed: {0}")]
	Validation(ValidationErrors),

	#[error("configuration error: {0}")]
	Config(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
