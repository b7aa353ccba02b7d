// Export storage modules
pub mod backend;
pub mod mirror;

// Re-export main types
pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use mirror::DurableMirror;
