// Export modules
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::{Authenticator, LoginForm, RegistrationForm};
pub use config::Config;
pub use error::{Result, SessionError, StorageError, ValidationErrors};
pub use session::{Navigation, PremiumPlan, RouteGuard, Session, SessionStore, User, View};
pub use storage::{DurableMirror, FileBackend, MemoryBackend, StorageBackend};
pub use utils::token::TokenGenerator;
