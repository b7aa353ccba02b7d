// Export session modules
pub mod guard;
pub mod models;
pub mod store;
pub mod transition;

// Re-export main types
pub use guard::{Access, Navigation, RouteGuard, View};
pub use models::{PremiumPlan, Session, User};
pub use store::SessionStore;
pub use transition::{Action, StorageEffect, Transition};
