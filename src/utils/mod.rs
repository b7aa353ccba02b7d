pub mod token;
pub mod validators;

pub use token::{TokenClaims, TokenGenerator};
