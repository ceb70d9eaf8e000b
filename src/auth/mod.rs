//! Authentication module
//!
//! Password hashing, bearer token signing and verification,
//! the request extractor guarding protected routes, and the user handlers.

pub mod handlers;
mod extractor;
mod password;
mod service;

pub use extractor::AuthenticatedUser;
pub use password::PasswordHasher;
pub use service::{Claims, TokenService};
