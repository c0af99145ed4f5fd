//! Auth gate: credential issuance, verification, and the ownership check.
//!
//! Flow Overview:
//! 1) `/jwt` signs a time-limited credential and sets it as an HTTP-only cookie.
//! 2) Protected routes verify the cookie offline via [`principal::require_auth`].
//! 3) Owner-scoped routes compare the body's `email` claim via
//!    [`principal::require_owner`].

pub mod principal;
pub mod session;
mod state;
mod token;

pub use state::{AuthConfig, AuthState};
