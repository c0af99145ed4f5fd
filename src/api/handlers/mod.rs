//! API handlers for the lost-and-found registry.
//!
//! Route groups: the auth gate (`auth`), item CRUD/search/browse (`items`),
//! recovered-item records (`recovered`), plus the landing and health routes.
//! Shared wire types live in `types`.

pub mod auth;
pub mod health;
pub mod items;
pub mod recovered;
pub mod root;
pub mod types;
