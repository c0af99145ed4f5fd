//! # Retrovi (Lost and Found Registry)
//!
//! `retrovi` is the backend for a community lost-and-found board. Clients
//! authenticate with an email-bound session cookie, then create, browse,
//! search, update, and delete item records, and mark items recovered.
//!
//! ## Auth Gate
//!
//! Authentication is a signed, time-limited HS256 token carried in an
//! HTTP-only cookie. Every protected route verifies the cookie offline
//! against the process-wide shared secret; routes that act on a caller's own
//! records additionally check that the `email` claimed in the request body
//! matches the verified identity. All rejections answer `403 Forbidden` with
//! `{"message":"Unauthorized access"}`.
//!
//! ## Storage
//!
//! Item records live in MongoDB and handlers are a thin translation layer:
//! each operation builds one filter from the request and invokes exactly one
//! driver primitive (find/insert/update/delete). Driver results are forwarded
//! in the Node-driver wire shape so existing clients keep working.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
