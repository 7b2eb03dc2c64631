//! Operator session core for the vending machine administration console.
//!
//! The crate keeps track of who is signed in against the remote REST API:
//! it persists the bearer token, caches the operator profile, reconciles both
//! on start and decides which console routes the current role may reach.
//! Product, user and analytics screens consume the session through
//! [`session::SessionWatch`] and [`session::guard`].

pub mod api;
pub mod cli;
pub mod config;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
