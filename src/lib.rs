//! # kudos
//!
//! Client for the kudos workplace-recognition API. Sign-in is passwordless:
//! signup or login emails a 6-digit code, and verifying it yields a bearer
//! token plus the user. A cookie-backed refresh call restores a session
//! without a new code.
//!
//! The crate is layered the same way for every feature:
//!
//! - [`app_lib`]: the shared `HttpClient`, configuration, errors, and the
//!   user-id hint store.
//! - [`features`]: per-domain API clients and types. `features::auth` adds
//!   the repository, use-cases, the session state machine, and the OTP
//!   verification controller.
//! - [`cli`]: the `kudos` terminal front-end.

pub mod app_lib;
pub mod cli;
pub mod features;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Git commit recorded at build time.
pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
