//! Kudos feed, giving kudos, and the analytics summary.

pub mod client;
pub mod types;

pub use client::{KudosApi, MAX_MESSAGE_CHARS};
