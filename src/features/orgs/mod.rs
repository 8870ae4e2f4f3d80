//! Organizations the signed-in user belongs to, plus create and join.

pub mod client;
pub mod types;

pub use client::OrgsApi;
