//! Team management: members of an organization and their roles. The server
//! decides who may change roles; these helpers only validate input.

pub mod client;
pub mod types;

pub use client::MembersApi;
