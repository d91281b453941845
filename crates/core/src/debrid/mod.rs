//! Debrid provider abstraction.
//!
//! This module provides a `DebridClient` trait that each debrid backend
//! (Real-Debrid, All-Debrid, ...) implements, plus the registry mapping
//! provider names to clients and the filename matching shared by all of
//! them. Clients list what the account already holds and mint direct
//! links on demand; they never search the public web.

mod all_debrid;
mod matching;
mod real_debrid;
mod registry;
mod stream;
mod types;

pub use all_debrid::AllDebridClient;
pub use matching::{extract_quality, format_bytes, matches_external_id};
pub use real_debrid::RealDebridClient;
pub use registry::{ClientRegistry, StandardRegistry};
pub use stream::format_stream_entry;
pub use types::*;
