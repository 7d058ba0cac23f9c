//! Cache module for persisting fetched pages and API responses to disk
//!
//! All responses live in a single JSON object keyed by request identity. The
//! file is loaded once at startup and rewritten in full whenever a new entry
//! is added. Entries never expire.

mod store;

pub use store::{CacheEntries, CacheStore};
