//! Memory Module
//!
//! In-process stand-in for a memcached server. Follows memcached's expiration
//! rules and counts every call, so driver behavior can be checked without a
//! running server.

mod entry;
mod stats;
mod store;

// Re-export public types
pub use entry::{current_timestamp, Entry};
pub use stats::ClientStats;
pub use store::MemoryClient;

// == Public Constants ==
/// Maximum key length accepted by memcached, in bytes
pub const MAX_KEY_LENGTH: usize = 250;
