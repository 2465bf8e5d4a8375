//! Memcached Module
//!
//! Storage driver over the memcached protocol.

mod client;
mod driver;

#[cfg(test)]
mod property_tests;

pub use client::{CacheClient, MemcacheClient, Traced};
pub use driver::Driver;
