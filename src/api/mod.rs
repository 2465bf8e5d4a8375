//! API Module
//!
//! HTTP/JSON facade over the configured storages.
//!
//! # Endpoints
//! - `POST /kv/:storage/{has,mget,set,mexpire,ttl,delete,clear}`
//! - `GET /kv/:storage/get/:key` - Retrieve one value
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
