//! Request and Response models for the KV HTTP facade
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies. Values travel
//! as UTF-8 strings.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ItemRequest, ItemsRequest, KeysRequest};
pub use responses::{
    ErrorResponse, GetResponse, HasResponse, HealthResponse, MGetResponse, OkResponse, TtlResponse,
};
