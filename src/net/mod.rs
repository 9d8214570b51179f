//! HTTP plumbing: wire types, header/error helpers, and the API client.

pub mod api;
pub mod request;
pub mod types;
