//! Image upload backend: issues presigned S3 write URLs

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// HTTP routes
pub mod routes;

/// HTTP server bootstrap
pub mod server;

/// Configuration and API error types
pub mod types;

/// Presigned upload credential issuance
pub mod upload_storage;
