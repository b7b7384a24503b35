//! Shelf API Library
//!
//! HTTP ingress for the virtual filesystem: accepts uploads over two
//! transports (raw stream and multipart form), writes them through the
//! storage abstraction, and hands video content off to detached thumbnail
//! derivation.

pub mod error;
pub mod handlers;
pub mod headers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;
