//! Infrastructure layer for livedeck.
//!
//! Configuration loading, the SSE wire decoder and the reqwest client that
//! implements the core's collaborator ports.

pub mod config;
pub mod http_client;
pub mod paths;
pub mod sse;

pub use config::LivedeckConfig;
pub use http_client::LiveApiClient;
pub use paths::{LivedeckPaths, PathError};
pub use sse::SseDecoder;
