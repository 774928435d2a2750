//! HTTP surface.
//!
//! Thin boundary over the core: request decoding, error mapping, and the
//! streamed response. All render semantics live in `crate::core`.

pub mod handlers;
pub mod routes;
pub mod streams;

pub use routes::create_router;
