//! LSP protocol handlers.
//!
//! - [`inlay_hints`]: stale require/replace version annotations
//!
//! Handlers take the shared [`ServerState`](crate::document::ServerState)
//! and a [`MetadataSource`](gomod_core::MetadataSource) explicitly so they
//! can be exercised without a running client.

pub mod inlay_hints;
