//! Core types and trait definitions for RelationSync.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::RelationStore`]; AI backends implement
//! [`analysis::Analyzer`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analysis;
pub mod analytics;
pub mod error;
pub mod profile;
pub mod session;
pub mod situation;
pub mod store;

pub use error::{Error, Result};
