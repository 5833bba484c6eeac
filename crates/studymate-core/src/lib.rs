//! Core types and trait definitions for StudyMate.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the entity model, the collaborator contracts (document store, blob store),
//! the owner-scoped access layer, and the pure scheduling derivations.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod assignment;
pub mod blob;
pub mod document;
pub mod error;
pub mod memory;
pub mod profile;
pub mod schedule;
pub mod session;
pub mod subject;
pub mod task;
pub mod timestamp;

pub use error::{Error, Result};
