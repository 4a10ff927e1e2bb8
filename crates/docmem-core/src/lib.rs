//! # docmem Core
//!
//! Pure, I/O-free logic for docmem: fixed-window chunking, the
//! embedding provider trait, cosine similarity, and stable top-K ranking
//! over paired chunk/embedding records.
//!
//! This crate contains no tokio, filesystem, or network dependencies.
//! Persistence and concrete embedding backends live in the `docmem`
//! application crate.

pub mod chunk;
pub mod embedding;
pub mod models;
pub mod search;
