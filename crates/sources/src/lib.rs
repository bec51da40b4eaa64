//! Contest listing collection from competitive programming platforms.
//!
//! This crate provides REST fetchers for the supported platforms and the
//! aggregator that merges their listings into one canonical contest list.
//!
//! ## Architecture
//!
//! - `adapter/` - Platform-specific fetching and response parsing
//! - `aggregator` - Concurrent fan-out over all adapters (`ContestFeed`)
//! - `error` - `SourceError` taxonomy

pub mod adapter;
pub mod aggregator;
pub mod error;

pub use adapter::{AtCoderAdapter, CodeChefAdapter, CodeforcesAdapter, LeetCodeAdapter};
pub use aggregator::*;
pub use error::*;
