// src/models/mod.rs

//! Domain models for the appwatch application.

mod cache;
pub mod region;
mod release;

// Re-export all public types
pub use cache::CacheEntry;
pub use release::{AppRelease, NO_NOTES, UNKNOWN_RELEASE_TIME};
