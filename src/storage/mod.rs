//! Persistence for the version baseline.

pub mod cache;

pub use cache::VersionCache;
