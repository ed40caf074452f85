//! StorePulse Core - event routing and sync orchestration.
//!
//! This crate decides what happens when a business event occurs and
//! coordinates background work across independently synced platforms.
//! It is database-agnostic and defines the traits implemented by the
//! `storage-sqlite` crate; the job engine is reached only through
//! [`jobs::JobEngine`].

pub mod constants;
pub mod errors;
pub mod events;
pub mod jobs;
pub mod organizations;
pub mod platforms;
pub mod sync;
pub mod webhooks;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
