//! SQLite storage implementation for StorePulse.
//!
//! Implements the repository traits defined in `storepulse-core` with Diesel
//! over SQLite:
//! - connection pooling and embedded migrations
//! - a single writer task that serializes every write
//! - repository implementations and their Diesel row types
//!
//! This is the only crate with Diesel dependencies. Reads go through the
//! pool; writes go through [`WriteHandle`], so insert order is commit order.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod events;
pub mod organizations;
pub mod platforms;
pub mod sync;
pub mod webhooks;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use events::EventRepository;
pub use organizations::OrganizationRepository;
pub use platforms::PlatformConnectionRepository;
pub use sync::{AnalyticsTriggerRepository, SyncRequestRepository, SyncSessionRepository};
pub use webhooks::WebhookReceiptRepository;

// Re-export from storepulse-core for convenience
pub use storepulse_core::errors::{DatabaseError, Error, Result};
