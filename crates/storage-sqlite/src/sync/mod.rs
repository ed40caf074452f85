//! SQLite storage for sync sessions, the sync request log and the analytics
//! trigger ledger.

pub mod analytics_trigger;
pub mod request;
pub mod session;

pub use analytics_trigger::AnalyticsTriggerRepository;
pub use request::SyncRequestRepository;
pub use session::SyncSessionRepository;
