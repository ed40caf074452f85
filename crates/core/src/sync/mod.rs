//! Sync sessions, job orchestration and the completion barrier.

mod aggregator;
mod orchestrator;
mod session_tracker;
mod sync_request_model;
mod sync_session_model;

pub use aggregator::{initial_sync_trigger_key, BarrierDecision, SyncCompletionAggregator};
pub use orchestrator::{SyncJobOrchestrator, SyncOrchestratorTrait};
pub use session_tracker::SyncSessionTracker;
pub use sync_request_model::*;
pub use sync_session_model::*;
