use async_trait::async_trait;
use serde_json::Value;

use super::job_model::{JobCompletion, JobDescriptor};
use crate::errors::Result;

/// The external priority job engine.
///
/// Submission never waits for execution. The engine invokes the attached
/// completion handler at least once after success or failure, so completion
/// handlers must be idempotent.
#[async_trait]
pub trait JobEngine: Send + Sync {
    /// Enqueue a job and return its work id.
    async fn submit(&self, job: JobDescriptor) -> Result<String>;
}

/// Code the engine runs once a job reaches a terminal state.
#[async_trait]
pub trait CompletionHandler: Send + Sync {
    async fn on_complete(&self, completion: JobCompletion<Value>) -> Result<()>;
}
