//! In-memory job engine that records submissions instead of running them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::job_model::JobDescriptor;
use super::job_traits::JobEngine;
use crate::errors::{JobError, Result};

/// A job accepted by [`RecordingJobEngine`].
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub work_id: String,
    pub descriptor: JobDescriptor,
}

/// Collects submitted jobs for tests and dry runs.
///
/// Work ids are sequential (`job-1`, `job-2`, ...). Submissions can be made to
/// fail with [`RecordingJobEngine::reject_submissions`].
#[derive(Clone, Default)]
pub struct RecordingJobEngine {
    jobs: Arc<Mutex<Vec<SubmittedJob>>>,
    counter: Arc<AtomicUsize>,
    rejecting: Arc<Mutex<Option<String>>>,
}

impl RecordingJobEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded jobs in submission order.
    pub fn jobs(&self) -> Vec<SubmittedJob> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns recorded jobs whose handler matches `handler`.
    pub fn jobs_for(&self, handler: &str) -> Vec<SubmittedJob> {
        self.jobs()
            .into_iter()
            .filter(|job| job.descriptor.handler.as_str() == handler)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    /// Make every following submission fail with `reason`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        *self.rejecting.lock().unwrap_or_else(|e| e.into_inner()) = Some(reason.into());
    }
}

#[async_trait]
impl JobEngine for RecordingJobEngine {
    async fn submit(&self, job: JobDescriptor) -> Result<String> {
        if let Some(reason) = self.rejecting.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(JobError::SubmissionFailed(reason).into());
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let work_id = format!("job-{}", n);
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).push(SubmittedJob {
            work_id: work_id.clone(),
            descriptor: job,
        });
        Ok(work_id)
    }
}
