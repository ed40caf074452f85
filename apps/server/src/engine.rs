//! In-process priority job engine for single-node deployments.
//!
//! Jobs wait in a heap ordered by priority, then submission order, and are
//! drained by a fixed number of tokio workers. Handlers and completion
//! handlers are installed after construction because the services that
//! implement them need the engine themselves.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use storepulse_core::errors::{JobError, Result};
use storepulse_core::jobs::{
    CompletionHandlerRegistry, HandlerRef, JobCompletion, JobDescriptor, JobEngine, JobOutcome,
    Priority,
};
use tokio::sync::Notify;
use uuid::Uuid;

/// Executes the payload of one job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, work_id: &str, payload: Value) -> Result<Value>;
}

#[derive(Clone, Default)]
pub struct JobHandlerRegistry {
    handlers: HashMap<HandlerRef, Arc<dyn JobHandler>>,
}

impl JobHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: impl Into<HandlerRef>, implementation: Arc<dyn JobHandler>) {
        self.handlers.insert(handler.into(), implementation);
    }

    pub fn resolve(&self, handler: &HandlerRef) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(handler).cloned()
    }
}

struct QueuedJob {
    priority: Priority,
    seq: u64,
    work_id: String,
    descriptor: JobDescriptor,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    // Max-heap: higher priority first, then the earlier submission.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Runtime {
    handlers: JobHandlerRegistry,
    completions: CompletionHandlerRegistry,
}

pub struct LocalJobEngine {
    queue: Mutex<BinaryHeap<QueuedJob>>,
    notify: Notify,
    seq: AtomicU64,
}

impl Default for LocalJobEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalJobEngine {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(BinaryHeap::new()),
            notify: Notify::new(),
            seq: AtomicU64::new(0),
        }
    }

    /// Installs the handlers and spawns `workers` tasks. Jobs submitted
    /// earlier stay queued until this is called.
    pub fn start(
        self: &Arc<Self>,
        handlers: JobHandlerRegistry,
        completions: CompletionHandlerRegistry,
        workers: usize,
    ) {
        let runtime = Arc::new(Runtime {
            handlers,
            completions,
        });
        for worker in 0..workers.max(1) {
            let engine = self.clone();
            let runtime = runtime.clone();
            tokio::spawn(async move {
                tracing::debug!("Job worker {} started", worker);
                loop {
                    let job = engine.next_job().await;
                    execute(&runtime, job).await;
                }
            });
        }
        tracing::info!("Local job engine started with {} worker(s)", workers.max(1));
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    fn pop(&self) -> Option<QueuedJob> {
        self.queue.lock().ok().and_then(|mut q| q.pop())
    }

    async fn next_job(&self) -> QueuedJob {
        loop {
            let notified = self.notify.notified();
            if let Some(job) = self.pop() {
                return job;
            }
            notified.await;
        }
    }
}

async fn execute(runtime: &Runtime, job: QueuedJob) {
    let QueuedJob {
        work_id,
        descriptor,
        ..
    } = job;

    let outcome = match runtime.handlers.resolve(&descriptor.handler) {
        Some(handler) => match handler.run(&work_id, descriptor.payload).await {
            Ok(output) => JobOutcome::Succeeded { output },
            Err(e) => {
                tracing::warn!("Job {} ({}) failed: {}", work_id, descriptor.handler, e);
                JobOutcome::Failed {
                    error: e.to_string(),
                }
            }
        },
        None => {
            tracing::warn!(
                "Job {} has no registered handler '{}'",
                work_id,
                descriptor.handler
            );
            JobOutcome::Failed {
                error: JobError::UnknownHandler(descriptor.handler.to_string()).to_string(),
            }
        }
    };

    let Some(spec) = descriptor.on_complete else {
        return;
    };
    let completion = JobCompletion {
        work_id: work_id.clone(),
        context: spec.context,
        result: outcome,
    };
    if let Err(e) = runtime.completions.deliver(&spec.handler, completion).await {
        tracing::error!(
            "Completion handler '{}' for job {} failed: {}",
            spec.handler,
            work_id,
            e
        );
    }
}

#[async_trait]
impl JobEngine for LocalJobEngine {
    async fn submit(&self, job: JobDescriptor) -> Result<String> {
        let work_id = Uuid::now_v7().to_string();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        {
            let mut queue = self
                .queue
                .lock()
                .map_err(|_| JobError::SubmissionFailed("job queue lock poisoned".to_string()))?;
            queue.push(QueuedJob {
                priority: job.priority,
                seq,
                work_id: work_id.clone(),
                descriptor: job,
            });
        }
        self.notify.notify_one();
        tracing::debug!("Queued job {} at seq {}", work_id, seq);
        Ok(work_id)
    }
}
