//! Name-based lookup of completion handlers.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use serde_json::Value;

use super::job_model::{HandlerRef, JobCompletion};
use super::job_traits::CompletionHandler;
use crate::errors::{JobError, Result};

/// Resolves completion handlers by [`HandlerRef`] when a job finishes.
#[derive(Clone, Default)]
pub struct CompletionHandlerRegistry {
    handlers: HashMap<HandlerRef, Arc<dyn CompletionHandler>>,
}

impl CompletionHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; a later registration for the same name replaces it.
    pub fn register(
        &mut self,
        handler: impl Into<HandlerRef>,
        implementation: Arc<dyn CompletionHandler>,
    ) {
        self.handlers.insert(handler.into(), implementation);
    }

    pub fn resolve(&self, handler: &HandlerRef) -> Option<Arc<dyn CompletionHandler>> {
        self.handlers.get(handler).cloned()
    }

    /// Route a completion to the handler registered under `handler`.
    pub async fn deliver(&self, handler: &HandlerRef, completion: JobCompletion<Value>) -> Result<()> {
        match self.resolve(handler) {
            Some(target) => target.on_complete(completion).await,
            None => {
                warn!(
                    "No completion handler registered for '{}' (work {})",
                    handler, completion.work_id
                );
                Err(JobError::UnknownHandler(handler.to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobOutcome;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingHandler {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionHandler for CollectingHandler {
        async fn on_complete(&self, completion: JobCompletion<Value>) -> Result<()> {
            self.seen.lock().unwrap().push(completion.work_id);
            Ok(())
        }
    }

    fn completion(work_id: &str) -> JobCompletion<Value> {
        JobCompletion {
            work_id: work_id.to_string(),
            context: serde_json::json!({}),
            result: JobOutcome::Succeeded {
                output: Value::Null,
            },
        }
    }

    #[tokio::test]
    async fn test_deliver_routes_to_registered_handler() {
        let handler = Arc::new(CollectingHandler::default());
        let mut registry = CompletionHandlerRegistry::new();
        registry.register("sync.on_complete", handler.clone());

        registry
            .deliver(&HandlerRef::new("sync.on_complete"), completion("job-1"))
            .await
            .unwrap();

        assert_eq!(*handler.seen.lock().unwrap(), vec!["job-1".to_string()]);
    }

    #[tokio::test]
    async fn test_deliver_unknown_handler_is_error() {
        let registry = CompletionHandlerRegistry::new();
        let result = registry
            .deliver(&HandlerRef::new("missing"), completion("job-2"))
            .await;
        assert!(matches!(
            result,
            Err(crate::Error::Job(JobError::UnknownHandler(name))) if name == "missing"
        ));
    }
}
