//! Job descriptors submitted to the external job engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{JobError, Result};

/// Execution priority shared by events and jobs.
///
/// Variants are declared lowest first so the derived ordering gives
/// `Critical > High > Normal > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Parses a stored priority, falling back to `Normal` for unknown values.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "low" => Priority::Low,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            _ => Priority::Normal,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a handler the engine resolves at execution time.
///
/// Handlers may live in another process, so only the name travels with the job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(String);

impl HandlerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Completion callback attached to a job: handler name plus plain-data context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSpec<C> {
    pub handler: HandlerRef,
    pub context: C,
}

/// A unit of background work with a typed completion context.
#[derive(Debug, Clone)]
pub struct Job<C> {
    pub handler: HandlerRef,
    pub priority: Priority,
    pub payload: Value,
    pub on_complete: Option<CompletionSpec<C>>,
}

impl<C: Serialize> Job<C> {
    pub fn new(handler: impl Into<HandlerRef>, priority: Priority, payload: Value) -> Self {
        Self {
            handler: handler.into(),
            priority,
            payload,
            on_complete: None,
        }
    }

    /// Attach the completion handler and the context it will receive.
    pub fn on_complete(mut self, handler: impl Into<HandlerRef>, context: C) -> Self {
        self.on_complete = Some(CompletionSpec {
            handler: handler.into(),
            context,
        });
        self
    }

    /// Erase the context type so the job can cross the engine boundary.
    pub fn into_descriptor(self) -> Result<JobDescriptor> {
        let on_complete = match self.on_complete {
            Some(spec) => Some(CompletionSpec {
                handler: spec.handler,
                context: serde_json::to_value(spec.context)?,
            }),
            None => None,
        };
        Ok(JobDescriptor {
            handler: self.handler,
            priority: self.priority,
            payload: self.payload,
            on_complete,
        })
    }
}

/// Serializable form of a [`Job`] as handed to the engine.
///
/// Consumed exactly once by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    pub handler: HandlerRef,
    pub priority: Priority,
    pub payload: Value,
    pub on_complete: Option<CompletionSpec<Value>>,
}

/// Terminal result of a job as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded {
        #[serde(default)]
        output: Value,
    },
    Failed {
        error: String,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }
}

/// What a completion handler receives: `{workId, context, result}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCompletion<C> {
    pub work_id: String,
    pub context: C,
    pub result: JobOutcome,
}

impl JobCompletion<Value> {
    /// Decode the erased context into the handler's own context type.
    pub fn decode<C: DeserializeOwned>(self) -> Result<JobCompletion<C>> {
        let context = serde_json::from_value(self.context)
            .map_err(|e| JobError::InvalidContext(e.to_string()))?;
        Ok(JobCompletion {
            work_id: self.work_id,
            context,
            result: self.result,
        })
    }
}
