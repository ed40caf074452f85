//! Job descriptors and the seam to the external job engine.
//!
//! The engine itself lives outside this crate. Core services shape jobs,
//! attach completion callbacks by name, and hand them to a [`JobEngine`].

mod job_model;
mod job_traits;
mod recording;
mod registry;

pub use job_model::*;
pub use job_traits::*;
pub use recording::{RecordingJobEngine, SubmittedJob};
pub use registry::CompletionHandlerRegistry;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ctx {
        org: String,
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_priority_lossy_parse_defaults_to_normal() {
        assert_eq!(Priority::from_str_lossy("critical"), Priority::Critical);
        assert_eq!(Priority::from_str_lossy("urgent"), Priority::Normal);
    }

    #[test]
    fn test_job_descriptor_carries_serialized_context() {
        let job = Job::new("sync.platform", Priority::High, json!({ "platform": "meta" }))
            .on_complete("sync.on_complete", Ctx { org: "org-1".into() });

        let descriptor = job.into_descriptor().unwrap();
        assert_eq!(descriptor.handler.as_str(), "sync.platform");
        assert_eq!(descriptor.priority, Priority::High);
        let spec = descriptor.on_complete.unwrap();
        assert_eq!(spec.handler.as_str(), "sync.on_complete");
        assert_eq!(spec.context, json!({ "org": "org-1" }));
    }

    #[test]
    fn test_completion_decode_rejects_foreign_context() {
        let completion = JobCompletion {
            work_id: "job-1".to_string(),
            context: json!({ "unexpected": true }),
            result: JobOutcome::Failed {
                error: "boom".into(),
            },
        };
        assert!(completion.decode::<Ctx>().is_err());
    }

    #[tokio::test]
    async fn test_recording_engine_assigns_sequential_ids() {
        let engine = RecordingJobEngine::new();
        let job = Job::<()>::new("a", Priority::Low, json!({}))
            .into_descriptor()
            .unwrap();
        assert_eq!(engine.submit(job.clone()).await.unwrap(), "job-1");
        assert_eq!(engine.submit(job).await.unwrap(), "job-2");
        assert_eq!(engine.jobs_for("a").len(), 2);

        engine.reject_submissions("engine offline");
        let job = Job::<()>::new("a", Priority::Low, json!({}))
            .into_descriptor()
            .unwrap();
        assert!(engine.submit(job).await.is_err());
        assert_eq!(engine.len(), 2);
    }
}
