use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use storepulse_core::{
    constants::{PLATFORM_SYNC_HANDLER, PROFIT_ANALYTICS_HANDLER, SYNC_COMPLETION_HANDLER},
    events::{
        EventAction, EventRetentionService, EventService, EventServiceTrait, JobEventDispatcher,
        RetentionPolicy,
    },
    jobs::{CompletionHandlerRegistry, JobEngine},
    organizations::OrganizationService,
    platforms::{PlatformConnectionInventory, PlatformConnectionService},
    sync::{
        SyncCompletionAggregator, SyncDebouncePolicy, SyncJobOrchestrator, SyncOrchestratorTrait,
        SyncSessionRepositoryTrait, SyncSessionTracker,
    },
    webhooks::WebhookReceiptService,
};
use storepulse_storage_sqlite::{
    db, AnalyticsTriggerRepository, EventRepository, OrganizationRepository,
    PlatformConnectionRepository, SyncRequestRepository, SyncSessionRepository,
    WebhookReceiptRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::engine::{JobHandlerRegistry, LocalJobEngine};
use crate::handlers::{
    AcknowledgeHandler, ComputeAnalyticsHandler, PlatformSyncHandler, ACKNOWLEDGED_ACTIONS,
};

pub struct AppState {
    pub event_service: Arc<dyn EventServiceTrait>,
    pub sync_orchestrator: Arc<dyn SyncOrchestratorTrait>,
    pub sync_sessions: Arc<dyn SyncSessionRepositoryTrait>,
    pub aggregator: Arc<SyncCompletionAggregator>,
    pub webhook_service: Arc<WebhookReceiptService>,
    pub connection_service: Arc<PlatformConnectionService>,
    pub organization_service: Arc<OrganizationService>,
    pub retention_service: Arc<EventRetentionService>,
    pub job_engine: Arc<LocalJobEngine>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("SP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let event_repo = Arc::new(EventRepository::new(pool.clone(), writer.clone()));
    let session_repo = Arc::new(SyncSessionRepository::new(pool.clone(), writer.clone()));
    let request_repo = Arc::new(SyncRequestRepository::new(pool.clone(), writer.clone()));
    let trigger_repo = Arc::new(AnalyticsTriggerRepository::new(pool.clone(), writer.clone()));
    let connection_repo = Arc::new(PlatformConnectionRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let organization_repo = Arc::new(OrganizationRepository::new(pool.clone(), writer.clone()));
    let webhook_repo = Arc::new(WebhookReceiptRepository::new(pool.clone(), writer.clone()));

    // The engine is created first and started last: handlers need services
    // that submit to it.
    let job_engine = Arc::new(LocalJobEngine::new());
    let engine: Arc<dyn JobEngine> = job_engine.clone();

    let dispatcher = Arc::new(JobEventDispatcher::new(engine.clone()));
    let event_service: Arc<dyn EventServiceTrait> =
        Arc::new(EventService::new(event_repo.clone(), dispatcher));

    let retention_service = Arc::new(EventRetentionService::new(
        event_repo,
        RetentionPolicy {
            max_age: ChronoDuration::days(config.event_retention_days),
            batch_size: config.cleanup_batch_size,
        },
    )?);

    let sync_orchestrator = Arc::new(SyncJobOrchestrator::new(
        engine.clone(),
        session_repo.clone(),
        request_repo,
        SyncDebouncePolicy::default(),
    ));

    let inventory = Arc::new(PlatformConnectionInventory::new(connection_repo.clone()));
    let aggregator = Arc::new(SyncCompletionAggregator::new(
        engine.clone(),
        inventory,
        session_repo.clone(),
        organization_repo.clone(),
        trigger_repo,
    ));

    let connection_service = Arc::new(PlatformConnectionService::new(
        connection_repo,
        event_service.clone(),
    ));
    let organization_service = Arc::new(OrganizationService::new(
        organization_repo,
        event_service.clone(),
    ));
    let webhook_service = Arc::new(WebhookReceiptService::new(webhook_repo));

    let tracker = Arc::new(SyncSessionTracker::new(session_repo.clone()));
    let mut handlers = JobHandlerRegistry::new();
    handlers.register(
        PLATFORM_SYNC_HANDLER,
        Arc::new(PlatformSyncHandler::new(tracker, event_service.clone())),
    );
    handlers.register(
        EventAction::ComputeAnalytics.handler_ref(),
        Arc::new(ComputeAnalyticsHandler::new(aggregator.clone())),
    );
    handlers.register(
        PROFIT_ANALYTICS_HANDLER,
        Arc::new(AcknowledgeHandler::new(PROFIT_ANALYTICS_HANDLER)),
    );
    for action in ACKNOWLEDGED_ACTIONS {
        handlers.register(
            action.handler_ref(),
            Arc::new(AcknowledgeHandler::new(action.handler_ref())),
        );
    }

    let mut completions = CompletionHandlerRegistry::new();
    completions.register(SYNC_COMPLETION_HANDLER, aggregator.clone());

    job_engine.start(handlers, completions, config.job_workers);

    Ok(Arc::new(AppState {
        event_service,
        sync_orchestrator,
        sync_sessions: session_repo,
        aggregator,
        webhook_service,
        connection_service,
        organization_service,
        retention_service,
        job_engine,
        db_path,
    }))
}
