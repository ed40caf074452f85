/// Events older than this many days are removed by the cleanup sweep
pub const EVENT_RETENTION_DAYS: i64 = 90;

/// Maximum number of event records deleted per cleanup invocation
pub const CLEANUP_BATCH_SIZE: i64 = 100;

/// A platform account synced more recently than this is skipped (seconds)
pub const ACCOUNT_SYNC_COOLDOWN_SECS: i64 = 60 * 60;

/// Repeated sync requests for an org/platform inside this window reuse the first job (seconds)
pub const SYNC_REQUEST_WINDOW_SECS: i64 = 5;

/// Job handler that performs a platform data sync
pub const PLATFORM_SYNC_HANDLER: &str = "sync.platform";

/// Completion handler invoked after every platform sync job
pub const SYNC_COMPLETION_HANDLER: &str = "sync.on_complete";

/// Job handler that computes profit analytics for an organization
pub const PROFIT_ANALYTICS_HANDLER: &str = "analytics.profit";

/// Events returned by a recent-events query when the caller gives no limit
pub const DEFAULT_EVENT_QUERY_LIMIT: i64 = 50;

/// Upper bound on a recent-events query
pub const MAX_EVENT_QUERY_LIMIT: i64 = 500;
