use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub job_workers: usize,
    pub cleanup_interval: Duration,
    pub event_retention_days: i64,
    pub cleanup_batch_size: i64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("SP_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid SP_LISTEN_ADDR")?;
        let db_path =
            std::env::var("SP_DB_PATH").unwrap_or_else(|_| "./db/storepulse.db".into());
        let cors_allow = std::env::var("SP_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("SP_REQUEST_TIMEOUT_MS", 30000);
        let cleanup_secs: u64 = env_or("SP_CLEANUP_INTERVAL_SECS", 3600);
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            job_workers: env_or("SP_JOB_WORKERS", 4usize).max(1),
            cleanup_interval: Duration::from_secs(cleanup_secs.max(1)),
            event_retention_days: env_or(
                "SP_EVENT_RETENTION_DAYS",
                storepulse_core::constants::EVENT_RETENTION_DAYS,
            ),
            cleanup_batch_size: env_or(
                "SP_CLEANUP_BATCH_SIZE",
                storepulse_core::constants::CLEANUP_BATCH_SIZE,
            ),
        })
    }
}
