//! Repository for event record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use storepulse_core::errors::Result;
use storepulse_core::events::{EventQuery, EventRecord, EventRepositoryTrait};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::events;
use crate::utils::{chunk_for_sqlite, format_timestamp};

use super::model::EventRecordDB;

pub struct EventRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl EventRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn insert(&self, record: EventRecord) -> Result<EventRecord> {
        let row = EventRecordDB::from(&record);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(events::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(record)
            })
            .await
    }

    fn get_recent(&self, query: &EventQuery) -> Result<Vec<EventRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut statement = events::table
            .filter(events::organization_id.eq(&query.organization_id))
            .into_boxed();
        if let Some(event_type) = &query.event_type {
            statement = statement.filter(events::event_type.eq(event_type));
        }

        let rows = statement
            .order((events::created_at.desc(), events::id.desc()))
            .limit(query.limit)
            .select(EventRecordDB::as_select())
            .load::<EventRecordDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(EventRecord::from).collect())
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<usize> {
        let cutoff = format_timestamp(cutoff);
        self.writer
            .exec(move |conn| {
                let expired: Vec<String> = events::table
                    .filter(events::created_at.lt(&cutoff))
                    .order(events::created_at.asc())
                    .limit(limit)
                    .select(events::id)
                    .load(conn)
                    .map_err(StorageError::from)?;

                let mut deleted = 0;
                for chunk in chunk_for_sqlite(&expired) {
                    deleted += diesel::delete(events::table.filter(events::id.eq_any(chunk)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(deleted)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::Duration;
    use serde_json::json;
    use storepulse_core::events::EventCategory;
    use storepulse_core::jobs::Priority;
    use tempfile::tempdir;

    async fn create_test_repository() -> (EventRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (EventRepository::new(pool, writer), temp_dir)
    }

    fn record(id: &str, org: &str, event_type: &str, created_at: DateTime<Utc>) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            organization_id: org.to_string(),
            actor_user_id: Some("user-1".to_string()),
            event_type: event_type.to_string(),
            priority: Priority::High,
            category: EventCategory::Commerce,
            payload: json!({ "order_id": id }),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let (repo, _dir) = create_test_repository().await;
        let now = Utc::now();
        repo.insert(record("e1", "org-1", "order_created", now))
            .await
            .unwrap();

        let rows = repo
            .get_recent(&EventQuery {
                organization_id: "org-1".into(),
                limit: 10,
                event_type: None,
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].priority, Priority::High);
        assert_eq!(rows[0].category, EventCategory::Commerce);
        assert_eq!(rows[0].payload, json!({ "order_id": "e1" }));
        assert_eq!(
            rows[0].created_at.timestamp_micros(),
            now.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_with_filters() {
        let (repo, _dir) = create_test_repository().await;
        let now = Utc::now();
        repo.insert(record("e1", "org-1", "order_created", now - Duration::minutes(3)))
            .await
            .unwrap();
        repo.insert(record("e2", "org-1", "user_active", now - Duration::minutes(2)))
            .await
            .unwrap();
        repo.insert(record("e3", "org-1", "order_created", now - Duration::minutes(1)))
            .await
            .unwrap();
        repo.insert(record("e4", "org-2", "order_created", now))
            .await
            .unwrap();

        let orders = repo
            .get_recent(&EventQuery {
                organization_id: "org-1".into(),
                limit: 10,
                event_type: Some("order_created".into()),
            })
            .unwrap();
        let ids: Vec<&str> = orders.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e3", "e1"]);

        let limited = repo
            .get_recent(&EventQuery {
                organization_id: "org-1".into(),
                limit: 1,
                event_type: None,
            })
            .unwrap();
        assert_eq!(limited[0].id, "e3");
    }

    #[tokio::test]
    async fn test_delete_created_before_is_bounded_and_oldest_first() {
        let (repo, _dir) = create_test_repository().await;
        let now = Utc::now();
        for (i, days) in [200, 150, 120, 91, 30].iter().enumerate() {
            repo.insert(record(
                &format!("e{}", i),
                "org-1",
                "user_active",
                now - Duration::days(*days),
            ))
            .await
            .unwrap();
        }
        let cutoff = now - Duration::days(90);

        assert_eq!(repo.delete_created_before(cutoff, 3).await.unwrap(), 3);
        assert_eq!(repo.delete_created_before(cutoff, 3).await.unwrap(), 1);
        assert_eq!(repo.delete_created_before(cutoff, 3).await.unwrap(), 0);

        let remaining = repo
            .get_recent(&EventQuery {
                organization_id: "org-1".into(),
                limit: 10,
                event_type: None,
            })
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "e4");
    }
}
