//! Database models for event records.

use diesel::prelude::*;
use serde_json::Value;

use storepulse_core::events::{EventCategory, EventRecord};
use storepulse_core::jobs::Priority;

use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRecordDB {
    pub id: String,
    pub organization_id: String,
    pub actor_user_id: Option<String>,
    pub event_type: String,
    pub priority: String,
    pub category: String,
    pub payload: String,
    pub created_at: String,
}

impl From<EventRecordDB> for EventRecord {
    fn from(db: EventRecordDB) -> Self {
        Self {
            id: db.id,
            organization_id: db.organization_id,
            actor_user_id: db.actor_user_id,
            event_type: db.event_type,
            priority: Priority::from_str_lossy(&db.priority),
            category: EventCategory::from_str_lossy(&db.category),
            payload: serde_json::from_str(&db.payload).unwrap_or(Value::Null),
            created_at: parse_timestamp(&db.created_at),
        }
    }
}

impl From<&EventRecord> for EventRecordDB {
    fn from(domain: &EventRecord) -> Self {
        Self {
            id: domain.id.clone(),
            organization_id: domain.organization_id.clone(),
            actor_user_id: domain.actor_user_id.clone(),
            event_type: domain.event_type.clone(),
            priority: domain.priority.as_str().to_string(),
            category: domain.category.as_str().to_string(),
            payload: domain.payload.to_string(),
            created_at: format_timestamp(domain.created_at),
        }
    }
}
