use diesel::prelude::*;

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::analytics_triggers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalyticsTriggerDB {
    pub trigger_key: String,
    pub organization_id: String,
    pub job_id: Option<String>,
    pub claimed_at: String,
}
