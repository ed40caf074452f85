use diesel::prelude::*;

use storepulse_core::platforms::PlatformConnection;

use crate::errors::StorageError;
use crate::utils::{parse_optional_timestamp, parse_timestamp};

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::platform_connections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlatformConnectionDB {
    pub organization_id: String,
    pub platform: String,
    pub account_id: String,
    pub is_active: bool,
    pub connected_at: String,
    pub disconnected_at: Option<String>,
}

impl TryFrom<PlatformConnectionDB> for PlatformConnection {
    type Error = StorageError;

    fn try_from(db: PlatformConnectionDB) -> Result<Self, Self::Error> {
        Ok(PlatformConnection {
            platform: db.platform.parse().map_err(|e| {
                StorageError::Corrupt(format!("connection for {}: {}", db.organization_id, e))
            })?,
            organization_id: db.organization_id,
            account_id: db.account_id,
            is_active: db.is_active,
            connected_at: parse_timestamp(&db.connected_at),
            disconnected_at: parse_optional_timestamp(db.disconnected_at),
        })
    }
}
