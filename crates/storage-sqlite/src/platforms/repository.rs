//! Repository for platform connections.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use std::sync::Arc;

use storepulse_core::errors::Result;
use storepulse_core::platforms::{
    NewPlatformConnection, Platform, PlatformConnection, PlatformConnectionRepositoryTrait,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::platform_connections;
use crate::utils::format_timestamp;

use super::model::PlatformConnectionDB;

pub struct PlatformConnectionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PlatformConnectionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PlatformConnectionRepositoryTrait for PlatformConnectionRepository {
    fn has_active_connection(&self, organization_id: &str, platform: Platform) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(exists(
            platform_connections::table
                .filter(platform_connections::organization_id.eq(organization_id))
                .filter(platform_connections::platform.eq(platform.as_str()))
                .filter(platform_connections::is_active.eq(true)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(found)
    }

    fn list_connections(&self, organization_id: &str) -> Result<Vec<PlatformConnection>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = platform_connections::table
            .filter(platform_connections::organization_id.eq(organization_id))
            .order(platform_connections::platform.asc())
            .select(PlatformConnectionDB::as_select())
            .load::<PlatformConnectionDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| PlatformConnection::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn connect(&self, connection: NewPlatformConnection) -> Result<PlatformConnection> {
        let row = PlatformConnectionDB {
            organization_id: connection.organization_id,
            platform: connection.platform.as_str().to_string(),
            account_id: connection.account_id,
            is_active: true,
            connected_at: format_timestamp(Utc::now()),
            disconnected_at: None,
        };
        self.writer
            .exec(move |conn| {
                diesel::insert_into(platform_connections::table)
                    .values(&row)
                    .on_conflict((
                        platform_connections::organization_id,
                        platform_connections::platform,
                    ))
                    .do_update()
                    .set((
                        platform_connections::account_id.eq(&row.account_id),
                        platform_connections::is_active.eq(true),
                        platform_connections::connected_at.eq(&row.connected_at),
                        platform_connections::disconnected_at.eq(None::<String>),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(PlatformConnection::try_from(row)?)
            })
            .await
    }

    async fn disconnect(&self, organization_id: &str, platform: Platform) -> Result<bool> {
        let organization_id = organization_id.to_string();
        let now = format_timestamp(Utc::now());
        self.writer
            .exec(move |conn| {
                let updated = diesel::update(
                    platform_connections::table
                        .filter(platform_connections::organization_id.eq(&organization_id))
                        .filter(platform_connections::platform.eq(platform.as_str()))
                        .filter(platform_connections::is_active.eq(true)),
                )
                .set((
                    platform_connections::is_active.eq(false),
                    platform_connections::disconnected_at.eq(Some(now)),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(updated > 0)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use storepulse_core::platforms::{ConnectedPlatformsTrait, PlatformConnectionInventory};
    use tempfile::tempdir;

    async fn create_test_repository() -> (Arc<PlatformConnectionRepository>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (
            Arc::new(PlatformConnectionRepository::new(pool, writer)),
            temp_dir,
        )
    }

    fn link(org: &str, platform: Platform, account: &str) -> NewPlatformConnection {
        NewPlatformConnection {
            organization_id: org.to_string(),
            platform,
            account_id: account.to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_disconnect_reconnect() {
        let (repo, _dir) = create_test_repository().await;

        repo.connect(link("org-1", Platform::Meta, "act-1"))
            .await
            .unwrap();
        assert!(repo.has_active_connection("org-1", Platform::Meta).unwrap());

        assert!(repo.disconnect("org-1", Platform::Meta).await.unwrap());
        assert!(!repo.disconnect("org-1", Platform::Meta).await.unwrap());
        assert!(!repo.has_active_connection("org-1", Platform::Meta).unwrap());

        let conn = repo
            .connect(link("org-1", Platform::Meta, "act-2"))
            .await
            .unwrap();
        assert!(conn.is_active);

        let all = repo.list_connections("org-1").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].account_id, "act-2");
        assert!(all[0].disconnected_at.is_none());
    }

    #[tokio::test]
    async fn test_inventory_over_sqlite() {
        let (repo, _dir) = create_test_repository().await;
        repo.connect(link("org-1", Platform::Shopify, "shop-1"))
            .await
            .unwrap();
        repo.connect(link("org-1", Platform::Tiktok, "tt-1"))
            .await
            .unwrap();
        repo.connect(link("org-2", Platform::Google, "g-1"))
            .await
            .unwrap();
        repo.disconnect("org-1", Platform::Tiktok).await.unwrap();

        let inventory = PlatformConnectionInventory::new(repo.clone());
        assert_eq!(
            inventory.list_connected_platforms("org-1").unwrap(),
            vec![Platform::Shopify]
        );
    }
}
