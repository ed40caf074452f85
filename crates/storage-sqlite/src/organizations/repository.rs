//! Repository for organizations and organization costs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use storepulse_core::errors::Result;
use storepulse_core::organizations::{
    NewOrganization, NewOrganizationCost, Organization, OrganizationCost,
    OrganizationRepositoryTrait, OrganizationStateTrait,
};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{organization_costs, organizations};
use crate::utils::{format_date, format_timestamp};

use super::model::{OrganizationCostDB, OrganizationDB};

pub struct OrganizationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OrganizationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_organization(
    conn: &mut SqliteConnection,
    id: &str,
) -> std::result::Result<OrganizationDB, StorageError> {
    organizations::table
        .find(id)
        .select(OrganizationDB::as_select())
        .first::<OrganizationDB>(conn)
        .map_err(StorageError::from)
}

impl OrganizationStateTrait for OrganizationRepository {
    fn is_onboarding_complete(&self, organization_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let completed_at = organizations::table
            .find(organization_id)
            .select(organizations::onboarding_completed_at)
            .first::<Option<String>>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(matches!(completed_at, Some(Some(_))))
    }

    fn has_historical_costs(&self, organization_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(exists(
            organization_costs::table
                .filter(organization_costs::organization_id.eq(organization_id)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(found)
    }
}

#[async_trait]
impl OrganizationRepositoryTrait for OrganizationRepository {
    fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>> {
        let mut conn = get_connection(&self.pool)?;
        let row = organizations::table
            .find(organization_id)
            .select(OrganizationDB::as_select())
            .first::<OrganizationDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Organization::from))
    }

    async fn upsert_organization(&self, organization: NewOrganization) -> Result<Organization> {
        let now = format_timestamp(Utc::now());
        let row = OrganizationDB {
            id: organization.id,
            name: organization.name,
            onboarding_completed_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.writer
            .exec(move |conn| {
                diesel::insert_into(organizations::table)
                    .values(&row)
                    .on_conflict(organizations::id)
                    .do_update()
                    .set((
                        organizations::name.eq(&row.name),
                        organizations::updated_at.eq(&row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(load_organization(conn, &row.id)?.into())
            })
            .await
    }

    async fn mark_onboarding_complete(
        &self,
        organization_id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Organization> {
        let organization_id = organization_id.to_string();
        let stamp = format_timestamp(completed_at);
        self.writer
            .exec(move |conn| {
                // Organizations are created lazily by the first onboarding call.
                diesel::insert_or_ignore_into(organizations::table)
                    .values(OrganizationDB {
                        id: organization_id.clone(),
                        name: organization_id.clone(),
                        onboarding_completed_at: None,
                        created_at: stamp.clone(),
                        updated_at: stamp.clone(),
                    })
                    .execute(conn)
                    .map_err(StorageError::from)?;

                diesel::update(
                    organizations::table
                        .find(&organization_id)
                        .filter(organizations::onboarding_completed_at.is_null()),
                )
                .set((
                    organizations::onboarding_completed_at.eq(Some(stamp.clone())),
                    organizations::updated_at.eq(&stamp),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                Ok(load_organization(conn, &organization_id)?.into())
            })
            .await
    }

    async fn add_cost(&self, cost: NewOrganizationCost) -> Result<OrganizationCost> {
        let row = OrganizationCostDB {
            id: Uuid::new_v4().to_string(),
            organization_id: cost.organization_id,
            label: cost.label,
            amount: cost.amount.to_string(),
            currency: cost.currency.trim().to_uppercase(),
            effective_from: format_date(cost.effective_from),
            created_at: format_timestamp(Utc::now()),
        };
        self.writer
            .exec(move |conn| {
                diesel::insert_into(organization_costs::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(OrganizationCost::try_from(row)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (OrganizationRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (OrganizationRepository::new(pool, writer), temp_dir)
    }

    #[tokio::test]
    async fn test_onboarding_completion_is_idempotent() {
        let (repo, _dir) = create_test_repository().await;
        assert!(!repo.is_onboarding_complete("org-1").unwrap());

        let first_at = Utc::now() - Duration::hours(1);
        let first = repo
            .mark_onboarding_complete("org-1", first_at)
            .await
            .unwrap();
        assert!(first.is_onboarding_complete());

        let second = repo
            .mark_onboarding_complete("org-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(second.onboarding_completed_at, first.onboarding_completed_at);
        assert!(repo.is_onboarding_complete("org-1").unwrap());
    }

    #[tokio::test]
    async fn test_upsert_keeps_onboarding_state() {
        let (repo, _dir) = create_test_repository().await;
        repo.upsert_organization(NewOrganization {
            id: "org-1".to_string(),
            name: "Acme".to_string(),
        })
        .await
        .unwrap();
        repo.mark_onboarding_complete("org-1", Utc::now())
            .await
            .unwrap();

        let renamed = repo
            .upsert_organization(NewOrganization {
                id: "org-1".to_string(),
                name: "Acme Goods".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Acme Goods");
        assert!(renamed.is_onboarding_complete());
    }

    #[tokio::test]
    async fn test_costs_round_trip_and_flag_history() {
        let (repo, _dir) = create_test_repository().await;
        assert!(!repo.has_historical_costs("org-1").unwrap());

        let cost = repo
            .add_cost(NewOrganizationCost {
                organization_id: "org-1".to_string(),
                label: "Shipping".to_string(),
                amount: dec!(1234.50),
                currency: "usd".to_string(),
                effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(cost.amount, dec!(1234.50));
        assert_eq!(cost.currency, "USD");

        assert!(repo.has_historical_costs("org-1").unwrap());
        assert!(!repo.has_historical_costs("org-2").unwrap());
    }
}
