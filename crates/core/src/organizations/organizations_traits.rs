use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::organizations_model::{
    NewOrganization, NewOrganizationCost, Organization, OrganizationCost,
};
use crate::errors::Result;

/// Read-only organization lookups used by the completion aggregator.
pub trait OrganizationStateTrait: Send + Sync {
    /// Unknown organizations have not completed onboarding.
    fn is_onboarding_complete(&self, organization_id: &str) -> Result<bool>;

    fn has_historical_costs(&self, organization_id: &str) -> Result<bool>;
}

/// Trait for organization persistence
#[async_trait]
pub trait OrganizationRepositoryTrait: Send + Sync {
    fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>>;

    async fn upsert_organization(&self, organization: NewOrganization) -> Result<Organization>;

    /// Idempotent: an existing completion timestamp is kept.
    async fn mark_onboarding_complete(
        &self,
        organization_id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Organization>;

    async fn add_cost(&self, cost: NewOrganizationCost) -> Result<OrganizationCost>;
}
