use std::sync::Arc;

use chrono::Utc;
use log::info;

use super::organizations_model::{NewOrganization, NewOrganizationCost, Organization, OrganizationCost};
use super::organizations_traits::OrganizationRepositoryTrait;
use crate::errors::{require_non_empty, Result, ValidationError};
use crate::events::{DomainEvent, EmitRequest, EventServiceTrait};

pub struct OrganizationService {
    repository: Arc<dyn OrganizationRepositoryTrait>,
    event_service: Arc<dyn EventServiceTrait>,
}

impl OrganizationService {
    pub fn new(
        repository: Arc<dyn OrganizationRepositoryTrait>,
        event_service: Arc<dyn EventServiceTrait>,
    ) -> Self {
        Self {
            repository,
            event_service,
        }
    }

    pub fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>> {
        require_non_empty("organizationId", organization_id)?;
        self.repository.get_organization(organization_id)
    }

    pub async fn upsert_organization(&self, organization: NewOrganization) -> Result<Organization> {
        require_non_empty("id", &organization.id)?;
        require_non_empty("name", &organization.name)?;
        self.repository.upsert_organization(organization).await
    }

    /// Marks onboarding complete and emits `onboarding_completed`.
    ///
    /// The event is emitted on every call so a deferred analytics run can be
    /// re-requested; its handler is idempotent.
    pub async fn complete_onboarding(
        &self,
        organization_id: &str,
        actor_user_id: Option<String>,
    ) -> Result<Organization> {
        require_non_empty("organizationId", organization_id)?;
        let organization = self
            .repository
            .mark_onboarding_complete(organization_id, Utc::now())
            .await?;
        info!("Onboarding complete for organization {}", organization_id);

        let mut request = EmitRequest::new(DomainEvent::onboarding_completed(), organization_id);
        request.actor_user_id = actor_user_id;
        self.event_service.emit(request).await?;
        Ok(organization)
    }

    pub async fn add_cost(&self, cost: NewOrganizationCost) -> Result<OrganizationCost> {
        require_non_empty("organizationId", &cost.organization_id)?;
        require_non_empty("label", &cost.label)?;
        if cost.currency.trim().len() != 3 {
            return Err(ValidationError::InvalidInput(format!(
                "Currency must be a 3-letter code, got '{}'",
                cost.currency
            ))
            .into());
        }
        self.repository.add_cost(cost).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EmitResult, EventRecord};
    use crate::jobs::Priority;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryOrganizations {
        organization: Mutex<Option<Organization>>,
    }

    #[async_trait]
    impl OrganizationRepositoryTrait for MemoryOrganizations {
        fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>> {
            Ok(self
                .organization
                .lock()
                .unwrap()
                .clone()
                .filter(|o| o.id == organization_id))
        }

        async fn upsert_organization(&self, organization: NewOrganization) -> Result<Organization> {
            let now = Utc::now();
            let saved = Organization {
                id: organization.id,
                name: organization.name,
                onboarding_completed_at: None,
                created_at: now,
                updated_at: now,
            };
            *self.organization.lock().unwrap() = Some(saved.clone());
            Ok(saved)
        }

        async fn mark_onboarding_complete(
            &self,
            organization_id: &str,
            completed_at: DateTime<Utc>,
        ) -> Result<Organization> {
            let mut slot = self.organization.lock().unwrap();
            let org = slot.get_or_insert_with(|| Organization {
                id: organization_id.to_string(),
                name: organization_id.to_string(),
                onboarding_completed_at: None,
                created_at: completed_at,
                updated_at: completed_at,
            });
            org.onboarding_completed_at.get_or_insert(completed_at);
            Ok(org.clone())
        }

        async fn add_cost(&self, cost: NewOrganizationCost) -> Result<OrganizationCost> {
            Ok(OrganizationCost {
                id: "cost-1".to_string(),
                organization_id: cost.organization_id,
                label: cost.label,
                amount: cost.amount,
                currency: cost.currency,
                effective_from: cost.effective_from,
                created_at: Utc::now(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingEvents {
        emitted: Mutex<Vec<EmitRequest>>,
    }

    #[async_trait]
    impl EventServiceTrait for RecordingEvents {
        async fn emit(&self, request: EmitRequest) -> Result<EmitResult> {
            let priority = request.event.priority();
            self.emitted.lock().unwrap().push(request);
            Ok(EmitResult {
                event_id: "evt".to_string(),
                priority,
                action: None,
                processed: true,
            })
        }

        async fn emit_batch(&self, requests: Vec<EmitRequest>) -> Result<Vec<EmitResult>> {
            let mut results = Vec::new();
            for request in requests {
                results.push(self.emit(request).await?);
            }
            Ok(results)
        }

        fn get_recent_events(
            &self,
            _: &str,
            _: Option<i64>,
            _: Option<String>,
        ) -> Result<Vec<EventRecord>> {
            Ok(Vec::new())
        }
    }

    fn service() -> (OrganizationService, Arc<RecordingEvents>) {
        let events = Arc::new(RecordingEvents::default());
        let service = OrganizationService::new(
            Arc::new(MemoryOrganizations::default()),
            events.clone(),
        );
        (service, events)
    }

    #[tokio::test]
    async fn test_onboarding_emits_every_time_but_keeps_first_stamp() {
        let (service, events) = service();

        let first = service
            .complete_onboarding("org-1", Some("user-9".to_string()))
            .await
            .unwrap();
        let second = service.complete_onboarding("org-1", None).await.unwrap();

        assert!(first.is_onboarding_complete());
        assert_eq!(first.onboarding_completed_at, second.onboarding_completed_at);

        let emitted = events.emitted.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].event.event_type(), "onboarding_completed");
        assert_eq!(emitted[0].actor_user_id.as_deref(), Some("user-9"));
        assert_eq!(emitted[0].event.priority(), Priority::High);
    }

    #[tokio::test]
    async fn test_blank_ids_are_rejected() {
        let (service, events) = service();
        assert!(service.complete_onboarding("  ", None).await.is_err());
        assert!(service
            .upsert_organization(NewOrganization {
                id: "org-1".to_string(),
                name: String::new(),
            })
            .await
            .is_err());
        assert!(events.emitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cost_currency_must_be_three_letters() {
        let (service, _) = service();
        let cost = |currency: &str| NewOrganizationCost {
            organization_id: "org-1".to_string(),
            label: "Shipping".to_string(),
            amount: dec!(12.50),
            currency: currency.to_string(),
            effective_from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };

        assert!(service.add_cost(cost("euro")).await.is_err());
        let saved = service.add_cost(cost("EUR")).await.unwrap();
        assert_eq!(saved.amount, dec!(12.50));
    }
}
