use std::sync::Arc;

use log::info;

use super::platforms_model::{NewPlatformConnection, Platform, PlatformConnection};
use super::platforms_traits::{ConnectedPlatformsTrait, PlatformConnectionRepositoryTrait};
use crate::errors::{require_non_empty, Result};
use crate::events::{DomainEvent, EmitRequest, EventServiceTrait};

/// Builds the connected set by asking the repository about each known platform.
pub struct PlatformConnectionInventory {
    repository: Arc<dyn PlatformConnectionRepositoryTrait>,
}

impl PlatformConnectionInventory {
    pub fn new(repository: Arc<dyn PlatformConnectionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl ConnectedPlatformsTrait for PlatformConnectionInventory {
    fn list_connected_platforms(&self, organization_id: &str) -> Result<Vec<Platform>> {
        let mut connected = Vec::new();
        for platform in Platform::ALL {
            if self
                .repository
                .has_active_connection(organization_id, platform)?
            {
                connected.push(platform);
            }
        }
        Ok(connected)
    }
}

/// Connection writes that also announce the change as a domain event.
pub struct PlatformConnectionService {
    repository: Arc<dyn PlatformConnectionRepositoryTrait>,
    event_service: Arc<dyn EventServiceTrait>,
}

impl PlatformConnectionService {
    pub fn new(
        repository: Arc<dyn PlatformConnectionRepositoryTrait>,
        event_service: Arc<dyn EventServiceTrait>,
    ) -> Self {
        Self {
            repository,
            event_service,
        }
    }

    pub fn list_connections(&self, organization_id: &str) -> Result<Vec<PlatformConnection>> {
        require_non_empty("organizationId", organization_id)?;
        self.repository.list_connections(organization_id)
    }

    pub async fn connect(
        &self,
        connection: NewPlatformConnection,
        actor_user_id: Option<String>,
    ) -> Result<PlatformConnection> {
        require_non_empty("organizationId", &connection.organization_id)?;
        require_non_empty("accountId", &connection.account_id)?;

        let saved = self.repository.connect(connection).await?;
        info!(
            "Connected {} account {} for organization {}",
            saved.platform, saved.account_id, saved.organization_id
        );

        let mut request = EmitRequest::new(
            DomainEvent::PlatformConnected {
                platform: saved.platform,
                account_id: Some(saved.account_id.clone()),
            },
            saved.organization_id.clone(),
        );
        request.actor_user_id = actor_user_id;
        self.event_service.emit(request).await?;
        Ok(saved)
    }

    /// Deactivates the connection and emits `platform_disconnected`.
    ///
    /// Returns false, and emits nothing, when the platform was not connected.
    pub async fn disconnect(
        &self,
        organization_id: &str,
        platform: Platform,
        reason: Option<String>,
        actor_user_id: Option<String>,
    ) -> Result<bool> {
        require_non_empty("organizationId", organization_id)?;
        if !self.repository.disconnect(organization_id, platform).await? {
            return Ok(false);
        }
        info!("Disconnected {} for organization {}", platform, organization_id);

        let mut request = EmitRequest::new(
            DomainEvent::platform_disconnected(platform, reason),
            organization_id,
        );
        request.actor_user_id = actor_user_id;
        self.event_service.emit(request).await?;
        Ok(true)
    }
}
