use async_trait::async_trait;

use super::platforms_model::{NewPlatformConnection, Platform, PlatformConnection};
use crate::errors::Result;

/// Trait for platform connection persistence
#[async_trait]
pub trait PlatformConnectionRepositoryTrait: Send + Sync {
    /// Per-platform existence check backing the connected-platform inventory.
    fn has_active_connection(&self, organization_id: &str, platform: Platform) -> Result<bool>;

    fn list_connections(&self, organization_id: &str) -> Result<Vec<PlatformConnection>>;

    /// Create or reactivate the connection for `(organization, platform)`.
    async fn connect(&self, connection: NewPlatformConnection) -> Result<PlatformConnection>;

    /// Returns false when there was no active connection.
    async fn disconnect(&self, organization_id: &str, platform: Platform) -> Result<bool>;
}

/// Which platforms are currently connected for an organization.
pub trait ConnectedPlatformsTrait: Send + Sync {
    fn list_connected_platforms(&self, organization_id: &str) -> Result<Vec<Platform>>;
}
