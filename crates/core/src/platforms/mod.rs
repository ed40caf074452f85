//! Platform integrations and the connected-platform inventory.

mod platforms_model;
mod platforms_service;
mod platforms_traits;

pub use platforms_model::*;
pub use platforms_service::{PlatformConnectionInventory, PlatformConnectionService};
pub use platforms_traits::*;
