//! Organization state consulted by the sync barrier.

mod organizations_model;
mod organizations_service;
mod organizations_traits;

pub use organizations_model::*;
pub use organizations_service::OrganizationService;
pub use organizations_traits::*;
