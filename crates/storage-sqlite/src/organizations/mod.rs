//! SQLite storage implementation for organizations and their costs.

mod model;
mod repository;

pub use model::{OrganizationCostDB, OrganizationDB};
pub use repository::OrganizationRepository;
