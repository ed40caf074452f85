mod model;
mod repository;

pub use model::{NewSyncRequestDB, SyncRequestDB};
pub use repository::SyncRequestRepository;
