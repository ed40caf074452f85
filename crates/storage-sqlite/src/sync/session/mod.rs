mod model;
mod repository;

pub use model::SyncSessionDB;
pub use repository::SyncSessionRepository;
