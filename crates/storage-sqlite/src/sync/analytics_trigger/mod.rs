mod model;
mod repository;

pub use model::AnalyticsTriggerDB;
pub use repository::AnalyticsTriggerRepository;
