//! SQLite storage implementation for event records.

mod model;
mod repository;

pub use model::EventRecordDB;
pub use repository::EventRepository;
