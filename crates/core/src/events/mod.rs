//! Event store and router.
//!
//! Every emitted [`DomainEvent`] is persisted as an [`EventRecord`] first and
//! then routed to at most one downstream [`EventAction`]. Dispatch failures
//! never fail the caller.

mod dispatcher;
mod domain_event;
mod events_model;
mod events_router;
mod events_service;
mod events_traits;
mod retention;

pub use dispatcher::JobEventDispatcher;
pub use domain_event::*;
pub use events_model::*;
pub use events_router::{route, EventAction};
pub use events_service::EventService;
pub use events_traits::*;
pub use retention::{EventRetentionService, RetentionPolicy, SweepReport};
