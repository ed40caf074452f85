pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
mod main_lib;
pub mod scheduler;

pub use main_lib::{build_state, init_tracing, AppState};
