//! Core library surface for the Trip Planner TUI application.
//!
//! The binary only wires these pieces together; tests and other tooling can
//! reuse the same persistence, view-model, and routing layers directly.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod ui;
pub mod viewmodel;

/// Persistence entry points used at startup.
pub use db::{open_database, open_in_memory};

pub use config::AppConfig;
pub use error::AppError;
pub use models::Trip;
pub use routes::{Navigator, Route};
pub use viewmodel::{Pending, TripViewModel};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
