//! Persistence module split across logical submodules.

mod connection;
mod trips;

pub use connection::{ensure_schema, open_database, open_in_memory, SCHEMA_VERSION};
pub use trips::{delete_trip, fetch_trip, fetch_trips, upsert_trip};
