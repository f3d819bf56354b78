use thiserror::Error;

/// Failure kinds owned by this crate. Everything else (SQLite, I/O, terminal)
/// travels as `anyhow::Error` with context attached at the call site.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not locate home directory")]
    NoHomeDirectory,
    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },
    #[error("persistence worker is no longer running")]
    WorkerStopped,
}
