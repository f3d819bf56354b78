//! Where the application keeps its files. The layout is fixed; only the base
//! directory can be moved with `TRIP_PLANNER_HOME`.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::AppError;

/// Environment variable that relocates the data directory.
pub const HOME_ENV_VAR: &str = "TRIP_PLANNER_HOME";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".trip-planner";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "trip_database.sqlite";
/// Log file written by the tracing subscriber.
const LOG_FILE_NAME: &str = "trip-planner.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl AppConfig {
    /// Resolve the data directory from the environment, falling back to
    /// `~/.trip-planner`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::resolve(env::var_os(HOME_ENV_VAR))
    }

    /// An empty override counts as unset.
    fn resolve(home_override: Option<OsString>) -> Result<Self, AppError> {
        let data_dir = match home_override {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        Ok(Self::in_dir(data_dir))
    }

    /// Build the standard file layout under an explicit directory.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }
}

fn default_data_dir() -> Result<PathBuf, AppError> {
    let base_dirs = BaseDirs::new().ok_or(AppError::NoHomeDirectory)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_lives_inside_data_dir() {
        let config = AppConfig::in_dir("/tmp/trips");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/trips"));
        assert_eq!(
            config.db_path,
            PathBuf::from("/tmp/trips/trip_database.sqlite")
        );
        assert_eq!(config.log_path, PathBuf::from("/tmp/trips/trip-planner.log"));
    }

    #[test]
    fn override_moves_data_dir() {
        let config = AppConfig::resolve(Some(OsString::from("/srv/trips"))).unwrap();
        assert_eq!(config, AppConfig::in_dir("/srv/trips"));
    }

    #[test]
    fn empty_override_falls_back_to_home() {
        let from_empty = AppConfig::resolve(Some(OsString::new())).unwrap();
        let from_unset = AppConfig::resolve(None).unwrap();
        assert_eq!(from_empty, from_unset);
        assert!(from_unset.data_dir.ends_with(".trip-planner"));
        assert!(from_unset.db_path.ends_with(".trip-planner/trip_database.sqlite"));
    }

    #[test]
    fn from_env_reads_home_variable() {
        let dir = tempfile::TempDir::new().unwrap();
        env::set_var(HOME_ENV_VAR, dir.path());
        let config = AppConfig::from_env();
        env::remove_var(HOME_ENV_VAR);

        assert_eq!(config.unwrap(), AppConfig::in_dir(dir.path()));
    }
}
