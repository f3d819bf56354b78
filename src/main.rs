//! Binary entry point: resolve the data directory, start logging, open the
//! trip database, and drive the Ratatui event loop until the user exits.
use trip_planner::logging::init_logging;
use trip_planner::{open_database, run_app, App, AppConfig, TripViewModel};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_path)?;

    let conn = open_database(&config.db_path)?;
    let view_model = TripViewModel::spawn(conn)?;

    let mut app = App::new(view_model);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!("application exited with error: {err:#}");
    }
    result
}
