//! Ratatui front-end. `App` holds the navigator, the screen bound to the
//! current route, and any modal overlay; `run_app` drives it from crossterm
//! events.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
