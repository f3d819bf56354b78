//! Mediator between the screens and the persistence gateway. The SQLite
//! connection lives on a dedicated worker thread so the draw loop never waits
//! on disk I/O; every request returns a [`Pending`] handle that resolves once.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::db::{delete_trip, fetch_trip, fetch_trips, upsert_trip};
use crate::error::AppError;
use crate::models::Trip;

/// Requests served by the worker, each carrying its own reply channel.
enum Command {
    ListAll {
        resp: Sender<Result<Vec<Trip>>>,
    },
    Get {
        id: i64,
        resp: Sender<Result<Option<Trip>>>,
    },
    Save {
        trip: Trip,
        resp: Sender<Result<Trip>>,
    },
    Delete {
        trip: Trip,
        resp: Sender<Result<bool>>,
    },
    Shutdown,
}

/// Single-shot result of a view-model request.
///
/// Poll it with [`Pending::try_take`] from the UI loop, or block on it with
/// [`Pending::wait`]. Once `try_take` has returned `Some`, the handle is spent
/// and should be dropped.
pub struct Pending<T> {
    rx: Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Return the result if the worker has answered, without blocking.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AppError::WorkerStopped.into())),
        }
    }

    /// Block until the worker answers.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| AppError::WorkerStopped)?
    }
}

/// Owns the persistence worker. Dropping it stops and joins the thread.
pub struct TripViewModel {
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl TripViewModel {
    /// Move `conn` onto a fresh worker thread and start serving requests.
    pub fn spawn(conn: Connection) -> Result<Self> {
        let (commands, inbox) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("trip-store".to_string())
            .spawn(move || run_worker(conn, inbox))
            .context("failed to spawn persistence worker")?;

        Ok(Self {
            commands,
            worker: Some(worker),
        })
    }

    /// Read every trip once. Not a live subscription: call again to refresh.
    pub fn get_all_trips(&self) -> Pending<Vec<Trip>> {
        self.request(|resp| Command::ListAll { resp })
    }

    pub fn get_trip_by_id(&self, id: i64) -> Pending<Option<Trip>> {
        self.request(|resp| Command::Get { id, resp })
    }

    /// Insert or replace `trip`; resolves to the stored trip with its id.
    pub fn save_trip(&self, trip: Trip) -> Pending<Trip> {
        self.request(|resp| Command::Save { trip, resp })
    }

    /// Delete `trip`; resolves to whether a row was actually removed.
    pub fn delete_trip(&self, trip: Trip) -> Pending<bool> {
        self.request(|resp| Command::Delete { trip, resp })
    }

    fn request<T>(&self, build: impl FnOnce(Sender<Result<T>>) -> Command) -> Pending<T> {
        let (resp, rx) = mpsc::channel();
        if self.commands.send(build(resp)).is_err() {
            // The rejected command drops its reply sender, so the handle
            // resolves to `WorkerStopped`.
            warn!("persistence worker stopped; request rejected");
        }
        Pending { rx }
    }
}

impl Drop for TripViewModel {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("persistence worker panicked");
            }
        }
    }
}

/// Serve commands in arrival order until shutdown or until every sender is
/// gone. Replies to callers that stopped listening are discarded.
fn run_worker(conn: Connection, inbox: Receiver<Command>) {
    debug!("persistence worker started");

    while let Ok(command) = inbox.recv() {
        match command {
            Command::ListAll { resp } => {
                let result = fetch_trips(&conn);
                if let Err(err) = &result {
                    error!("failed to list trips: {err:#}");
                }
                let _ = resp.send(result);
            }
            Command::Get { id, resp } => {
                let result = fetch_trip(&conn, id);
                if let Err(err) = &result {
                    error!(id, "failed to load trip: {err:#}");
                }
                let _ = resp.send(result);
            }
            Command::Save { trip, resp } => {
                let result = upsert_trip(&conn, &trip);
                match &result {
                    Ok(saved) => info!(id = saved.id, "saved trip"),
                    Err(err) => error!(id = trip.id, "failed to save trip: {err:#}"),
                }
                let _ = resp.send(result);
            }
            Command::Delete { trip, resp } => {
                let result = delete_trip(&conn, &trip);
                match &result {
                    Ok(true) => info!(id = trip.id, "deleted trip"),
                    Ok(false) => debug!(id = trip.id, "trip already absent"),
                    Err(err) => error!(id = trip.id, "failed to delete trip: {err:#}"),
                }
                let _ = resp.send(result);
            }
            Command::Shutdown => break,
        }
    }

    debug!("persistence worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn view_model() -> TripViewModel {
        TripViewModel::spawn(open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn save_then_read_back() {
        let vm = view_model();
        let saved = vm
            .save_trip(Trip::new("Tokyo", "2024-01-01", "2024-01-10", "vacation"))
            .wait()
            .unwrap();

        assert_ne!(saved.id, 0);
        assert_eq!(vm.get_trip_by_id(saved.id).wait().unwrap(), Some(saved.clone()));
        assert_eq!(vm.get_all_trips().wait().unwrap(), vec![saved]);
    }

    #[test]
    fn requests_are_served_in_order() {
        let vm = view_model();
        let save = vm.save_trip(Trip::new("Quito", "", "", ""));
        let list = vm.get_all_trips();

        let saved = save.wait().unwrap();
        assert_eq!(list.wait().unwrap(), vec![saved]);
    }

    #[test]
    fn try_take_eventually_yields() {
        let vm = view_model();
        let mut pending = vm.get_all_trips();
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            thread::yield_now();
        };
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn delete_reports_whether_row_existed() {
        let vm = view_model();
        let saved = vm.save_trip(Trip::new("Lima", "", "", "")).wait().unwrap();

        assert!(vm.delete_trip(saved.clone()).wait().unwrap());
        assert!(!vm.delete_trip(saved.clone()).wait().unwrap());
        assert_eq!(vm.get_trip_by_id(saved.id).wait().unwrap(), None);
    }

    #[test]
    fn requests_after_shutdown_report_stopped_worker() {
        let mut vm = view_model();
        vm.commands.send(Command::Shutdown).unwrap();
        vm.worker.take().unwrap().join().unwrap();

        let err = vm.get_all_trips().wait().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::WorkerStopped)
        ));
    }
}
