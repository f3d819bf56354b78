use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::Trip;

/// Map a `SELECT id, destination, startDate, endDate, description` row.
fn trip_from_row(row: &Row<'_>) -> rusqlite::Result<Trip> {
    Ok(Trip {
        id: row.get(0)?,
        destination: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Retrieve every stored trip in insertion order.
pub fn fetch_trips(conn: &Connection) -> Result<Vec<Trip>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, destination, startDate, endDate, description
             FROM trips
             ORDER BY id",
        )
        .context("failed to prepare trip query")?;

    let trips = stmt
        .query_map([], trip_from_row)
        .context("failed to load trips")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect trips")?;

    Ok(trips)
}

/// Point lookup. A miss is `Ok(None)`, not an error.
pub fn fetch_trip(conn: &Connection, id: i64) -> Result<Option<Trip>> {
    conn.query_row(
        "SELECT id, destination, startDate, endDate, description
         FROM trips
         WHERE id = ?1",
        params![id],
        trip_from_row,
    )
    .optional()
    .context("failed to load trip")
}

/// Insert an unsaved trip or replace the whole row sharing its id. Returns the
/// stored trip so callers learn the generated id.
pub fn upsert_trip(conn: &Connection, trip: &Trip) -> Result<Trip> {
    let id = if trip.is_saved() {
        conn.execute(
            "INSERT OR REPLACE INTO trips (id, destination, startDate, endDate, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                trip.id,
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.description
            ],
        )
        .context("failed to replace trip")?;
        trip.id
    } else {
        conn.execute(
            "INSERT INTO trips (destination, startDate, endDate, description)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.description
            ],
        )
        .context("failed to insert trip")?;
        conn.last_insert_rowid()
    };

    Ok(Trip {
        id,
        ..trip.clone()
    })
}

/// Remove the row matching the trip's id. Deleting a trip that is already gone
/// succeeds and reports `false`.
pub fn delete_trip(conn: &Connection, trip: &Trip) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM trips WHERE id = ?1", params![trip.id])
        .context("failed to delete trip")?;
    Ok(deleted > 0)
}
