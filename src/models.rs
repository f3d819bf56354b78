//! Domain model mirroring the `trips` table. `Trip` stays a plain data holder
//! so the persistence layer and the screens can pass it around by value.

use std::fmt;

/// Id carried by a trip that has never been stored. The store assigns a real
/// id on first insert.
pub const UNSAVED_TRIP_ID: i64 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One recorded trip. Every text field is free-form: dates are not parsed and
/// empty values are allowed.
pub struct Trip {
    /// Primary key from the database, or [`UNSAVED_TRIP_ID`] for a draft.
    pub id: i64,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl Trip {
    /// Build an unsaved draft. Saving it lets the store pick the id.
    pub fn new(
        destination: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: UNSAVED_TRIP_ID,
            destination: destination.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            description: description.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Whether the trip already has a store-assigned id.
    pub fn is_saved(&self) -> bool {
        self.id != UNSAVED_TRIP_ID
    }

    /// Compose a readable date range. Either end may be blank, in which case
    /// the wording adapts instead of printing a dangling separator.
    pub fn date_range(&self) -> String {
        let start = self.start_date.trim();
        let end = self.end_date.trim();
        match (start.is_empty(), end.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("from {start}"),
            (true, false) => format!("until {end}"),
            (false, false) => format!("{start} to {end}"),
        }
    }
}

impl fmt::Display for Trip {
    /// Write the destination, or a placeholder for trips saved without one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destination = self.destination.trim();
        if destination.is_empty() {
            write!(f, "(no destination)")
        } else {
            write!(f, "{destination}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trip_is_unsaved() {
        let trip = Trip::new("Lisbon", "", "", "");
        assert_eq!(trip.id, UNSAVED_TRIP_ID);
        assert!(!trip.is_saved());
        assert!(trip.with_id(4).is_saved());
    }

    #[test]
    fn date_range_tolerates_blank_ends() {
        let mut trip = Trip::new("Lisbon", "2024-05-01", "2024-05-09", "");
        assert_eq!(trip.date_range(), "2024-05-01 to 2024-05-09");
        trip.end_date.clear();
        assert_eq!(trip.date_range(), "from 2024-05-01");
        trip.start_date.clear();
        assert_eq!(trip.date_range(), "");
        trip.end_date = "June".into();
        assert_eq!(trip.date_range(), "until June");
    }

    #[test]
    fn display_falls_back_for_blank_destination() {
        assert_eq!(Trip::new("  ", "", "", "").to_string(), "(no destination)");
        assert_eq!(Trip::new("Oslo", "", "", "").to_string(), "Oslo");
    }
}
