use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Trip;

/// Internal representation of the add/edit form fields.
#[derive(Default, Clone)]
pub(crate) struct TripForm {
    pub(crate) destination: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) description: String,
    pub(crate) active: TripField,
    pub(crate) error: Option<String>,
}

/// Fields available within the trip form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum TripField {
    #[default]
    Destination,
    StartDate,
    EndDate,
    Description,
}

impl TripField {
    pub(crate) const ALL: [TripField; 4] = [
        TripField::Destination,
        TripField::StartDate,
        TripField::EndDate,
        TripField::Description,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            TripField::Destination => "Destination",
            TripField::StartDate => "Start date",
            TripField::EndDate => "End date",
            TripField::Description => "Description",
        }
    }

    fn next(self) -> Self {
        match self {
            TripField::Destination => TripField::StartDate,
            TripField::StartDate => TripField::EndDate,
            TripField::EndDate => TripField::Description,
            TripField::Description => TripField::Destination,
        }
    }

    fn previous(self) -> Self {
        match self {
            TripField::Destination => TripField::Description,
            TripField::StartDate => TripField::Destination,
            TripField::EndDate => TripField::StartDate,
            TripField::Description => TripField::EndDate,
        }
    }
}

impl TripForm {
    /// Populate the form from an existing trip when editing.
    pub(crate) fn from_trip(trip: &Trip) -> Self {
        Self {
            destination: trip.destination.clone(),
            start_date: trip.start_date.clone(),
            end_date: trip.end_date.clone(),
            description: trip.description.clone(),
            active: TripField::Destination,
            error: None,
        }
    }

    pub(crate) fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn focus_previous(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field. Control characters are refused;
    /// everything else is free-form.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Build the record to persist. Values are kept exactly as typed.
    pub(crate) fn to_trip(&self, id: i64) -> Trip {
        Trip {
            id,
            destination: self.destination.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            description: self.description.clone(),
        }
    }

    pub(crate) fn value(&self, field: TripField) -> &str {
        match field {
            TripField::Destination => &self.destination,
            TripField::StartDate => &self.start_date,
            TripField::EndDate => &self.end_date,
            TripField::Description => &self.description,
        }
    }

    fn value_mut(&mut self, field: TripField) -> &mut String {
        match field {
            TripField::Destination => &mut self.destination,
            TripField::StartDate => &mut self.start_date,
            TripField::EndDate => &mut self.end_date,
            TripField::Description => &mut self.description,
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: TripField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Column offset of the cursor inside the active field's line.
    pub(crate) fn cursor_offset(&self) -> usize {
        let label_len = self.active.label().chars().count() + 2;
        let value_len = self.value(self.active).chars().count();
        label_len + value_len
    }
}

/// Pending confirmation before a trip is deleted from the list.
#[derive(Clone)]
pub(crate) struct ConfirmTripDelete {
    pub(crate) trip: Trip,
}

/// Text typed into the `g` route prompt.
#[derive(Default, Clone)]
pub(crate) struct RoutePrompt {
    pub(crate) input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_goes_to_active_field() {
        let mut form = TripForm::default();
        for ch in "Rome".chars() {
            assert!(form.push_char(ch));
        }
        form.focus_next();
        form.push_char('1');
        form.focus_previous();
        form.backspace();

        assert_eq!(form.destination, "Rom");
        assert_eq!(form.start_date, "1");
    }

    #[test]
    fn control_characters_are_refused() {
        let mut form = TripForm::default();
        assert!(!form.push_char('\n'));
        assert!(form.destination.is_empty());
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = TripForm::default();
        form.focus_previous();
        assert_eq!(form.active, TripField::Description);
        form.focus_next();
        assert_eq!(form.active, TripField::Destination);
        for _ in TripField::ALL {
            form.focus_next();
        }
        assert_eq!(form.active, TripField::Destination);
    }

    #[test]
    fn round_trips_through_trip() {
        let trip = Trip::new("Tokyo", "2024-01-01", "2024-01-10", " vacation ").with_id(3);
        let form = TripForm::from_trip(&trip);
        assert_eq!(form.to_trip(3), trip);
        assert_eq!(form.to_trip(0).id, 0);
    }

    #[test]
    fn cursor_sits_after_value() {
        let mut form = TripForm::default();
        form.push_char('a');
        assert_eq!(form.cursor_offset(), "Destination: a".len());
    }
}
