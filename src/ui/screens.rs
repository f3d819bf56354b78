use crate::models::Trip;
use crate::viewmodel::{Pending, TripViewModel};

use super::forms::TripForm;
use super::helpers::surface_error;

/// Data a screen asked the view-model for, tracked until it arrives.
pub(crate) enum Loadable<T> {
    Loading(Pending<T>),
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    /// Move from `Loading` to `Ready`/`Failed` if the worker has answered.
    /// Returns `true` when the state changed.
    pub(crate) fn poll(&mut self) -> bool {
        let Loadable::Loading(pending) = self else {
            return false;
        };
        let Some(result) = pending.try_take() else {
            return false;
        };
        *self = match result {
            Ok(value) => Loadable::Ready(value),
            Err(err) => Loadable::Failed(surface_error(&err)),
        };
        true
    }

    pub(crate) fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading(_))
    }
}

/// The trip list with its cursor.
pub(crate) struct TripListScreen {
    pub(crate) trips: Loadable<Vec<Trip>>,
    pub(crate) selected: usize,
}

impl TripListScreen {
    pub(crate) fn load(view_model: &TripViewModel) -> Self {
        Self {
            trips: Loadable::Loading(view_model.get_all_trips()),
            selected: 0,
        }
    }

    /// Issue a fresh read, keeping the cursor where it was.
    pub(crate) fn reload(&mut self, view_model: &TripViewModel) {
        self.trips = Loadable::Loading(view_model.get_all_trips());
    }

    pub(crate) fn poll(&mut self) -> bool {
        let changed = self.trips.poll();
        if changed {
            self.ensure_in_bounds();
        }
        changed
    }

    pub(crate) fn current_trip(&self) -> Option<&Trip> {
        self.trips.ready()?.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        let len = self.trips.ready().map_or(0, Vec::len);
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    fn ensure_in_bounds(&mut self) {
        let len = self.trips.ready().map_or(0, Vec::len);
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Read-only view of a single trip. `trip` is `None` when the route carried no
/// usable id; such a screen renders nothing.
pub(crate) struct TripDetailScreen {
    pub(crate) trip: Option<Loadable<Option<Trip>>>,
}

impl TripDetailScreen {
    pub(crate) fn load(view_model: &TripViewModel, trip_id: Option<i64>) -> Self {
        Self {
            trip: trip_id.map(|id| Loadable::Loading(view_model.get_trip_by_id(id))),
        }
    }

    pub(crate) fn poll(&mut self) -> bool {
        self.trip.as_mut().is_some_and(Loadable::poll)
    }

    /// The trip, once loaded and found.
    pub(crate) fn loaded_trip(&self) -> Option<&Trip> {
        self.trip.as_ref()?.ready()?.as_ref()
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.trip.as_ref().is_some_and(Loadable::is_loading)
    }
}

/// Which record the add/edit form writes to.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormTarget {
    Create,
    Edit(i64),
    /// Edit route whose id did not parse: nothing to edit, nothing to save.
    Missing,
}

impl FormTarget {
    /// Id submitted on save; creation uses the unsaved id.
    pub(crate) fn save_id(self) -> Option<i64> {
        match self {
            FormTarget::Create => Some(crate::models::UNSAVED_TRIP_ID),
            FormTarget::Edit(id) => Some(id),
            FormTarget::Missing => None,
        }
    }
}

/// Add/edit screen. In edit mode the fields are filled once, when the lookup
/// for the original trip returns.
pub(crate) struct TripFormScreen {
    pub(crate) target: FormTarget,
    pub(crate) form: TripForm,
    pub(crate) source: Option<Loadable<Option<Trip>>>,
    pub(crate) saving: Option<Pending<Trip>>,
}

impl TripFormScreen {
    pub(crate) fn create() -> Self {
        Self {
            target: FormTarget::Create,
            form: TripForm::default(),
            source: None,
            saving: None,
        }
    }

    pub(crate) fn edit(view_model: &TripViewModel, trip_id: Option<i64>) -> Self {
        match trip_id {
            Some(id) => Self {
                target: FormTarget::Edit(id),
                form: TripForm::default(),
                source: Some(Loadable::Loading(view_model.get_trip_by_id(id))),
                saving: None,
            },
            None => Self {
                target: FormTarget::Missing,
                form: TripForm::default(),
                source: None,
                saving: None,
            },
        }
    }

    /// Poll the source lookup and copy the trip into the form when it lands.
    pub(crate) fn poll_source(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        if !source.poll() {
            return false;
        }
        match source {
            Loadable::Ready(Some(trip)) => self.form = TripForm::from_trip(trip),
            Loadable::Failed(message) => self.form.error = Some(message.clone()),
            _ => {}
        }
        true
    }

    /// Input is accepted once the original trip (if any) has been looked up
    /// successfully and no save is in flight. A failed lookup locks the form so
    /// saving cannot overwrite the stored row with blank fields.
    pub(crate) fn accepts_input(&self) -> bool {
        self.target != FormTarget::Missing
            && self.saving.is_none()
            && !self.source.as_ref().is_some_and(Loadable::is_loading)
            && !self.source_failed()
    }

    /// The lookup for the trip being edited returned an error.
    pub(crate) fn source_failed(&self) -> bool {
        matches!(self.source, Some(Loadable::Failed(_)))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.saving.is_some() || self.source.as_ref().is_some_and(Loadable::is_loading)
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.target {
            FormTarget::Create => "Add Trip",
            FormTarget::Edit(_) | FormTarget::Missing => "Edit Trip",
        }
    }
}
