//! String routes and the back stack that drives which screen is shown.

use std::fmt;

pub const TRIP_LIST: &str = "tripList";
pub const TRIP_DETAIL: &str = "tripDetail";
pub const ADD_TRIP: &str = "addTrip";
pub const EDIT_TRIP: &str = "editTrip";

/// Placeholder printed for a parameterized route whose id could not be parsed.
const TRIP_ID_PLACEHOLDER: &str = "{tripId}";

/// Navigation destinations. The detail and edit routes carry the `tripId`
/// path segment; `None` means the segment was not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    TripList,
    TripDetail(Option<i64>),
    AddTrip,
    EditTrip(Option<i64>),
}

impl Route {
    /// Where the application starts.
    pub const START: Route = Route::TripList;

    /// Parse a route path such as `tripDetail/7`. Unknown route names yield
    /// `None`; a malformed id yields the route with an absent id.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim().trim_matches('/');
        let (name, segment) = match path.split_once('/') {
            Some((name, segment)) => (name, Some(segment)),
            None => (path, None),
        };

        match (name, segment) {
            (TRIP_LIST, None) => Some(Route::TripList),
            (ADD_TRIP, None) => Some(Route::AddTrip),
            (TRIP_DETAIL, Some(segment)) => Some(Route::TripDetail(parse_trip_id(segment))),
            (EDIT_TRIP, Some(segment)) => Some(Route::EditTrip(parse_trip_id(segment))),
            _ => None,
        }
    }

    /// The `tripId` argument, when the route has one and it parsed.
    pub fn trip_id(&self) -> Option<i64> {
        match self {
            Route::TripDetail(id) | Route::EditTrip(id) => *id,
            Route::TripList | Route::AddTrip => None,
        }
    }
}

fn parse_trip_id(segment: &str) -> Option<i64> {
    segment.trim().parse().ok()
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::TripList => f.write_str(TRIP_LIST),
            Route::AddTrip => f.write_str(ADD_TRIP),
            Route::TripDetail(id) => write_with_id(f, TRIP_DETAIL, *id),
            Route::EditTrip(id) => write_with_id(f, EDIT_TRIP, *id),
        }
    }
}

fn write_with_id(f: &mut fmt::Formatter<'_>, name: &str, id: Option<i64>) -> fmt::Result {
    match id {
        Some(id) => write!(f, "{name}/{id}"),
        None => write!(f, "{name}/{TRIP_ID_PLACEHOLDER}"),
    }
}

/// Back stack of visited routes. The start destination is never popped.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            stack: vec![Route::START],
        }
    }

    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(Route::START)
    }

    pub fn navigate(&mut self, route: Route) {
        self.stack.push(route);
    }

    /// Parse `path` and push it. Returns the route, or `None` (leaving the
    /// stack untouched) when the path names no known route.
    pub fn navigate_path(&mut self, path: &str) -> Option<Route> {
        let route = Route::parse(path)?;
        self.navigate(route);
        Some(route)
    }

    /// Pop the current route. Returns `false` when already at the start.
    pub fn pop_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
