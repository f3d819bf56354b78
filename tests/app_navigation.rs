use std::thread;
use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use tempfile::TempDir;

use trip_planner::{open_database, open_in_memory, App, Route, Trip, TripViewModel};

fn app_with(trips: &[Trip]) -> App {
    let vm = TripViewModel::spawn(open_in_memory().expect("db")).expect("spawn");
    for trip in trips {
        vm.save_trip(trip.clone()).wait().expect("seed");
    }
    let mut app = App::new(vm);
    settle(&mut app);
    app
}

/// Tick until every outstanding persistence request has been collected.
fn settle(app: &mut App) {
    for _ in 0..1000 {
        app.tick().expect("tick");
        if app.is_idle() {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("app never settled");
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
    terminal.draw(|frame| app.draw(frame)).expect("draw");
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

fn press(app: &mut App, codes: impl IntoIterator<Item = KeyCode>) {
    for code in codes {
        assert!(!app.handle_key(code).expect("key"));
    }
}

fn type_text(app: &mut App, text: &str) {
    press(app, text.chars().map(KeyCode::Char));
}

#[test]
fn non_numeric_detail_route_renders_no_data() {
    let mut app = app_with(&[Trip::new("Tokyo", "", "", "vacation")]);

    assert!(app.open_route("tripDetail/abc"));
    settle(&mut app);

    assert_eq!(app.route(), Route::TripDetail(None));
    let screen = render(&app);
    assert!(!screen.contains("Destination:"));
    assert!(!screen.contains("Tokyo"));
}

#[test]
fn unknown_route_is_reported_not_followed() {
    let mut app = app_with(&[]);
    press(&mut app, [KeyCode::Char('g')]);
    type_text(&mut app, "settings");
    press(&mut app, [KeyCode::Enter]);

    assert_eq!(app.route(), Route::TripList);
    assert!(render(&app).contains("Unknown route 'settings'."));
}

#[test]
fn add_flow_saves_and_returns_to_list() {
    let mut app = app_with(&[]);
    assert!(render(&app).contains("No trips yet."));

    press(&mut app, [KeyCode::Char('+')]);
    assert_eq!(app.route(), Route::AddTrip);

    type_text(&mut app, "Tokyo");
    press(&mut app, [KeyCode::Tab]);
    type_text(&mut app, "2024-01-01");
    press(&mut app, [KeyCode::Tab]);
    type_text(&mut app, "2024-01-10");
    press(&mut app, [KeyCode::Tab]);
    type_text(&mut app, "vacation");
    press(&mut app, [KeyCode::Enter]);
    settle(&mut app);

    assert_eq!(app.route(), Route::TripList);
    let screen = render(&app);
    assert!(screen.contains("Tokyo"));
    assert!(screen.contains("vacation"));
    assert!(screen.contains("Saved trip to Tokyo."));
}

#[test]
fn detail_then_edit_replaces_destination() {
    let mut app = app_with(&[Trip::new("Paris", "", "", "")]);

    press(&mut app, [KeyCode::Enter]);
    settle(&mut app);
    assert!(matches!(app.route(), Route::TripDetail(Some(_))));
    assert!(render(&app).contains("Destination: Paris"));

    press(&mut app, [KeyCode::Char('e')]);
    settle(&mut app);
    assert!(matches!(app.route(), Route::EditTrip(Some(_))));

    press(&mut app, [KeyCode::Backspace; 5]);
    type_text(&mut app, "Rome");
    press(&mut app, [KeyCode::Enter]);
    settle(&mut app);

    assert!(matches!(app.route(), Route::TripDetail(Some(_))));
    assert!(render(&app).contains("Destination: Rome"));
}

#[test]
fn delete_requires_confirmation() {
    let mut app = app_with(&[Trip::new("Oslo", "", "", "")]);

    press(&mut app, [KeyCode::Char('-'), KeyCode::Char('n')]);
    settle(&mut app);
    assert!(render(&app).contains("Oslo"));

    press(&mut app, [KeyCode::Char('-'), KeyCode::Char('y')]);
    settle(&mut app);
    let screen = render(&app);
    assert!(screen.contains("No trips yet."));
    assert!(screen.contains("Deleted trip to Oslo."));
}

#[test]
fn second_delete_waits_for_the_first() {
    let mut app = app_with(&[Trip::new("A", "", "", ""), Trip::new("B", "", "", "")]);

    press(&mut app, [KeyCode::Char('-'), KeyCode::Char('y')]);
    press(&mut app, [KeyCode::Down, KeyCode::Char('-')]);
    assert!(render(&app).contains("A delete is already in progress."));

    settle(&mut app);
    let screen = render(&app);
    assert!(screen.contains("Deleted trip to A."));
    assert!(!screen.contains("Delete Trip"));
    assert!(!screen.contains("No trips yet."));
}

#[test]
fn unreadable_trip_cannot_be_overwritten_from_edit() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("trips.sqlite");
    {
        let conn = open_database(&db_path).expect("open");
        conn.execute(
            "INSERT INTO trips (id, destination, startDate, endDate, description)
             VALUES (5, CAST(x'FF' AS TEXT), '', '', 'keep me')",
            [],
        )
        .expect("seed");
    }
    let vm = TripViewModel::spawn(open_database(&db_path).expect("reopen")).expect("spawn");
    let mut app = App::new(vm);
    settle(&mut app);

    assert!(app.open_route("editTrip/5"));
    settle(&mut app);
    type_text(&mut app, "Rome");
    press(&mut app, [KeyCode::Enter]);
    settle(&mut app);

    assert_eq!(app.route(), Route::EditTrip(Some(5)));
    assert!(render(&app).contains("Could not load trip"));

    let conn = open_database(&db_path).expect("inspect");
    let description: String = conn
        .query_row("SELECT description FROM trips WHERE id = 5", [], |row| row.get(0))
        .expect("row survives");
    assert_eq!(description, "keep me");
}

#[test]
fn very_long_input_renders_without_overflow() {
    let long = "x".repeat(70_000);

    let mut app = app_with(&[]);
    press(&mut app, [KeyCode::Char('+')]);
    type_text(&mut app, &long);
    assert!(render(&app).contains("Destination: xxx"));

    press(&mut app, [KeyCode::Esc, KeyCode::Char('g')]);
    type_text(&mut app, &long);
    assert!(render(&app).contains("Route: xxx"));
}

#[test]
fn escape_on_list_quits() {
    let mut app = app_with(&[]);
    assert!(app.handle_key(KeyCode::Esc).expect("key"));
}
