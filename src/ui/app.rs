use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::models::Trip;
use crate::routes::{Navigator, Route};
use crate::viewmodel::{Pending, TripViewModel};

use super::forms::{ConfirmTripDelete, RoutePrompt, TripField};
use super::helpers::{centered_rect, cursor_column, surface_error, truncate_to_width};
use super::screens::{Loadable, TripDetailScreen, TripFormScreen, TripListScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// The screen bound to the current route.
enum Screen {
    List(TripListScreen),
    Detail(TripDetailScreen),
    Form(TripFormScreen),
}

/// Overlays that capture keys on top of the current screen.
enum Mode {
    Normal,
    ConfirmDelete(ConfirmTripDelete),
    GoTo(RoutePrompt),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    view_model: TripViewModel,
    navigator: Navigator,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    deleting: Option<(Trip, Pending<bool>)>,
}

impl App {
    pub fn new(view_model: TripViewModel) -> Self {
        let navigator = Navigator::new();
        let screen = build_screen(&view_model, navigator.current());
        Self {
            view_model,
            navigator,
            screen,
            mode: Mode::Normal,
            status: None,
            deleting: None,
        }
    }

    /// Route currently on top of the back stack.
    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    /// Navigate to a route given as a path such as `tripDetail/3`. Returns
    /// `false` when the path names no known route.
    pub fn open_route(&mut self, path: &str) -> bool {
        match self.navigator.navigate_path(path) {
            Some(route) => {
                debug!(%route, depth = self.navigator.depth(), "navigated");
                self.enter(route);
                true
            }
            None => false,
        }
    }

    /// No request is waiting on the persistence worker.
    pub fn is_idle(&self) -> bool {
        let screen_busy = match &self.screen {
            Screen::List(list) => list.trips.is_loading(),
            Screen::Detail(detail) => detail.is_loading(),
            Screen::Form(form) => form.is_busy(),
        };
        !screen_busy && self.deleting.is_none()
    }

    /// Collect finished persistence results. Called once per loop iteration;
    /// never blocks.
    pub fn tick(&mut self) -> Result<()> {
        match &mut self.screen {
            Screen::List(list) => {
                list.poll();
            }
            Screen::Detail(detail) => {
                detail.poll();
            }
            Screen::Form(form) => {
                form.poll_source();
            }
        }

        self.poll_save();
        self.poll_delete();
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::GoTo(prompt) => self.handle_route_prompt(code, prompt),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::List(ref mut list) => match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                KeyCode::Up => list.move_selection(-1),
                KeyCode::Down => list.move_selection(1),
                KeyCode::PageUp => list.move_selection(-5),
                KeyCode::PageDown => list.move_selection(5),
                KeyCode::Enter => match list.current_trip() {
                    Some(trip) => {
                        let id = trip.id;
                        self.clear_status();
                        self.navigate(Route::TripDetail(Some(id)));
                    }
                    None => self.set_status("No trip selected.", StatusKind::Error),
                },
                KeyCode::Char('+') | KeyCode::Char('a') => {
                    self.clear_status();
                    self.navigate(Route::AddTrip);
                }
                KeyCode::Char('e') | KeyCode::Char('E') => match list.current_trip() {
                    Some(trip) => {
                        let id = trip.id;
                        self.clear_status();
                        self.navigate(Route::EditTrip(Some(id)));
                    }
                    None => self.set_status("No trip selected to edit.", StatusKind::Error),
                },
                KeyCode::Char('-') | KeyCode::Char('d') if self.deleting.is_some() => {
                    self.set_status("A delete is already in progress.", StatusKind::Error);
                }
                KeyCode::Char('-') | KeyCode::Char('d') => match list.current_trip().cloned() {
                    Some(trip) => {
                        self.clear_status();
                        return Ok(Mode::ConfirmDelete(ConfirmTripDelete { trip }));
                    }
                    None => self.set_status("No trip selected to delete.", StatusKind::Error),
                },
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    list.reload(&self.view_model);
                    self.set_status("Reloading trips.", StatusKind::Info);
                }
                KeyCode::Char('g') => return Ok(Mode::GoTo(RoutePrompt::default())),
                _ => {}
            },
            Screen::Detail(ref detail) => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Backspace => self.go_back(),
                KeyCode::Char('e') | KeyCode::Char('E') => match detail.loaded_trip() {
                    Some(trip) => {
                        let id = trip.id;
                        self.clear_status();
                        self.navigate(Route::EditTrip(Some(id)));
                    }
                    None => self.set_status("Nothing to edit.", StatusKind::Error),
                },
                KeyCode::Char('g') => return Ok(Mode::GoTo(RoutePrompt::default())),
                _ => {}
            },
            Screen::Form(ref mut screen) => {
                if code == KeyCode::Esc {
                    self.clear_status();
                    self.go_back();
                    return Ok(Mode::Normal);
                }
                if !screen.accepts_input() {
                    return Ok(Mode::Normal);
                }
                match code {
                    KeyCode::Tab | KeyCode::Down => screen.form.focus_next(),
                    KeyCode::BackTab | KeyCode::Up => screen.form.focus_previous(),
                    KeyCode::Backspace => screen.form.backspace(),
                    KeyCode::Char(ch) => {
                        if screen.form.push_char(ch) {
                            screen.form.error = None;
                        }
                    }
                    KeyCode::Enter => self.submit_form(),
                    _ => {}
                }
            }
        }
        Ok(Mode::Normal)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmTripDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') if self.deleting.is_some() => {
                self.set_status("A delete is already in progress.", StatusKind::Error);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let pending = self.view_model.delete_trip(confirm.trip.clone());
                self.deleting = Some((confirm.trip, pending));
                self.set_status("Deleting trip...", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_route_prompt(&mut self, code: KeyCode, mut prompt: RoutePrompt) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Backspace => {
                prompt.input.pop();
                Mode::GoTo(prompt)
            }
            KeyCode::Enter => {
                if self.open_route(&prompt.input) {
                    self.clear_status();
                } else {
                    self.set_status(
                        format!("Unknown route '{}'.", prompt.input.trim()),
                        StatusKind::Error,
                    );
                }
                Mode::Normal
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                prompt.input.push(ch);
                Mode::GoTo(prompt)
            }
            _ => Mode::GoTo(prompt),
        }
    }

    /// Hand the form to the view-model. The screen stays open until the save
    /// resolves so a failure can be shown next to the fields.
    fn submit_form(&mut self) {
        let Screen::Form(ref mut screen) = self.screen else {
            return;
        };
        let Some(id) = screen.target.save_id() else {
            self.set_status("Nothing to save.", StatusKind::Error);
            return;
        };
        screen.saving = Some(self.view_model.save_trip(screen.form.to_trip(id)));
        self.set_status("Saving trip...", StatusKind::Info);
    }

    fn poll_save(&mut self) {
        let Screen::Form(ref mut screen) = self.screen else {
            return;
        };
        let Some(pending) = screen.saving.as_mut() else {
            return;
        };
        let Some(result) = pending.try_take() else {
            return;
        };
        screen.saving = None;

        match result {
            Ok(trip) => {
                self.go_back();
                self.set_status(format!("Saved trip to {trip}."), StatusKind::Info);
            }
            Err(err) => {
                let message = surface_error(&err);
                screen.form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn poll_delete(&mut self) {
        let Some((_, pending)) = self.deleting.as_mut() else {
            return;
        };
        let Some(result) = pending.try_take() else {
            return;
        };
        let Some((trip, _)) = self.deleting.take() else {
            return;
        };

        match result {
            Ok(_) => self.set_status(format!("Deleted trip to {trip}."), StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
        if let Screen::List(ref mut list) = self.screen {
            list.reload(&self.view_model);
        }
    }

    fn navigate(&mut self, route: Route) {
        self.navigator.navigate(route);
        debug!(%route, depth = self.navigator.depth(), "navigated");
        self.enter(route);
    }

    fn go_back(&mut self) {
        if self.navigator.pop_back() {
            let route = self.navigator.current();
            debug!(%route, depth = self.navigator.depth(), "navigated back");
            self.enter(route);
        }
    }

    /// Rebuild the screen for `route`. Every entry issues a fresh read.
    fn enter(&mut self, route: Route) {
        self.mode = Mode::Normal;
        self.screen = build_screen(&self.view_model, route);
    }

    pub fn draw(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(FOOTER_HEIGHT)])
            .split(frame.area());

        match &self.screen {
            Screen::List(list) => self.draw_list(frame, layout[0], list),
            Screen::Detail(detail) => self.draw_detail(frame, layout[0], detail),
            Screen::Form(screen) => self.draw_form(frame, layout[0], screen),
        }
        self.draw_footer(frame, layout[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, layout[0], confirm),
            Mode::GoTo(prompt) => self.draw_route_prompt(frame, layout[0], prompt),
        }
    }

    fn screen_block(&self, title: &str) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} [{}] ", self.route()))
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, list: &TripListScreen) {
        let block = self.screen_block("Trips");
        let trips = match &list.trips {
            Loadable::Loading(_) => {
                let paragraph = Paragraph::new(Span::styled(
                    "Loading trips...",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block);
                frame.render_widget(paragraph, area);
                return;
            }
            Loadable::Failed(message) => {
                let paragraph = Paragraph::new(Span::styled(
                    format!("Could not load trips: {message}"),
                    Style::default().fg(Color::Red),
                ))
                .block(block)
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, area);
                return;
            }
            Loadable::Ready(trips) => trips,
        };

        if trips.is_empty() {
            let paragraph = Paragraph::new("No trips yet. Press + to add one.")
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = trips
            .iter()
            .map(|trip| {
                let headline = Line::from(Span::styled(
                    truncate_to_width(&trip.to_string(), width),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                let detail = if trip.description.trim().is_empty() {
                    trip.date_range()
                } else {
                    trip.description.clone()
                };
                let subline = Line::from(Span::styled(
                    truncate_to_width(&detail, width),
                    Style::default().fg(Color::Gray),
                ));
                ListItem::new(vec![headline, subline])
            })
            .collect();

        let widget = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(list.selected));
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &TripDetailScreen) {
        let block = self.screen_block("Trip");

        let lines = match (&detail.trip, detail.loaded_trip()) {
            (Some(Loadable::Failed(message)), _) => vec![Line::from(Span::styled(
                format!("Could not load trip: {message}"),
                Style::default().fg(Color::Red),
            ))],
            (_, Some(trip)) => {
                let label = Style::default().fg(Color::Cyan);
                vec![
                    Line::from(vec![
                        Span::styled("Destination: ", label),
                        Span::styled(
                            trip.destination.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("Description: ", label),
                        Span::raw(trip.description.clone()),
                    ]),
                    Line::from(vec![
                        Span::styled("Start date: ", label),
                        Span::raw(trip.start_date.clone()),
                    ]),
                    Line::from(vec![
                        Span::styled("End date: ", label),
                        Span::raw(trip.end_date.clone()),
                    ]),
                ]
            }
            // Absent id, a miss, and an in-flight lookup all render no data.
            _ => Vec::new(),
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, screen: &TripFormScreen) {
        let block = self.screen_block(screen.title());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if screen.source_failed() {
            let message = screen.form.error.as_deref().unwrap_or("unknown error");
            let paragraph = Paragraph::new(Line::from(Span::styled(
                format!("Could not load trip: {message}"),
                Style::default().fg(Color::Red),
            )))
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
            return;
        }
        if !screen.accepts_input() && screen.saving.is_none() {
            return;
        }

        let mut lines = Vec::with_capacity(TripField::ALL.len() * 2 + 1);
        for field in TripField::ALL {
            lines.push(screen.form.build_line(field));
            lines.push(Line::from(""));
        }
        if let Some(error) = &screen.form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);

        if screen.accepts_input() {
            let row = TripField::ALL
                .iter()
                .position(|field| *field == screen.form.active)
                .unwrap_or(0) as u16
                * 2;
            let cursor_x = cursor_column(inner, screen.form.cursor_offset());
            let cursor_y = inner.y.saturating_add(row);
            if inner.width > 0 && cursor_y < inner.bottom() {
                frame.set_cursor_position((cursor_x, cursor_y));
            }
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmTripDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Trip").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete the trip to {}?", confirm.trip)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_route_prompt(&self, frame: &mut Frame, area: Rect, prompt: &RoutePrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Go to route");
        let paragraph = Paragraph::new(Span::raw(format!("Route: {}", prompt.input)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = cursor_column(inner, "Route: ".len() + prompt.input.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::ConfirmDelete(_)) => &[("[y]", " Delete   "), ("[n/Esc]", " Cancel")],
            (_, Mode::GoTo(_)) => &[("[Enter]", " Go   "), ("[Esc]", " Cancel")],
            (Screen::List(_), Mode::Normal) => &[
                ("[Up/Down]", " Navigate   "),
                ("[Enter]", " Details   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[r]", " Reload   "),
                ("[g]", " Go to   "),
                ("[q]", " Quit"),
            ],
            (Screen::Detail(_), Mode::Normal) => &[
                ("[e]", " Edit   "),
                ("[g]", " Go to   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Form(_), Mode::Normal) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(action.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

fn build_screen(view_model: &TripViewModel, route: Route) -> Screen {
    match route {
        Route::TripList => Screen::List(TripListScreen::load(view_model)),
        Route::TripDetail(_) => {
            Screen::Detail(TripDetailScreen::load(view_model, route.trip_id()))
        }
        Route::AddTrip => Screen::Form(TripFormScreen::create()),
        Route::EditTrip(_) => Screen::Form(TripFormScreen::edit(view_model, route.trip_id())),
    }
}
