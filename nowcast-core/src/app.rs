//! Application state and the message/command loop.
//!
//! [`App::update`] applies one message to the state, writes the visible
//! consequences to a [`Surface`] and returns the side effects to run.
//! It never performs I/O itself; see [`crate::runtime`] for that.

use chrono::{Local, NaiveDate};

use crate::{
    chart::ChartSlot,
    error::{FetchError, LocationError},
    model::{Coordinates, Place, UnitPreference, WeatherReport},
    particles::SharedField,
    search::{Autocomplete, SearchAction, Sequencer, Ticket},
    view::{DashboardView, Element, Surface},
};

/// Input to the state machine: user actions and finished side effects.
#[derive(Debug)]
pub enum Msg {
    Located(Result<Coordinates, LocationError>),
    PlaceResolved { coords: Coordinates, label: String },
    WeatherLoaded { ticket: Ticket, result: Result<WeatherReport, FetchError> },
    SearchInput(String),
    SuggestionsLoaded { ticket: Ticket, places: Vec<Place> },
    /// Move the highlighted suggestion up (negative) or down.
    MoveSelection(isize),
    SelectSuggestion(usize),
    ToggleUnit,
    Retry,
    Resize { width: f64, height: f64 },
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locate,
    FetchWeather { ticket: Ticket, coords: Coordinates, unit: UnitPreference },
    ReverseGeocode(Coordinates),
    Search { ticket: Ticket, query: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Locating,
    Loading,
    Ready,
    LocationFailed(LocationError),
    /// Weather could not be loaded; `Msg::Retry` tries again.
    FetchFailed(String),
}

pub const LOCATING_LABEL: &str = "Locating…";

#[derive(Debug)]
pub struct App {
    unit: UnitPreference,
    coords: Option<Coordinates>,
    location_label: String,
    status: Status,
    view: Option<DashboardView>,
    chart: ChartSlot,
    field: SharedField,
    search: Autocomplete,
    weather_seq: Sequencer,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl App {
    pub fn new(unit: UnitPreference, field: SharedField) -> Self {
        Self {
            unit,
            coords: None,
            location_label: LOCATING_LABEL.to_string(),
            status: Status::Locating,
            view: None,
            chart: ChartSlot::default(),
            field,
            search: Autocomplete::default(),
            weather_seq: Sequencer::default(),
            today: local_today,
        }
    }

    /// Use a fixed date for the date element.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn unit(&self) -> UnitPreference {
        self.unit
    }

    pub fn coords(&self) -> Option<Coordinates> {
        self.coords
    }

    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn search(&self) -> &Autocomplete {
        &self.search
    }

    pub fn field(&self) -> &SharedField {
        &self.field
    }

    /// Initial paint and the first side effect: find the user.
    pub fn start<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Vec<Command> {
        surface.set_text(Element::UnitToggle, self.unit.label());
        surface.set_text(Element::Location, &self.location_label);
        self.status = Status::Locating;
        vec![Command::Locate]
    }

    /// Start with known coordinates, skipping the location lookup.
    pub fn start_at<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        coords: Coordinates,
        label: Option<String>,
    ) -> Vec<Command> {
        surface.set_text(Element::UnitToggle, self.unit.label());
        self.coords = Some(coords);
        match label {
            Some(label) => {
                self.set_location_label(surface, label);
                vec![self.fetch(coords)]
            }
            None => vec![self.fetch(coords), Command::ReverseGeocode(coords)],
        }
    }

    pub fn update<S: Surface + ?Sized>(&mut self, msg: Msg, surface: &mut S) -> Vec<Command> {
        match msg {
            Msg::Located(Ok(coords)) => {
                tracing::info!("Located at {coords}");
                self.coords = Some(coords);
                vec![self.fetch(coords), Command::ReverseGeocode(coords)]
            }
            Msg::Located(Err(e)) => {
                tracing::warn!("Location failed: {e}");
                self.set_location_label(surface, e.label().to_string());
                self.status = Status::LocationFailed(e);
                Vec::new()
            }
            Msg::PlaceResolved { coords, label } => {
                if self.coords == Some(coords) {
                    self.set_location_label(surface, label);
                } else {
                    tracing::debug!("Ignoring place name for superseded coordinates {coords}");
                }
                Vec::new()
            }
            Msg::WeatherLoaded { ticket, result } => {
                if !self.weather_seq.is_current(ticket) {
                    tracing::debug!("Dropping stale weather response {ticket:?}");
                    return Vec::new();
                }
                match result {
                    Ok(report) => self.render(&report, surface),
                    Err(e) => {
                        tracing::warn!("Weather fetch failed: {e}");
                        surface.set_text(
                            Element::Status,
                            &format!("Weather unavailable ({e}). Press r to retry."),
                        );
                        self.status = Status::FetchFailed(e.to_string());
                    }
                }
                Vec::new()
            }
            Msg::SearchInput(text) => {
                surface.replace_suggestions(&[]);
                match self.search.on_input(&text) {
                    SearchAction::Cleared => Vec::new(),
                    SearchAction::Lookup { ticket, query } => vec![Command::Search { ticket, query }],
                }
            }
            Msg::SuggestionsLoaded { ticket, places } => {
                if self.search.on_results(ticket, places) {
                    surface.replace_suggestions(&self.search.labels());
                }
                Vec::new()
            }
            Msg::MoveSelection(delta) => {
                self.search.move_selection(delta);
                Vec::new()
            }
            Msg::SelectSuggestion(index) => match self.search.select(index) {
                Some(place) => self.select_place(surface, place),
                None => Vec::new(),
            },
            Msg::ToggleUnit => {
                self.unit = self.unit.toggled();
                surface.set_text(Element::UnitToggle, self.unit.label());
                self.refetch()
            }
            Msg::Retry => self.refetch(),
            Msg::Resize { width, height } => {
                self.field.lock().resize(width, height);
                Vec::new()
            }
        }
    }

    /// Jump straight to a place, as if it had been picked from the list.
    pub fn select_place<S: Surface + ?Sized>(&mut self, surface: &mut S, place: Place) -> Vec<Command> {
        surface.replace_suggestions(&[]);
        surface.set_text(Element::SearchInput, &place.name);

        let coords = place.coordinates();
        self.coords = Some(coords);
        self.set_location_label(surface, place.label());
        vec![self.fetch(coords)]
    }

    fn refetch(&mut self) -> Vec<Command> {
        match self.coords {
            Some(coords) => vec![self.fetch(coords)],
            None => Vec::new(),
        }
    }

    fn fetch(&mut self, coords: Coordinates) -> Command {
        self.status = Status::Loading;
        Command::FetchWeather { ticket: self.weather_seq.next(), coords, unit: self.unit }
    }

    fn set_location_label<S: Surface + ?Sized>(&mut self, surface: &mut S, label: String) {
        surface.set_text(Element::Location, &label);
        self.location_label = label;
    }

    fn render<S: Surface + ?Sized>(&mut self, report: &WeatherReport, surface: &mut S) {
        let view = DashboardView::project(report, self.unit, (self.today)());

        view.apply_to(surface);
        self.chart.redraw(surface, &view.chart);
        self.field.lock().set_category(view.classification.category);
        surface.set_text(Element::Status, "");

        self.status = Status::Ready;
        self.view = Some(view);
    }
}
