//! Executes [`Command`]s against the real providers.
//!
//! Every command runs on its own tokio task and answers with exactly one
//! [`Msg`] on the channel. Nothing is cancelled once started; stale answers
//! are discarded by [`App`] using their tickets.

use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
    Config,
    app::{App, Command, Msg},
    fetch::fetch_report,
    geocode::{resolve_label, suggest},
    locate::{LocationProvider, locate_within, location_from_config},
    provider::{PlaceProvider, WeatherProvider, providers_from_config},
    view::Surface,
};

#[derive(Clone)]
pub struct Services {
    weather: Arc<dyn WeatherProvider>,
    places: Arc<dyn PlaceProvider>,
    location: Arc<dyn LocationProvider>,
    locate_timeout: Duration,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("weather", &self.weather)
            .field("places", &self.places)
            .field("location", &self.location)
            .field("locate_timeout", &self.locate_timeout)
            .finish()
    }
}

impl Services {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        places: Arc<dyn PlaceProvider>,
        location: Arc<dyn LocationProvider>,
        locate_timeout: Duration,
    ) -> Self {
        Self { weather, places, location, locate_timeout }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (weather, places) = providers_from_config(config)?;
        let location = location_from_config(config)?;
        Ok(Self::new(weather, places, location, config.location.timeout()))
    }

    pub fn with_location(mut self, location: Arc<dyn LocationProvider>) -> Self {
        self.location = location;
        self
    }

    pub fn places(&self) -> &Arc<dyn PlaceProvider> {
        &self.places
    }

    /// Run one command to completion and produce its answer.
    pub async fn execute(&self, command: Command) -> Msg {
        match command {
            Command::Locate => {
                Msg::Located(locate_within(self.location.as_ref(), self.locate_timeout).await)
            }
            Command::FetchWeather { ticket, coords, unit } => Msg::WeatherLoaded {
                ticket,
                result: fetch_report(self.weather.as_ref(), coords, unit).await,
            },
            Command::ReverseGeocode(coords) => Msg::PlaceResolved {
                coords,
                label: resolve_label(self.places.as_ref(), coords).await,
            },
            Command::Search { ticket, query } => Msg::SuggestionsLoaded {
                ticket,
                places: suggest(self.places.as_ref(), &query).await,
            },
        }
    }

    /// Run `command` in the background and send its answer to `tx`.
    pub fn dispatch(&self, command: Command, tx: &UnboundedSender<Msg>) {
        let services = self.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let msg = services.execute(command).await;
            if tx.send(msg).is_err() {
                tracing::debug!("Receiver gone, dropping result");
            }
        });
    }
}

/// Feed `commands` and everything they lead to through `app` until no
/// work is left.
pub async fn drive<S: Surface + ?Sized>(
    app: &mut App,
    services: &Services,
    surface: &mut S,
    commands: Vec<Command>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pending = 0usize;

    for command in commands {
        services.dispatch(command, &tx);
        pending += 1;
    }

    while pending > 0 {
        let Some(msg) = rx.recv().await else { break };
        pending -= 1;
        for command in app.update(msg, surface) {
            services.dispatch(command, &tx);
            pending += 1;
        }
    }
}
