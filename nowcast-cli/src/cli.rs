use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select};

use nowcast_core::{
    App, Config, Coordinates, ParticleField, Services, Status, UnitPreference,
    config::LocationMode,
    runtime::drive,
    search::{MAX_SUGGESTIONS, MIN_QUERY_LEN},
};

use crate::{text::TextSurface, tui};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Latitude to use instead of looking up the current location.
    #[arg(long, global = true, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude to use instead of looking up the current location.
    #[arg(long, global = true, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Temperature unit: celsius or fahrenheit.
    #[arg(long, global = true, value_parser = parse_unit)]
    pub unit: Option<UnitPreference>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive dashboard (the default).
    Dashboard,

    /// Print the current weather once.
    Show {
        /// Look up a place by name instead of using the current location.
        #[arg(long)]
        place: Option<String>,
    },

    /// List places matching a name.
    Search {
        query: String,
    },

    /// Choose the default unit and how the location is found.
    Configure,
}

fn parse_unit(value: &str) -> Result<UnitPreference, String> {
    UnitPreference::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub fn is_dashboard(&self) -> bool {
        matches!(self.command, None | Some(Command::Dashboard))
    }

    /// Config from disk with command-line overrides applied.
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load()?;
        if let Some(unit) = self.unit {
            config.unit = unit;
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.set_fixed_location(Coordinates::new(lat, lon));
        }
        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match &self.command {
            None | Some(Command::Dashboard) => tui::run(self.config()?).await,
            Some(Command::Show { place }) => show(self.config()?, place.as_deref()).await,
            Some(Command::Search { query }) => search(self.config()?, query).await,
            Some(Command::Configure) => configure(),
        }
    }
}

async fn show(config: Config, place: Option<&str>) -> anyhow::Result<()> {
    let services = Services::from_config(&config)?;
    let mut app = App::new(config.unit, ParticleField::new(0, 0.0, 0.0).shared());
    let mut surface = TextSurface::default();

    let start = match place {
        Some(name) => {
            let found = services
                .places()
                .search(name, 1)
                .await
                .with_context(|| format!("Failed to look up '{name}'"))?;
            let Some(place) = found.into_iter().next() else {
                bail!("No place found matching '{name}'");
            };
            app.start_at(&mut surface, place.coordinates(), Some(place.label()))
        }
        None => app.start(&mut surface),
    };

    drive(&mut app, &services, &mut surface, start).await;

    match app.status() {
        Status::Ready => {
            print!("{surface}");
            Ok(())
        }
        Status::LocationFailed(e) => bail!(
            "{}. Pass --lat/--lon or run `nowcast configure` to set a fixed location.",
            e.label()
        ),
        Status::FetchFailed(reason) => bail!("Weather unavailable: {reason}"),
        other => bail!("Stopped before the weather was loaded ({other:?})"),
    }
}

async fn search(config: Config, query: &str) -> anyhow::Result<()> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        bail!("Search needs at least {MIN_QUERY_LEN} characters");
    }

    let services = Services::from_config(&config)?;
    let places = services
        .places()
        .search(query.trim(), MAX_SUGGESTIONS)
        .await
        .with_context(|| format!("Failed to search for '{query}'"))?;

    if places.is_empty() {
        println!("No matches for '{query}'.");
    }
    for place in places {
        println!("{:<40} {}", place.label(), place.coordinates());
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let units = vec![UnitPreference::Celsius, UnitPreference::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units)
        .with_starting_cursor(start)
        .prompt()?;

    let modes = LocationMode::all().to_vec();
    let start = modes.iter().position(|m| *m == config.location.mode).unwrap_or(0);
    let mode = Select::new("How should your location be found?", modes)
        .with_starting_cursor(start)
        .prompt()?;

    if mode == LocationMode::Fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a decimal number")
            .with_default(config.location.latitude.unwrap_or(0.0))
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a decimal number")
            .with_default(config.location.longitude.unwrap_or(0.0))
            .prompt()?;
        config.set_fixed_location(Coordinates::new(latitude, longitude));
    } else {
        config.location.mode = mode;
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
