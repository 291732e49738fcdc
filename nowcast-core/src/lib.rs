//! Core library for the `nowcast` weather dashboard.
//!
//! This crate defines:
//! - Configuration, loaded from and saved to the user's config directory
//! - Location, forecast, air-quality and geocoding providers
//! - The weather code to icon/category mapping
//! - A display-agnostic dashboard state machine ([`App`]) that renders to a
//!   [`Surface`] and asks for side effects as [`Command`]s
//! - The temperature chart and the ambient particle animation
//!
//! It is used by `nowcast-cli`, but can also drive other front ends.

pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod icon;
pub mod locate;
pub mod model;
pub mod particles;
pub mod provider;
pub mod runtime;
pub mod search;
pub mod view;

#[cfg(test)]
mod testing;

pub use app::{App, Command, Msg, Status};
pub use config::Config;
pub use error::{FetchError, LocationError};
pub use icon::{Classification, WeatherCategory, WeatherIcon};
pub use model::{Coordinates, Place, UnitPreference, WeatherReport};
pub use particles::{Animator, Canvas, ParticleField};
pub use provider::{PlaceProvider, WeatherProvider};
pub use runtime::Services;
pub use view::{Element, Surface};
