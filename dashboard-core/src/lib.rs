//! Core library for the `weather-dashboard` tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind the `WeatherProvider` trait
//! - The search pipeline (geocode, fetch, reduce to daily points)
//! - The dashboard state machine driven by searches
//!
//! It is used by `dashboard-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod reducer;
pub mod state;

pub use config::Config;
pub use error::{FetchError, SearchError};
pub use model::{
    Coordinates, CurrentConditions, DailyPoint, ForecastSample, GeoCandidate, SearchOutcome,
};
pub use pipeline::WeatherQueryPipeline;
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use reducer::daily_points;
pub use state::{Dashboard, DashboardState, Phase, SearchId};
