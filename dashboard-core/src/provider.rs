use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, CurrentConditions, ForecastSample, GeoCandidate},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The three upstream calls a search is made of.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Look up a city name. At most one candidate is requested.
    async fn geocode(&self, city: &str) -> Result<Vec<GeoCandidate>, FetchError>;

    async fn current_conditions(&self, at: Coordinates) -> Result<CurrentConditions, FetchError>;

    /// Raw 3-hour forecast series, in provider order.
    async fn forecast(&self, at: Coordinates) -> Result<Vec<ForecastSample>, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather-dashboard configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    OpenWeatherProvider::builder(api_key.to_owned())
        .base_url(config.base_url())
        .timeout(config.timeout())
        .build()
}
