use reqwest::StatusCode;
use thiserror::Error;

pub const CITY_NOT_FOUND_MESSAGE: &str = "City not found!";
pub const FETCH_FAILED_MESSAGE: &str =
    "Error fetching data. Please check your API key and city name.";

/// Failure of a single provider call: transport, HTTP status or payload shape.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to send request to OpenWeather ({endpoint})")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status { endpoint: &'static str, status: StatusCode, body: String },

    #[error("failed to parse OpenWeather {endpoint} response")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// Why a search produced no results.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no geocoding match for city '{city}'")]
    CityNotFound { city: String },

    #[error(transparent)]
    WeatherFetch(#[from] FetchError),
}

impl SearchError {
    /// Text shown to the user. Fetch failures are deliberately not told apart.
    pub fn notification(&self) -> &'static str {
        match self {
            SearchError::CityNotFound { .. } => CITY_NOT_FOUND_MESSAGE,
            SearchError::WeatherFetch(_) => FETCH_FAILED_MESSAGE,
        }
    }
}
