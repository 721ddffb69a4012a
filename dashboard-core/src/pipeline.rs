use chrono::{Local, TimeZone};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::SearchError,
    model::{Coordinates, GeoCandidate, SearchOutcome},
    provider::WeatherProvider,
    reducer::daily_points,
};

/// Geocode, fetch current conditions and forecast, reduce to daily points.
#[derive(Debug)]
pub struct WeatherQueryPipeline<P> {
    provider: P,
}

impl<P: WeatherProvider> WeatherQueryPipeline<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve `city` to the first candidate the provider returns.
    pub async fn geocode(&self, city: &str) -> Result<GeoCandidate, SearchError> {
        let candidates = self.provider.geocode(city).await?;
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::CityNotFound { city: city.to_string() })
    }

    /// Run a full search, dating daily points in the local timezone.
    pub async fn search(&self, city: &str) -> Result<SearchOutcome, SearchError> {
        self.search_in(city, &Local).await
    }

    #[instrument(level = "debug", skip(self, tz))]
    pub async fn search_in<Tz>(&self, city: &str, tz: &Tz) -> Result<SearchOutcome, SearchError>
    where
        Tz: TimeZone + Sync,
    {
        let candidate = self.geocode(city).await.inspect_err(|e| warn!("{e}"))?;
        let at: Coordinates = candidate.coordinates();
        debug!(lat = at.latitude, lon = at.longitude, name = ?candidate.name, "geocoded");

        // Both calls depend only on the coordinates; either failure fails the search.
        let (current, samples) = tokio::try_join!(
            self.provider.current_conditions(at),
            self.provider.forecast(at),
        )
        .inspect_err(|e| warn!(endpoint = e.endpoint(), "weather fetch failed: {e}"))?;

        let daily = daily_points(&samples, tz);
        info!(
            location = %current.location_name,
            samples = samples.len(),
            daily = daily.len(),
            "search completed"
        );

        Ok(SearchOutcome { current, daily })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        error::FetchError,
        model::{CurrentConditions, ForecastSample},
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-process provider with canned answers and call counters.
    #[derive(Debug, Default)]
    pub(crate) struct StubProvider {
        pub candidates: Vec<GeoCandidate>,
        pub fail_current: bool,
        pub fail_forecast: bool,
        pub samples: Vec<ForecastSample>,
        pub weather_calls: AtomicUsize,
    }

    impl StubProvider {
        pub fn found() -> Self {
            let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
            Self {
                candidates: vec![
                    GeoCandidate {
                        latitude: 51.5,
                        longitude: -0.12,
                        name: Some("London".into()),
                        country: Some("GB".into()),
                    },
                    GeoCandidate { latitude: 1.0, longitude: 2.0, name: None, country: None },
                ],
                samples: (0..40)
                    .map(|i| {
                        let ts = start + Duration::hours(3 * i);
                        ForecastSample {
                            timestamp: ts,
                            provider_time: ts.naive_utc(),
                            temperature_c: 10.0 + i as f64 / 4.0,
                        }
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn failure(endpoint: &'static str) -> FetchError {
            FetchError::Status {
                endpoint,
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn geocode(&self, _city: &str) -> Result<Vec<GeoCandidate>, FetchError> {
            Ok(self.candidates.clone())
        }

        async fn current_conditions(
            &self,
            at: Coordinates,
        ) -> Result<CurrentConditions, FetchError> {
            self.weather_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_current {
                return Err(Self::failure("current weather"));
            }
            assert_eq!(at, Coordinates { latitude: 51.5, longitude: -0.12 });
            Ok(CurrentConditions {
                location_name: "London".into(),
                temperature_c: 14.2,
                condition: "light rain".into(),
            })
        }

        async fn forecast(&self, _at: Coordinates) -> Result<Vec<ForecastSample>, FetchError> {
            self.weather_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_forecast {
                return Err(Self::failure("forecast"));
            }
            Ok(self.samples.clone())
        }
    }

    #[tokio::test]
    async fn successful_search_produces_both_parts() {
        let pipeline = WeatherQueryPipeline::new(StubProvider::found());
        let outcome = pipeline.search_in("London", &Utc).await.expect("search succeeds");

        assert_eq!(outcome.current.location_name, "London");
        assert_eq!(outcome.current.condition, "light rain");
        assert_eq!(outcome.daily.len(), 5);
        assert!(outcome.daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn first_candidate_wins() {
        let pipeline = WeatherQueryPipeline::new(StubProvider::found());
        let candidate = pipeline.geocode("London").await.expect("found");
        assert_eq!(candidate.name.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn unknown_city_makes_no_weather_calls() {
        let pipeline = WeatherQueryPipeline::new(StubProvider::default());
        let err = pipeline.search_in("Nowhereville", &Utc).await.unwrap_err();

        assert!(matches!(err, SearchError::CityNotFound { ref city } if city == "Nowhereville"));
        assert_eq!(pipeline.provider().weather_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forecast_failure_fails_the_whole_search() {
        let stub = StubProvider { fail_forecast: true, ..StubProvider::found() };
        let pipeline = WeatherQueryPipeline::new(stub);

        let err = pipeline.search_in("London", &Utc).await.unwrap_err();
        assert!(matches!(err, SearchError::WeatherFetch(ref e) if e.endpoint() == "forecast"));
    }

    #[tokio::test]
    async fn current_failure_fails_the_whole_search() {
        let stub = StubProvider { fail_current: true, ..StubProvider::found() };
        let pipeline = WeatherQueryPipeline::new(stub);

        let err = pipeline.search_in("London", &Utc).await.unwrap_err();
        assert!(matches!(err, SearchError::WeatherFetch(_)));
    }

    #[tokio::test]
    async fn unaligned_forecast_still_succeeds_with_no_points() {
        let mut stub = StubProvider::found();
        for s in &mut stub.samples {
            s.provider_time += Duration::hours(1);
        }
        let pipeline = WeatherQueryPipeline::new(stub);

        let outcome = pipeline.search_in("London", &Utc).await.expect("search succeeds");
        assert!(outcome.daily.is_empty());
    }
}
