//! Display state of the dashboard and the transitions between searches.
//!
//! `DashboardState` is a plain value: every transition consumes the old state
//! and returns a new one, so the `Idle -> Loading -> Success/Failed` machine can
//! be driven without any rendering or network.

use serde::Serialize;
use tracing::warn;

use crate::{
    error::SearchError,
    model::{CurrentConditions, DailyPoint, SearchOutcome},
    pipeline::WeatherQueryPipeline,
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Identity of a submitted search. Later searches have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SearchId(u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    phase: Phase,
    latest: Option<SearchId>,
    current: Option<CurrentConditions>,
    daily: Vec<DailyPoint>,
    notification: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            latest: None,
            current: None,
            daily: Vec::new(),
            notification: None,
        }
    }
}

impl DashboardState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn daily(&self) -> &[DailyPoint] {
        &self.daily
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// The forecast chart is only drawn when there is something to plot.
    pub fn show_forecast_panel(&self) -> bool {
        !self.daily.is_empty()
    }

    /// Enter `Loading` for a new search. Previous results are cleared right away.
    pub fn begin_search(self) -> (Self, SearchId) {
        let id = SearchId(self.latest.map_or(1, |SearchId(n)| n + 1));
        let next = Self {
            phase: Phase::Loading,
            latest: Some(id),
            current: None,
            daily: Vec::new(),
            notification: None,
        };
        (next, id)
    }

    /// Apply the result of search `id`. Results of superseded searches are dropped.
    pub fn complete(self, id: SearchId, result: Result<SearchOutcome, SearchError>) -> Self {
        if self.latest != Some(id) || self.phase != Phase::Loading {
            warn!(?id, latest = ?self.latest, "discarding stale search result");
            return self;
        }

        match result {
            Ok(SearchOutcome { current, daily }) => Self {
                phase: Phase::Success,
                current: Some(current),
                daily,
                notification: None,
                ..self
            },
            Err(err) => Self {
                phase: Phase::Failed,
                current: None,
                daily: Vec::new(),
                notification: Some(err.notification().to_string()),
                ..self
            },
        }
    }

    /// Back to `Idle` once the outcome has been shown. Results stay on screen.
    pub fn dismiss(self) -> Self {
        match self.phase {
            Phase::Success | Phase::Failed => Self { phase: Phase::Idle, notification: None, ..self },
            Phase::Idle | Phase::Loading => self,
        }
    }
}

/// Owns the pipeline and the state it feeds.
#[derive(Debug)]
pub struct Dashboard<P> {
    pipeline: WeatherQueryPipeline<P>,
    state: DashboardState,
}

impl<P: WeatherProvider> Dashboard<P> {
    pub fn new(provider: P) -> Self {
        Self { pipeline: WeatherQueryPipeline::new(provider), state: DashboardState::default() }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn pipeline(&self) -> &WeatherQueryPipeline<P> {
        &self.pipeline
    }

    /// Start a search and hand back its id; the state is now `Loading`.
    pub fn begin(&mut self) -> SearchId {
        let (next, id) = std::mem::take(&mut self.state).begin_search();
        self.state = next;
        id
    }

    pub fn finish(&mut self, id: SearchId, result: Result<SearchOutcome, SearchError>) {
        self.state = std::mem::take(&mut self.state).complete(id, result);
    }

    pub fn dismiss(&mut self) {
        self.state = std::mem::take(&mut self.state).dismiss();
    }

    /// Run one search end to end.
    pub async fn submit(&mut self, city: &str) -> &DashboardState {
        let id = self.begin();
        let result = self.pipeline.search(city).await;
        self.finish(id, result);
        &self.state
    }
}
