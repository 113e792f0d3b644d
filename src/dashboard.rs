use crate::errors::SourceError;
use crate::models::{DailyRecord, Notice, NoticeScope, RawRecord};
use crate::normalize::normalize_series;
use crate::range::TimeRange;
use crate::source::Loaded;
use tracing::{debug, info};

/// Snapshot of what the dashboard shows. Never mutated in place: every event
/// goes through [`DashboardState::apply`], which returns the next snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub countries: Vec<String>,
    pub selected: String,
    pub range: TimeRange,
    /// Normalized, unfiltered series of the selected country.
    pub series: Vec<DailyRecord>,
    pub source: Option<String>,
    pub loading: bool,
    pub error: Option<Notice>,
    /// Number of the most recent series request. Only its completion is kept.
    pub latest_request: u64,
}

#[derive(Debug, Clone)]
pub enum Event {
    CountriesRequested,
    CountriesLoaded(Result<Loaded<Vec<String>>, SourceError>),
    /// Issues a new series request for the country.
    CountrySelected(String),
    RangeSelected(TimeRange),
    SeriesLoaded {
        request: u64,
        outcome: Result<Loaded<Vec<RawRecord>>, SourceError>,
    },
}

impl DashboardState {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            countries: Vec::new(),
            selected: country.into(),
            range: TimeRange::default(),
            series: Vec::new(),
            source: None,
            loading: false,
            error: None,
            latest_request: 0,
        }
    }

    pub fn is_known_country(&self, country: &str) -> bool {
        self.countries.is_empty() || self.countries.iter().any(|known| known == country)
    }

    /// Returns the snapshot that follows `event`.
    ///
    /// The country list changes only on `CountriesLoaded`. A series answered
    /// by the fallback file leaves it as is, so the selector keeps offering
    /// the countries the list request found.
    pub fn apply(self, event: Event) -> Self {
        match event {
            Event::CountriesRequested => Self {
                loading: true,
                error: None,
                ..self
            },
            Event::CountriesLoaded(Ok(loaded)) => {
                info!(source = %loaded.source, count = loaded.data.len(), "country list loaded");
                Self {
                    countries: loaded.data,
                    loading: false,
                    ..self
                }
            }
            Event::CountriesLoaded(Err(err)) => Self {
                loading: false,
                error: Some(Notice {
                    scope: NoticeScope::Countries,
                    message: err.user_message(),
                }),
                ..self
            },
            Event::CountrySelected(country) => Self {
                selected: country,
                loading: true,
                error: None,
                latest_request: self.latest_request + 1,
                ..self
            },
            Event::RangeSelected(range) => Self { range, ..self },
            Event::SeriesLoaded { request, outcome } if request != self.latest_request => {
                debug!(request, latest = self.latest_request, ok = outcome.is_ok(), "discarding stale series");
                self
            }
            Event::SeriesLoaded {
                outcome: Ok(loaded),
                ..
            } => {
                let series = normalize_series(&loaded.data);
                info!(country = %self.selected, source = %loaded.source, days = series.len(), "series loaded");
                let error = series.is_empty().then(|| Notice {
                    scope: NoticeScope::Series,
                    message: format!("No data available for {}", self.selected),
                });
                Self {
                    series,
                    source: Some(loaded.source),
                    loading: false,
                    error,
                    ..self
                }
            }
            Event::SeriesLoaded {
                outcome: Err(err), ..
            } => Self {
                series: Vec::new(),
                source: None,
                loading: false,
                error: Some(Notice {
                    scope: NoticeScope::Series,
                    message: err.user_message(),
                }),
                ..self
            },
        }
    }
}
