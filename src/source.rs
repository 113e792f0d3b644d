use crate::errors::SourceError;
use crate::models::RawRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, path::PathBuf, time::Duration};
use tokio::fs;
use tracing::{debug, warn};

const INVALID_FORMAT: &str = "Invalid data format received from API";

/// Somewhere a country list and per-country daily series can be read from.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn countries(&self) -> Result<Vec<String>, SourceError>;

    /// Raw daily records for `country`, oldest first. An empty list means the
    /// source has nothing for this country.
    async fn series(&self, country: &str) -> Result<Vec<RawRecord>, SourceError>;
}

/// Data plus the name of the source that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub source: String,
    pub data: T,
}

pub struct ApiSource {
    base_url: String,
    client: Client,
}

impl ApiSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, SourceError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "requesting upstream");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DataSource for ApiSource {
    fn name(&self) -> &str {
        "api"
    }

    async fn countries(&self) -> Result<Vec<String>, SourceError> {
        let payload = self.get_json("/countries", &[]).await?;
        parse_countries_payload(payload)
    }

    async fn series(&self, country: &str) -> Result<Vec<RawRecord>, SourceError> {
        let payload = self.get_json("/summary", &[("country", country)]).await?;
        parse_series_payload(payload)
    }
}

#[derive(Debug, Deserialize, Default)]
struct FallbackData {
    #[serde(default)]
    countries: Vec<String>,
    #[serde(rename = "countryData", default)]
    country_data: BTreeMap<String, Vec<RawRecord>>,
}

/// Static snapshot on disk, read on every call.
pub struct FallbackFileSource {
    path: PathBuf,
}

impl FallbackFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<FallbackData, SourceError> {
        let bytes = fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DataSource for FallbackFileSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn countries(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.load().await?.countries)
    }

    async fn series(&self, country: &str) -> Result<Vec<RawRecord>, SourceError> {
        let mut data = self.load().await?;
        Ok(data.country_data.remove(country).unwrap_or_default())
    }
}

/// Sources tried in priority order. A source that is unavailable hands over
/// to the next one; an upstream error ends the search.
pub struct SourceChain {
    sources: Vec<Box<dyn DataSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn DataSource>>) -> Self {
        Self { sources }
    }

    pub async fn countries(&self) -> Result<Loaded<Vec<String>>, SourceError> {
        for source in &self.sources {
            match source.countries().await {
                Ok(data) => {
                    return Ok(Loaded {
                        source: source.name().to_string(),
                        data,
                    });
                }
                Err(SourceError::Unavailable(reason)) => {
                    warn!(source = source.name(), %reason, "country list unavailable, trying next source");
                }
                Err(err) => return Err(err),
            }
        }
        Err(SourceError::Exhausted)
    }

    pub async fn series(&self, country: &str) -> Result<Loaded<Vec<RawRecord>>, SourceError> {
        for source in &self.sources {
            match source.series(country).await {
                Ok(data) => {
                    return Ok(Loaded {
                        source: source.name().to_string(),
                        data,
                    });
                }
                Err(SourceError::Unavailable(reason)) => {
                    warn!(source = source.name(), country, %reason, "series unavailable, trying next source");
                }
                Err(err) => return Err(err),
            }
        }
        Err(SourceError::Exhausted)
    }
}

pub fn parse_series_payload(payload: Value) -> Result<Vec<RawRecord>, SourceError> {
    if let Some(message) = upstream_error(&payload, "Failed to load data") {
        return Err(SourceError::Upstream(message));
    }

    match payload {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|_| SourceError::Upstream(INVALID_FORMAT.to_string()))
            })
            .collect(),
        _ => Err(SourceError::Upstream(INVALID_FORMAT.to_string())),
    }
}

pub fn parse_countries_payload(payload: Value) -> Result<Vec<String>, SourceError> {
    if let Some(message) = upstream_error(&payload, "Failed to load countries") {
        return Err(SourceError::Upstream(message));
    }

    let countries: Vec<String> = match payload {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if countries.is_empty() {
        return Err(SourceError::Unavailable(INVALID_FORMAT.to_string()));
    }
    Ok(countries)
}

/// Message carried by an `{"error": ...}` payload. The error may be a string
/// or a list of strings, in which case the first one wins.
fn upstream_error(payload: &Value, default: &str) -> Option<String> {
    let error = payload.get("error")?;
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => Some(
            messages
                .first()
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string(),
        ),
        _ => Some(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Stub {
        name: &'static str,
        outcome: Result<Vec<String>, SourceError>,
    }

    impl Stub {
        fn boxed(name: &'static str, outcome: Result<Vec<String>, SourceError>) -> Box<dyn DataSource> {
            Box::new(Self { name, outcome })
        }
    }

    #[async_trait]
    impl DataSource for Stub {
        fn name(&self) -> &str {
            self.name
        }

        async fn countries(&self) -> Result<Vec<String>, SourceError> {
            self.outcome.clone()
        }

        async fn series(&self, country: &str) -> Result<Vec<RawRecord>, SourceError> {
            self.outcome.clone().map(|countries| {
                countries
                    .iter()
                    .filter(|name| name.as_str() == country)
                    .map(|_| RawRecord::default())
                    .collect()
            })
        }
    }

    fn unique_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("covid_dashboard_{tag}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[test]
    fn series_payload_accepts_record_arrays() {
        let records = parse_series_payload(json!([
            {"date": "2021-01-01", "total_cases": 5},
            {"date": "2021-01-02", "total_cases": "7", "extra": true}
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].total_cases, Some(json!("7")));
    }

    #[test]
    fn series_payload_reports_upstream_errors() {
        assert_eq!(
            parse_series_payload(json!({"error": "Country not found"})),
            Err(SourceError::Upstream("Country not found".into()))
        );
        assert_eq!(
            parse_series_payload(json!({"error": ["first", "second"]})),
            Err(SourceError::Upstream("first".into()))
        );
        assert_eq!(
            parse_series_payload(json!({"error": 42})),
            Err(SourceError::Upstream("Failed to load data".into()))
        );
        assert_eq!(
            parse_series_payload(json!({"rows": []})),
            Err(SourceError::Upstream(INVALID_FORMAT.into()))
        );
    }

    #[test]
    fn countries_payload_falls_through_when_malformed() {
        assert_eq!(
            parse_countries_payload(json!(["India", "Peru"])).unwrap(),
            ["India", "Peru"]
        );
        assert!(matches!(
            parse_countries_payload(json!([])),
            Err(SourceError::Unavailable(_))
        ));
        assert_eq!(
            parse_countries_payload(json!({"error": {"code": 500}})),
            Err(SourceError::Upstream("Failed to load countries".into()))
        );
    }

    #[tokio::test]
    async fn chain_skips_unavailable_sources() {
        let chain = SourceChain::new(vec![
            Stub::boxed("api", Err(SourceError::Unavailable("refused".into()))),
            Stub::boxed("fallback", Ok(vec!["India".into()])),
        ]);

        let loaded = chain.countries().await.unwrap();
        assert_eq!(loaded.source, "fallback");
        assert_eq!(loaded.data, ["India"]);

        let series = chain.series("India").await.unwrap();
        assert_eq!(series.source, "fallback");
        assert_eq!(series.data.len(), 1);
    }

    #[tokio::test]
    async fn chain_stops_at_upstream_error() {
        let chain = SourceChain::new(vec![
            Stub::boxed("api", Err(SourceError::Upstream("bad country".into()))),
            Stub::boxed("fallback", Ok(vec!["India".into()])),
        ]);
        assert_eq!(
            chain.series("India").await,
            Err(SourceError::Upstream("bad country".into()))
        );
    }

    #[tokio::test]
    async fn chain_reports_exhaustion() {
        let chain = SourceChain::new(vec![Stub::boxed(
            "api",
            Err(SourceError::Unavailable("refused".into())),
        )]);
        let err = chain.countries().await.unwrap_err();
        assert_eq!(err, SourceError::Exhausted);
        assert_eq!(err.user_message(), crate::errors::NO_SOURCE_MESSAGE);
    }

    #[tokio::test]
    async fn fallback_file_serves_countries_and_series() {
        let path = unique_path("fallback");
        let snapshot = json!({
            "countries": ["India", "Peru"],
            "countryData": {
                "India": [{"date": "2021-01-01", "total_cases": 10}]
            }
        });
        std::fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

        let source = FallbackFileSource::new(&path);
        assert_eq!(source.countries().await.unwrap(), ["India", "Peru"]);
        assert_eq!(source.series("India").await.unwrap().len(), 1);
        assert!(source.series("Peru").await.unwrap().is_empty());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn missing_fallback_file_is_unavailable() {
        let source = FallbackFileSource::new(unique_path("missing"));
        assert!(matches!(
            source.countries().await,
            Err(SourceError::Unavailable(_))
        ));
    }
}
