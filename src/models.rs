use crate::range::TimeRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One day as delivered by a data source. Every field may be missing, null,
/// a number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawRecord {
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub new_cases: Option<Value>,
    #[serde(default)]
    pub total_cases: Option<Value>,
    #[serde(default)]
    pub new_deaths: Option<Value>,
    #[serde(default)]
    pub total_deaths: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: String,
    pub new_cases: i64,
    pub total_cases: i64,
    pub new_deaths: i64,
    pub total_deaths: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SummaryStats {
    pub total_cases: i64,
    pub total_deaths: i64,
    pub new_cases: i64,
    pub new_deaths: i64,
    pub case_fatality_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekBucket {
    pub week: String,
    pub days: u32,
    pub avg_new_cases: f64,
    pub avg_new_deaths: f64,
    pub total_cases: i64,
    pub total_deaths: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthPoint {
    pub date: String,
    pub total_cases: i64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionSlice {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendMetric {
    pub subject: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeScope {
    Countries,
    Series,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub scope: NoticeScope,
    pub message: String,
}

/// Everything the page needs for one render of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub country: String,
    pub range: TimeRange,
    pub loading: bool,
    pub error: Option<Notice>,
    pub source: Option<String>,
    pub summary: SummaryStats,
    pub series: Vec<DailyRecord>,
    pub recent: Vec<DailyRecord>,
    pub weekly: Vec<WeekBucket>,
    pub growth: Vec<GrowthPoint>,
    pub distribution: Vec<DistributionSlice>,
    pub trend: Vec<TrendMetric>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SelectRequest {
    pub country: Option<String>,
    pub range: Option<TimeRange>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CountryQuery {
    pub q: Option<String>,
}
