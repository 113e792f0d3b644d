use crate::dashboard::DashboardState;
use crate::models::{
    DailyRecord, DashboardView, DistributionSlice, GrowthPoint, SummaryStats, TrendMetric,
};
use crate::range::filter_range;
use crate::weekly::weekly_averages;
use chrono::{NaiveDateTime, Utc};

const RECENT_DAYS: usize = 10;

pub const POPULAR_COUNTRIES: [&str; 5] = [
    "United States",
    "India",
    "United Kingdom",
    "Brazil",
    "Germany",
];

pub fn build_view(state: &DashboardState) -> DashboardView {
    build_view_at(Utc::now().naive_utc(), state)
}

/// Derives every view of the current state. Pure: the same state and instant
/// always produce the same view.
pub fn build_view_at(now: NaiveDateTime, state: &DashboardState) -> DashboardView {
    let series = filter_range(&state.series, state.range, now);
    let summary = summarize(&series);

    let suggestions = if series.is_empty() {
        POPULAR_COUNTRIES
            .iter()
            .filter(|country| state.countries.iter().any(|known| known == *country))
            .map(|country| country.to_string())
            .collect()
    } else {
        Vec::new()
    };

    DashboardView {
        country: state.selected.clone(),
        range: state.range,
        loading: state.loading,
        error: state.error.clone(),
        source: state.source.clone(),
        trend: trend_metrics(&summary),
        weekly: weekly_averages(&series),
        growth: growth_rates(&series),
        distribution: distribution(&series),
        recent: series[series.len().saturating_sub(RECENT_DAYS)..].to_vec(),
        summary,
        series,
        suggestions,
    }
}

/// Headline numbers from the most recent day. Normalized records always
/// carry totals, so the latest reported day is the last one.
pub fn summarize(series: &[DailyRecord]) -> SummaryStats {
    let Some(latest) = series.last() else {
        return SummaryStats::default();
    };

    SummaryStats {
        total_cases: latest.total_cases,
        total_deaths: latest.total_deaths,
        new_cases: latest.new_cases,
        new_deaths: latest.new_deaths,
        case_fatality_rate: if latest.total_cases > 0 {
            round2(latest.total_deaths as f64 / latest.total_cases as f64 * 100.0)
        } else {
            0.0
        },
    }
}

/// Day-over-day change of cumulative cases in percent. Days following a zero
/// total have no defined rate and are left out. A day whose total drops to 0
/// reports -100, not 0.
pub fn growth_rates(series: &[DailyRecord]) -> Vec<GrowthPoint> {
    if series.len() < 2 {
        return Vec::new();
    }

    let first = std::iter::once(GrowthPoint {
        date: series[0].date.clone(),
        total_cases: series[0].total_cases,
        growth_rate: 0.0,
    });

    let rest = series.windows(2).filter_map(|pair| {
        let (yesterday, today) = (&pair[0], &pair[1]);
        let rate = (today.total_cases as f64 - yesterday.total_cases as f64)
            / yesterday.total_cases as f64
            * 100.0;
        rate.is_finite().then(|| GrowthPoint {
            date: today.date.clone(),
            total_cases: today.total_cases,
            growth_rate: round2(rate),
        })
    });

    first.chain(rest).collect()
}

pub fn distribution(series: &[DailyRecord]) -> Vec<DistributionSlice> {
    let Some(latest) = series.last() else {
        return Vec::new();
    };

    vec![
        DistributionSlice {
            name: "Cases".to_string(),
            value: latest.total_cases.saturating_sub(latest.total_deaths),
        },
        DistributionSlice {
            name: "Deaths".to_string(),
            value: latest.total_deaths,
        },
    ]
}

pub fn trend_metrics(summary: &SummaryStats) -> Vec<TrendMetric> {
    let metric = |subject: &str, value: f64| TrendMetric {
        subject: subject.to_string(),
        value: round2(value),
    };

    vec![
        metric("Cases", if summary.total_cases > 0 { 100.0 } else { 0.0 }),
        metric("Deaths", percent(summary.total_deaths, summary.total_cases)),
        metric("New Cases", percent(summary.new_cases, summary.total_cases)),
        metric("New Deaths", percent(summary.new_deaths, summary.total_deaths)),
        metric("Fatality", summary.case_fatality_rate),
    ]
}

fn percent(part: i64, whole: i64) -> f64 {
    if part > 0 && whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
