//! Weekly averages over a daily series.
//!
//! Weeks are seven-day groups anchored on January 1 of each year, shifted by
//! the weekday January 1 falls on (counted from Sunday). This is not ISO-8601:
//! the last days of December and the first days of January always land in
//! different weeks, and week 1 may be shorter than seven days.

use crate::models::{DailyRecord, WeekBucket};
use crate::range::parse_date;
use crate::stats::round2;
use chrono::{Datelike, NaiveDate};

pub const UNKNOWN_WEEK: &str = "Unknown week";

pub fn week_number(date: NaiveDate) -> u32 {
    let offset = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|jan1| jan1.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (date.ordinal0() + offset + 1).div_ceil(7)
}

pub fn week_label(date: &str) -> String {
    match parse_date(date) {
        Some(date) => format!("Week {} {}", week_number(date), date.year()),
        None => UNKNOWN_WEEK.to_string(),
    }
}

struct OpenWeek {
    label: String,
    days: u32,
    new_cases: i64,
    new_deaths: i64,
    total_cases: i64,
    total_deaths: i64,
}

impl OpenWeek {
    fn start(label: String, day: &DailyRecord) -> Self {
        Self {
            label,
            days: 1,
            new_cases: day.new_cases,
            new_deaths: day.new_deaths,
            total_cases: day.total_cases,
            total_deaths: day.total_deaths,
        }
    }

    fn push(&mut self, day: &DailyRecord) {
        self.days += 1;
        self.new_cases = self.new_cases.saturating_add(day.new_cases);
        self.new_deaths = self.new_deaths.saturating_add(day.new_deaths);
        self.total_cases = day.total_cases;
        self.total_deaths = day.total_deaths;
    }

    fn finish(self) -> WeekBucket {
        let days = f64::from(self.days);
        WeekBucket {
            week: self.label,
            days: self.days,
            avg_new_cases: round2(self.new_cases as f64 / days),
            avg_new_deaths: round2(self.new_deaths as f64 / days),
            total_cases: self.total_cases,
            total_deaths: self.total_deaths,
        }
    }
}

/// Groups consecutive days sharing a week label. A label seen again after a
/// different one opens a new bucket; buckets are emitted in encounter order.
pub fn weekly_averages(series: &[DailyRecord]) -> Vec<WeekBucket> {
    let mut buckets = Vec::new();
    let mut open: Option<OpenWeek> = None;

    for day in series {
        let label = week_label(&day.date);
        match open.as_mut() {
            Some(week) if week.label == label => week.push(day),
            _ => {
                if let Some(done) = open.replace(OpenWeek::start(label, day)) {
                    buckets.push(done.finish());
                }
            }
        }
    }

    if let Some(done) = open {
        buckets.push(done.finish());
    }

    buckets
}
