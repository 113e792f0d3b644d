use crate::models::DailyRecord;
use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Trailing window applied to a series before any view is derived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::All,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::OneYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::All => "all",
            TimeRange::OneMonth => "1m",
            TimeRange::ThreeMonths => "3m",
            TimeRange::SixMonths => "6m",
            TimeRange::OneYear => "1y",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::All => "All time",
            TimeRange::OneMonth => "Last month",
            TimeRange::ThreeMonths => "Last 3 months",
            TimeRange::SixMonths => "Last 6 months",
            TimeRange::OneYear => "Last year",
        }
    }

    fn months(self) -> Option<u32> {
        match self {
            TimeRange::All => None,
            TimeRange::OneMonth => Some(1),
            TimeRange::ThreeMonths => Some(3),
            TimeRange::SixMonths => Some(6),
            TimeRange::OneYear => Some(12),
        }
    }

    /// Earliest instant kept by this range, or `None` when nothing is cut.
    /// Month arithmetic clamps to the end of shorter months (Mar 31 minus one
    /// month is Feb 28) instead of rolling over into the following month.
    pub fn cutoff(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let months = self.months()?;
        Some(
            now.checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDateTime::MIN),
        )
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.as_str() == value.trim())
            .ok_or_else(|| format!("unknown time range '{value}'"))
    }
}

/// Keeps the records dated at or after the range's cutoff. Records whose
/// date does not parse survive only the `All` range.
pub fn filter_range(series: &[DailyRecord], range: TimeRange, now: NaiveDateTime) -> Vec<DailyRecord> {
    let Some(cutoff) = range.cutoff(now) else {
        return series.to_vec();
    };

    series
        .iter()
        .filter(|record| {
            parse_date(&record.date)
                .map(|date| date.and_time(NaiveTime::MIN) >= cutoff)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str) -> DailyRecord {
        DailyRecord {
            date: date.to_string(),
            ..DailyRecord::default()
        }
    }

    fn at(date: &str) -> NaiveDateTime {
        parse_date(date).unwrap().and_time(NaiveTime::MIN)
    }

    fn dates(series: &[DailyRecord]) -> Vec<&str> {
        series.iter().map(|record| record.date.as_str()).collect()
    }

    #[test]
    fn all_returns_series_unchanged() {
        let series = vec![day("2020-01-01"), day("Unknown date"), day("2021-06-01")];
        assert_eq!(filter_range(&series, TimeRange::All, at("2021-06-01")), series);
    }

    #[test]
    fn one_month_keeps_trailing_days() {
        let series = vec![
            day("2021-04-30"),
            day("2021-05-01"),
            day("2021-05-15"),
            day("2021-06-01"),
        ];
        let filtered = filter_range(&series, TimeRange::OneMonth, at("2021-06-01"));
        assert_eq!(dates(&filtered), ["2021-05-01", "2021-05-15", "2021-06-01"]);
    }

    #[test]
    fn one_year_subtracts_calendar_year() {
        let series = vec![day("2020-06-14"), day("2020-06-15"), day("2021-01-01")];
        let filtered = filter_range(&series, TimeRange::OneYear, at("2021-06-15"));
        assert_eq!(dates(&filtered), ["2020-06-15", "2021-01-01"]);
    }

    #[test]
    fn cutoff_uses_time_of_day() {
        let now = parse_date("2021-06-01").unwrap().and_hms_opt(12, 0, 0).unwrap();
        let series = vec![day("2021-05-01"), day("2021-05-02")];
        let filtered = filter_range(&series, TimeRange::OneMonth, now);
        assert_eq!(dates(&filtered), ["2021-05-02"]);
    }

    #[test]
    fn month_subtraction_clamps_short_months() {
        let cutoff = TimeRange::OneMonth.cutoff(at("2021-03-31")).unwrap();
        assert_eq!(cutoff, at("2021-02-28"));
    }

    #[test]
    fn unknown_dates_are_dropped_by_bounded_ranges() {
        let series = vec![day("Unknown date"), day("2021-06-01")];
        let filtered = filter_range(&series, TimeRange::SixMonths, at("2021-06-02"));
        assert_eq!(dates(&filtered), ["2021-06-01"]);
    }

    #[test]
    fn empty_result_is_valid() {
        let series = vec![day("2019-01-01")];
        assert!(filter_range(&series, TimeRange::ThreeMonths, at("2021-06-01")).is_empty());
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("3m".parse::<TimeRange>(), Ok(TimeRange::ThreeMonths));
        assert_eq!("all".parse::<TimeRange>(), Ok(TimeRange::All));
        assert!("2w".parse::<TimeRange>().is_err());
        assert_eq!(serde_json::to_string(&TimeRange::OneYear).unwrap(), "\"1y\"");
    }
}
