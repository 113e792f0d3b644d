use crate::models::{DailyRecord, RawRecord};
use serde_json::Value;

pub const UNKNOWN_DATE: &str = "Unknown date";

pub fn normalize_series(raw: &[RawRecord]) -> Vec<DailyRecord> {
    raw.iter().map(normalize_record).collect()
}

/// Coerces a raw record into a [`DailyRecord`]. Never fails: anything that
/// does not read as a number becomes 0.
pub fn normalize_record(raw: &RawRecord) -> DailyRecord {
    DailyRecord {
        date: normalize_date(raw.date.as_ref()),
        new_cases: coerce_count(raw.new_cases.as_ref()),
        total_cases: coerce_count(raw.total_cases.as_ref()),
        new_deaths: coerce_count(raw.new_deaths.as_ref()),
        total_deaths: coerce_count(raw.total_deaths.as_ref()),
    }
}

fn normalize_date(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(date)) if !date.is_empty() => date.chars().take(10).collect(),
        _ => UNKNOWN_DATE.to_string(),
    }
}

fn coerce_count(value: Option<&Value>) -> i64 {
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Some(0.0)
            } else {
                text.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };

    match number {
        Some(number) if number.is_finite() => number.round() as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        serde_json::from_value(value).expect("raw record")
    }

    #[test]
    fn normalizes_mixed_numeric_fields() {
        let record = normalize_record(&raw(json!({
            "date": "2021-03-04T00:00:00Z",
            "new_cases": "12",
            "total_cases": 1500.0,
            "new_deaths": null,
            "total_deaths": " 7 "
        })));

        assert_eq!(record.date, "2021-03-04");
        assert_eq!(record.new_cases, 12);
        assert_eq!(record.total_cases, 1500);
        assert_eq!(record.new_deaths, 0);
        assert_eq!(record.total_deaths, 7);
    }

    #[test]
    fn invalid_values_default_to_zero() {
        let record = normalize_record(&raw(json!({
            "date": "2021-03-04",
            "new_cases": "lots",
            "total_cases": {"nested": 1},
            "new_deaths": [],
        })));

        assert_eq!(record.new_cases, 0);
        assert_eq!(record.total_cases, 0);
        assert_eq!(record.new_deaths, 0);
        assert_eq!(record.total_deaths, 0);
    }

    #[test]
    fn missing_or_blank_date_is_unknown() {
        assert_eq!(normalize_record(&RawRecord::default()).date, UNKNOWN_DATE);
        assert_eq!(normalize_record(&raw(json!({"date": ""}))).date, UNKNOWN_DATE);
        assert_eq!(normalize_record(&raw(json!({"date": 20210304}))).date, UNKNOWN_DATE);
    }

    #[test]
    fn series_keeps_order() {
        let series = normalize_series(&[
            raw(json!({"date": "2021-01-01", "total_cases": 1})),
            raw(json!({"date": "2021-01-02", "total_cases": 2})),
        ]);
        let dates: Vec<_> = series.iter().map(|day| day.date.as_str()).collect();
        assert_eq!(dates, ["2021-01-01", "2021-01-02"]);
    }
}
