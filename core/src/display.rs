//! Labels shown on entry cards and list headers.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::models::MealRecord;

#[must_use]
pub fn category_label(record: &MealRecord) -> String {
    if record.categories().is_empty() {
        return "Not specified".to_string();
    }
    record
        .categories()
        .iter()
        .map(|c| capitalize(c))
        .collect::<Vec<_>>()
        .join(", ")
}

#[must_use]
pub fn symptom_label(record: &MealRecord) -> String {
    match record.reaction() {
        Some(r) => format!("{} - Severity {}", capitalize(r.symptom()), r.severity()),
        None => "No symptoms".to_string(),
    }
}

/// e.g. `Jan 15, 2024, 10:00 AM`
pub fn entry_time_label<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[must_use]
pub fn date_range_label(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    const FMT: &str = "%b %-d";
    match (start, end) {
        (Some(s), Some(e)) => format!("{} - {}", s.format(FMT), e.format(FMT)),
        (Some(s), None) => format!("From {}", s.format(FMT)),
        (None, Some(e)) => format!("Until {}", e.format(FMT)),
        (None, None) => "All Time".to_string(),
    }
}

#[must_use]
pub fn log_count_label(count: usize) -> String {
    if count == 1 {
        "(1 log)".to_string()
    } else {
        format!("({count} logs)")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawCategories, RawId, RawMealRecord, RawSeverity};
    use crate::normalize::normalize;
    use chrono::{FixedOffset, Utc};

    fn meal(categories: &str, symptom: Option<(&str, i64)>) -> MealRecord {
        normalize(RawMealRecord {
            id: Some(RawId::Text("1".to_string())),
            food_name: Some("Pizza".to_string()),
            categories: Some(RawCategories::Text(categories.to_string())),
            timestamp: Some("2024-01-15T10:00:00Z".to_string()),
            symptom: symptom.map(|(s, _)| s.to_string()),
            severity: symptom.map(|(_, n)| RawSeverity::Integer(n)),
            notes: None,
        })
        .unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label(&meal("", None)), "Not specified");
        assert_eq!(
            category_label(&meal("red-meat, DAIRY", None)),
            "Dairy, Red-meat"
        );
    }

    #[test]
    fn test_symptom_label() {
        assert_eq!(symptom_label(&meal("", None)), "No symptoms");
        assert_eq!(
            symptom_label(&meal("", Some(("bloating", 5)))),
            "Bloating - Severity 5"
        );
    }

    #[test]
    fn test_entry_time_label() {
        let record = meal("", None);
        assert_eq!(entry_time_label(&record.timestamp()), "Jan 15, 2024, 10:00 AM");

        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = record.timestamp().with_timezone(&west);
        assert_eq!(entry_time_label(&local), "Jan 15, 2024, 05:00 AM");
        assert_eq!(
            entry_time_label(&Utc.with_ymd_and_hms(2024, 3, 2, 21, 5, 0).unwrap()),
            "Mar 2, 2024, 09:05 PM"
        );
    }

    #[test]
    fn test_date_range_label() {
        assert_eq!(date_range_label(Some(date(1, 1)), Some(date(1, 5))), "Jan 1 - Jan 5");
        assert_eq!(date_range_label(Some(date(1, 1)), None), "From Jan 1");
        assert_eq!(date_range_label(None, Some(date(1, 5))), "Until Jan 5");
        assert_eq!(date_range_label(None, None), "All Time");
    }

    #[test]
    fn test_log_count_label() {
        assert_eq!(log_count_label(0), "(0 logs)");
        assert_eq!(log_count_label(1), "(1 log)");
        assert_eq!(log_count_label(3), "(3 logs)");
    }
}
