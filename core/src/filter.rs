use chrono::{NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::MealRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymptomStatus {
    #[default]
    Any,
    WithSymptom,
    WithoutSymptom,
}

impl SymptomStatus {
    /// Read a selector value. Anything unrecognised means "don't filter".
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "with" | "with-symptom" | "with-symptoms" => Self::WithSymptom,
            "without" | "no-symptoms" | "without-symptom" | "without-symptoms" => {
                Self::WithoutSymptom
            }
            _ => Self::Any,
        }
    }

    #[must_use]
    pub fn matches(self, record: &MealRecord) -> bool {
        match self {
            Self::Any => true,
            Self::WithSymptom => record.has_symptom(),
            Self::WithoutSymptom => !record.has_symptom(),
        }
    }
}

/// Predicates applied to the log list. Unset fields don't constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive, compared by calendar day.
    pub start_date: Option<NaiveDate>,
    /// Inclusive through 23:59:59.999 of that day.
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub symptom_status: SymptomStatus,
}

impl FilterCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.category_tag().is_none()
            && self.symptom_status == SymptomStatus::Any
    }

    /// Lowercased category filter; a blank filter is ignored.
    fn category_tag(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
    }

    /// `tz` decides which calendar day a record falls on.
    pub fn matches<Tz: TimeZone>(&self, record: &MealRecord, tz: &Tz) -> bool {
        self.matches_tag(record, tz, self.category_tag().as_deref())
    }

    fn matches_tag<Tz: TimeZone>(&self, record: &MealRecord, tz: &Tz, tag: Option<&str>) -> bool {
        let local = record.timestamp().with_timezone(tz).naive_local();

        if let Some(start) = self.start_date {
            if local.date() < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            let end_of_day = end.and_time(end_of_day());
            if local > end_of_day {
                return false;
            }
        }

        if let Some(tag) = tag {
            if !record.categories().contains(tag) {
                return false;
            }
        }

        self.symptom_status.matches(record)
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("23:59:59.999 is a valid time")
}

/// Keep the records that satisfy every set criterion, in input order.
pub fn filter_records<Tz: TimeZone>(
    records: &[MealRecord],
    criteria: &FilterCriteria,
    tz: &Tz,
) -> Vec<MealRecord> {
    if criteria.is_empty() {
        return records.to_vec();
    }
    let tag = criteria.category_tag();
    records
        .iter()
        .filter(|r| criteria.matches_tag(r, tz, tag.as_deref()))
        .cloned()
        .collect()
}
