use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::normalize::normalize_categories;

pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;

/// Opaque identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealId(String);

impl MealId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MealId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MealId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A reported symptom together with how bad it was.
///
/// Severity only exists alongside a symptom, so the pair travels as one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    symptom: String,
    severity: u8,
}

impl Reaction {
    pub fn new(symptom: &str, severity: u8) -> Result<Self, ValidationError> {
        let symptom = symptom.trim();
        if symptom.is_empty() {
            return Err(ValidationError::SeverityWithoutSymptom(severity.to_string()));
        }
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&severity) {
            return Err(ValidationError::InvalidSeverity(severity.to_string()));
        }
        Ok(Self {
            symptom: symptom.to_string(),
            severity,
        })
    }

    #[must_use]
    pub fn symptom(&self) -> &str {
        &self.symptom
    }

    #[must_use]
    pub fn severity(&self) -> u8 {
        self.severity
    }
}

/// A meal after normalization. The only shape the view engine works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    pub(crate) id: MealId,
    pub(crate) food_name: String,
    pub(crate) categories: BTreeSet<String>,
    pub(crate) timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) reaction: Option<Reaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notes: Option<String>,
}

impl MealRecord {
    #[must_use]
    pub fn id(&self) -> &MealId {
        &self.id
    }

    #[must_use]
    pub fn food_name(&self) -> &str {
        &self.food_name
    }

    #[must_use]
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn reaction(&self) -> Option<&Reaction> {
        self.reaction.as_ref()
    }

    #[must_use]
    pub fn has_symptom(&self) -> bool {
        self.reaction.is_some()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

// --- Raw (wire) types ---

/// Identifier as the remote store sends it; some backends use numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Categories arrive either as a list or as one (possibly comma-separated) string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCategories {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSeverity {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RawSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// A meal record exactly as the remote store exposes it. Every field is
/// optional here; the normalizer decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMealRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<RawCategories>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<RawSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&MealRecord> for RawMealRecord {
    fn from(record: &MealRecord) -> Self {
        Self {
            id: Some(RawId::Text(record.id.to_string())),
            food_name: Some(record.food_name.clone()),
            categories: Some(RawCategories::List(
                record.categories.iter().cloned().collect(),
            )),
            timestamp: Some(record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            symptom: record.reaction.as_ref().map(|r| r.symptom.clone()),
            severity: record
                .reaction
                .as_ref()
                .map(|r| RawSeverity::Integer(i64::from(r.severity))),
            notes: record.notes.clone(),
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
#[must_use]
pub fn format_wire_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// --- Write side ---

/// Fields for creating or replacing a meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealDraft {
    pub food_name: String,
    pub categories: BTreeSet<String>,
    pub timestamp: DateTime<Utc>,
    pub reaction: Option<Reaction>,
    pub notes: Option<String>,
}

impl MealDraft {
    /// Category tags are canonicalized the same way incoming records are.
    pub fn new<I, S>(food_name: &str, categories: I, timestamp: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = categories
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self {
            food_name: food_name.trim().to_string(),
            categories: normalize_categories(Some(&RawCategories::Text(joined))),
            timestamp,
            reaction: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_reaction(mut self, reaction: Option<Reaction>) -> Self {
        self.reaction = reaction;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Option<&str>) -> Self {
        self.notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.food_name.trim().is_empty() {
            return Err(ValidationError::EmptyFoodName);
        }
        if self.categories.is_empty() {
            return Err(ValidationError::NoCategories);
        }
        Ok(())
    }

    /// Wire fields for `create`/`update`. Categories go out as one
    /// comma-joined string.
    #[must_use]
    pub fn to_raw(&self) -> RawMealRecord {
        let categories = self
            .categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        RawMealRecord {
            id: None,
            food_name: Some(self.food_name.clone()),
            categories: Some(RawCategories::Text(categories)),
            timestamp: Some(format_wire_timestamp(self.timestamp)),
            symptom: self.reaction.as_ref().map(|r| r.symptom.clone()),
            severity: self
                .reaction
                .as_ref()
                .map(|r| RawSeverity::Integer(i64::from(r.severity))),
            notes: self.notes.clone(),
        }
    }
}

impl From<&MealRecord> for MealDraft {
    fn from(record: &MealRecord) -> Self {
        Self {
            food_name: record.food_name.clone(),
            categories: record.categories.clone(),
            timestamp: record.timestamp,
            reaction: record.reaction.clone(),
            notes: record.notes.clone(),
        }
    }
}
