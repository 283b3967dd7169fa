use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::ValidationError;
use crate::models::{
    MAX_SEVERITY, MIN_SEVERITY, MealId, MealRecord, RawCategories, RawMealRecord, RawSeverity,
    Reaction,
};

/// Datetime layouts accepted once any UTC offset has been split off.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Turn one raw remote record into a canonical [`MealRecord`].
///
/// Normalizing the raw form of an already-canonical record yields the same
/// record again.
pub fn normalize(raw: RawMealRecord) -> Result<MealRecord, ValidationError> {
    let id = raw
        .id
        .map(|id| id.to_string().trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ValidationError::MissingId)?;

    let food_name = raw
        .food_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ValidationError::EmptyFoodName)?
        .to_string();

    let timestamp = match raw.timestamp.as_deref() {
        Some(ts) => parse_timestamp(ts)?,
        None => return Err(ValidationError::MissingTimestamp),
    };

    let reaction = normalize_reaction(raw.symptom.as_deref(), raw.severity.as_ref())?;

    let notes = raw
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(MealRecord {
        id: MealId::new(id),
        food_name,
        categories: normalize_categories(raw.categories.as_ref()),
        timestamp,
        reaction,
        notes,
    })
}

/// Collapse every accepted category shape into a set of lowercase tags.
#[must_use]
pub fn normalize_categories(raw: Option<&RawCategories>) -> BTreeSet<String> {
    match raw {
        None => BTreeSet::new(),
        Some(RawCategories::List(items)) => items.iter().filter_map(|c| canonical_tag(c)).collect(),
        Some(RawCategories::Text(text)) => text.split(',').filter_map(canonical_tag).collect(),
    }
}

fn canonical_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

fn normalize_reaction(
    symptom: Option<&str>,
    severity: Option<&RawSeverity>,
) -> Result<Option<Reaction>, ValidationError> {
    // An empty symptom string means nothing was reported.
    let symptom = symptom.map(str::trim).filter(|s| !s.is_empty());
    match (symptom, severity) {
        (None, None) => Ok(None),
        (None, Some(sev)) => Err(ValidationError::SeverityWithoutSymptom(sev.to_string())),
        (Some(s), None) => Err(ValidationError::SymptomWithoutSeverity(s.to_string())),
        (Some(s), Some(sev)) => Reaction::new(s, parse_severity(sev)?).map(Some),
    }
}

fn parse_severity(raw: &RawSeverity) -> Result<u8, ValidationError> {
    let invalid = || ValidationError::InvalidSeverity(raw.to_string());
    let value = match raw {
        RawSeverity::Integer(n) => *n,
        RawSeverity::Float(f) if f.fract() == 0.0 && f.is_finite() => *f as i64,
        RawSeverity::Float(_) => return Err(invalid()),
        RawSeverity::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
    };
    u8::try_from(value)
        .ok()
        .filter(|v| (MIN_SEVERITY..=MAX_SEVERITY).contains(v))
        .ok_or_else(invalid)
}

/// Parse an ISO-8601 timestamp into an absolute instant.
///
/// Accepts RFC 3339, minute precision (`2024-01-01T10:00Z`), datetimes with
/// no offset (taken as UTC) and bare dates (UTC midnight).
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError::MissingTimestamp);
    }
    let invalid = || ValidationError::InvalidTimestamp(input.to_string());

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let (body, offset) = split_offset(s).ok_or_else(invalid)?;
    let offset = offset.unwrap_or_else(|| Utc.fix());

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(body, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(body, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(invalid)?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(invalid)
}

/// Split a trailing `Z` / `±HH:MM` / `±HHMM` / `±HH` offset off a timestamp.
/// Returns `None` when something offset-like is present but malformed.
fn split_offset(s: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(body) = s.strip_suffix(['Z', 'z']) {
        return Some((body, Some(Utc.fix())));
    }
    // The date part contains '-', so only look for a sign after the time separator.
    let Some(time_start) = s.find(['T', ' ']) else {
        return Some((s, None));
    };
    let Some(sign_pos) = s[time_start..].rfind(['+', '-']) else {
        return Some((s, None));
    };
    let (body, offset) = s.split_at(time_start + sign_pos);
    Some((body, Some(parse_offset(offset)?)))
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let (sign, digits) = match offset.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawId;
    use proptest::prelude::*;

    fn raw(id: &str, name: &str, ts: &str) -> RawMealRecord {
        RawMealRecord {
            id: Some(RawId::Text(id.to_string())),
            food_name: Some(name.to_string()),
            timestamp: Some(ts.to_string()),
            ..RawMealRecord::default()
        }
    }

    fn tags(record: &MealRecord) -> Vec<&str> {
        record.categories().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_normalize_minimal_record() {
        let record = normalize(raw("1", "Oatmeal", "2024-01-01T10:00:00Z")).unwrap();
        assert_eq!(record.id().as_str(), "1");
        assert_eq!(record.food_name(), "Oatmeal");
        assert!(record.categories().is_empty());
        assert!(record.reaction().is_none());
        assert!(record.notes().is_none());
        assert_eq!(
            record.timestamp(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_category_shapes_are_equivalent() {
        let mut list = raw("1", "Burger", "2024-01-01T10:00Z");
        list.categories = Some(RawCategories::List(vec![
            "Dairy".to_string(),
            " red-meat ".to_string(),
        ]));
        let mut spaced = raw("1", "Burger", "2024-01-01T10:00Z");
        spaced.categories = Some(RawCategories::Text("Dairy, red-meat".to_string()));
        let mut tight = raw("1", "Burger", "2024-01-01T10:00Z");
        tight.categories = Some(RawCategories::Text("dairy,red-meat".to_string()));

        let a = normalize(list).unwrap();
        let b = normalize(spaced).unwrap();
        let c = normalize(tight).unwrap();
        assert_eq!(tags(&a), vec!["dairy", "red-meat"]);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_bare_category_string() {
        let cats = normalize_categories(Some(&RawCategories::Text(" Gluten ".to_string())));
        assert_eq!(cats.into_iter().collect::<Vec<_>>(), vec!["gluten"]);
    }

    #[test]
    fn test_empty_category_parts_dropped() {
        let cats = normalize_categories(Some(&RawCategories::Text(",dairy,, ,".to_string())));
        assert_eq!(cats.into_iter().collect::<Vec<_>>(), vec!["dairy"]);
        let cats = normalize_categories(Some(&RawCategories::List(vec![
            String::new(),
            "  ".to_string(),
        ])));
        assert!(cats.is_empty());
    }

    #[test]
    fn test_missing_food_name_rejected() {
        let mut r = raw("1", "", "2024-01-01T10:00Z");
        assert_eq!(normalize(r.clone()), Err(ValidationError::EmptyFoodName));
        r.food_name = Some("   ".to_string());
        assert_eq!(normalize(r.clone()), Err(ValidationError::EmptyFoodName));
        r.food_name = None;
        assert_eq!(normalize(r), Err(ValidationError::EmptyFoodName));
    }

    #[test]
    fn test_missing_id_rejected() {
        let mut r = raw("1", "Toast", "2024-01-01T10:00Z");
        r.id = None;
        assert_eq!(normalize(r.clone()), Err(ValidationError::MissingId));
        r.id = Some(RawId::Text("  ".to_string()));
        assert_eq!(normalize(r), Err(ValidationError::MissingId));
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let mut r = raw("x", "Toast", "2024-01-01T10:00Z");
        r.id = Some(RawId::Number(17));
        assert_eq!(normalize(r).unwrap().id().as_str(), "17");
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        assert_eq!(
            normalize(raw("1", "Toast", "yesterday-ish")),
            Err(ValidationError::InvalidTimestamp("yesterday-ish".to_string()))
        );
        assert_eq!(
            normalize(raw("1", "Toast", "2024-13-40T10:00Z")),
            Err(ValidationError::InvalidTimestamp(
                "2024-13-40T10:00Z".to_string()
            ))
        );
        let mut r = raw("1", "Toast", "");
        r.timestamp = None;
        assert_eq!(normalize(r), Err(ValidationError::MissingTimestamp));
    }

    #[test]
    fn test_timestamp_formats() {
        let ten = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T10:00:00Z").unwrap(), ten);
        assert_eq!(parse_timestamp("2024-01-01T10:00:00.000Z").unwrap(), ten);
        assert_eq!(parse_timestamp("2024-01-01T10:00Z").unwrap(), ten);
        assert_eq!(parse_timestamp("2024-01-01T12:00+02:00").unwrap(), ten);
        assert_eq!(parse_timestamp("2024-01-01T05:00-0500").unwrap(), ten);
        assert_eq!(parse_timestamp("2024-01-01T10:00").unwrap(), ten);
        assert_eq!(parse_timestamp("2024-01-01 10:00:00").unwrap(), ten);
        assert_eq!(
            parse_timestamp("2024-01-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_offset_rejected() {
        assert!(parse_timestamp("2024-01-01T10:00+2").is_err());
        assert!(parse_timestamp("2024-01-01T10:00+25:00").is_err());
    }

    #[test]
    fn test_reaction_pairs() {
        let mut r = raw("1", "Milkshake", "2024-01-01T10:00Z");
        r.symptom = Some("bloating".to_string());
        r.severity = Some(RawSeverity::Integer(7));
        let record = normalize(r).unwrap();
        let reaction = record.reaction().unwrap();
        assert_eq!(reaction.symptom(), "bloating");
        assert_eq!(reaction.severity(), 7);
    }

    #[test]
    fn test_severity_without_symptom_rejected() {
        let mut r = raw("1", "Milkshake", "2024-01-01T10:00Z");
        r.severity = Some(RawSeverity::Integer(4));
        assert_eq!(
            normalize(r.clone()),
            Err(ValidationError::SeverityWithoutSymptom("4".to_string()))
        );
        // An empty symptom counts as no symptom.
        r.symptom = Some(String::new());
        assert!(matches!(
            normalize(r),
            Err(ValidationError::SeverityWithoutSymptom(_))
        ));
    }

    #[test]
    fn test_symptom_without_severity_rejected() {
        let mut r = raw("1", "Milkshake", "2024-01-01T10:00Z");
        r.symptom = Some("gas".to_string());
        assert_eq!(
            normalize(r),
            Err(ValidationError::SymptomWithoutSeverity("gas".to_string()))
        );
    }

    #[test]
    fn test_empty_symptom_without_severity_is_no_reaction() {
        let mut r = raw("1", "Milkshake", "2024-01-01T10:00Z");
        r.symptom = Some(String::new());
        assert!(normalize(r).unwrap().reaction().is_none());
    }

    #[test]
    fn test_severity_forms() {
        assert_eq!(parse_severity(&RawSeverity::Text(" 3 ".to_string())), Ok(3));
        assert_eq!(parse_severity(&RawSeverity::Float(5.0)), Ok(5));
        assert!(parse_severity(&RawSeverity::Float(5.5)).is_err());
        assert!(parse_severity(&RawSeverity::Integer(0)).is_err());
        assert!(parse_severity(&RawSeverity::Integer(11)).is_err());
        assert!(parse_severity(&RawSeverity::Integer(-3)).is_err());
        assert!(parse_severity(&RawSeverity::Text("high".to_string())).is_err());
    }

    #[test]
    fn test_blank_notes_are_absent() {
        let mut r = raw("1", "Toast", "2024-01-01T10:00Z");
        r.notes = Some("   ".to_string());
        assert!(normalize(r.clone()).unwrap().notes().is_none());
        r.notes = Some(" with butter ".to_string());
        assert_eq!(normalize(r).unwrap().notes(), Some("with butter"));
    }

    fn arb_raw() -> impl Strategy<Value = RawMealRecord> {
        let categories = prop_oneof![
            Just(None),
            prop::collection::vec("[ A-Za-z-]{0,8}", 0..4)
                .prop_map(|v| Some(RawCategories::List(v))),
            "[ A-Za-z,-]{0,20}".prop_map(|s| Some(RawCategories::Text(s))),
        ];
        let reaction = prop_oneof![
            Just((None, None)),
            ("[a-z]{1,8}", 1i64..=10)
                .prop_map(|(s, n)| (Some(s), Some(RawSeverity::Integer(n)))),
        ];
        (
            "[a-z0-9]{1,8}",
            " ?[A-Za-z][A-Za-z ]{0,12}",
            categories,
            0i64..2_000_000_000,
            reaction,
            prop::option::of("[ a-z]{0,10}"),
        )
            .prop_map(|(id, name, categories, secs, (symptom, severity), notes)| {
                RawMealRecord {
                    id: Some(RawId::Text(id)),
                    food_name: Some(name),
                    categories,
                    timestamp: Utc
                        .timestamp_opt(secs, 0)
                        .single()
                        .map(|t| t.to_rfc3339()),
                    symptom,
                    severity,
                    notes,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(r in arb_raw()) {
            let once = normalize(r).unwrap();
            let twice = normalize(RawMealRecord::from(&once)).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_categories_are_canonical(r in arb_raw()) {
            let record = normalize(r).unwrap();
            for tag in record.categories() {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.trim(), tag.as_str());
                prop_assert_eq!(tag.to_lowercase(), tag.clone());
            }
        }
    }
}
