use anyhow::{Context, Result, bail};
use chrono::TimeZone;

use bitelog_core::error::Error;
use bitelog_core::models::{MealDraft, MealId, MealRecord, RawCategories};
use bitelog_core::normalize::normalize_categories;
use bitelog_core::store::MealStore;
use bitelog_core::view::ViewCache;

use super::helpers::{exit_not_found, parse_meal_time, parse_reaction, print_meal_card};

const NOTHING_TO_UPDATE: &str = "Nothing to update. Provide at least one of --food, --category, --at, \
     --symptom, --severity, --no-symptom, or --notes";

/// Fields shared by `add` and `edit`. `None` means "not given".
pub(crate) struct MealFields {
    pub food: Option<String>,
    pub categories: Vec<String>,
    pub at: Option<String>,
    pub symptom: Option<String>,
    pub severity: Option<u8>,
    pub no_symptom: bool,
    pub notes: Option<String>,
}

impl MealFields {
    fn is_empty(&self) -> bool {
        self.food.is_none()
            && self.categories.is_empty()
            && self.at.is_none()
            && self.symptom.is_none()
            && self.severity.is_none()
            && !self.no_symptom
            && self.notes.is_none()
    }
}

fn print_saved(verb: &str, record: &MealRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{verb} meal {}", record.id());
        print_meal_card(record);
    }
    Ok(())
}

pub(crate) async fn cmd_show<S: MealStore, Tz: TimeZone>(
    cache: &ViewCache<S, Tz>,
    id: &str,
    json: bool,
) -> Result<()> {
    let id = MealId::from(id);
    let record = match cache.fetch_one(&id).await {
        Err(Error::NotFound(_)) => exit_not_found(&format!("Meal '{id}' not found"), json),
        other => other.context("Failed to load meal")?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_meal_card(&record);
    }
    Ok(())
}

pub(crate) async fn cmd_add<S: MealStore, Tz: TimeZone>(
    cache: &mut ViewCache<S, Tz>,
    fields: MealFields,
    json: bool,
) -> Result<()> {
    let Some(food) = fields.food.as_deref() else {
        bail!("--food is required");
    };
    let timestamp = match fields.at.as_deref() {
        Some(at) => parse_meal_time(at)?,
        None => chrono::Utc::now(),
    };
    let reaction = parse_reaction(fields.symptom.as_deref(), fields.severity)?;

    let draft = MealDraft::new(food, &fields.categories, timestamp)
        .with_reaction(reaction)
        .with_notes(fields.notes.as_deref());
    let record = cache
        .upsert(None, &draft)
        .await
        .context("Failed to save meal")?;
    print_saved("Added", &record, json)
}

pub(crate) async fn cmd_edit<S: MealStore, Tz: TimeZone>(
    cache: &mut ViewCache<S, Tz>,
    id: &str,
    fields: MealFields,
    json: bool,
) -> Result<()> {
    if fields.is_empty() {
        bail!(NOTHING_TO_UPDATE);
    }
    if fields.no_symptom && (fields.symptom.is_some() || fields.severity.is_some()) {
        bail!("--no-symptom cannot be combined with --symptom or --severity");
    }

    let id = MealId::from(id);
    let current = match cache.fetch_one(&id).await {
        Err(Error::NotFound(_)) => exit_not_found(&format!("Meal '{id}' not found"), json),
        other => other.context("Failed to load meal")?,
    };

    let mut draft = MealDraft::from(&current);
    if let Some(food) = fields.food.as_deref() {
        draft.food_name = food.trim().to_string();
    }
    if !fields.categories.is_empty() {
        draft.categories = normalize_categories(Some(&RawCategories::List(fields.categories.clone())));
    }
    if let Some(at) = fields.at.as_deref() {
        draft.timestamp = parse_meal_time(at)?;
    }
    if fields.no_symptom {
        draft.reaction = None;
    } else if fields.symptom.is_some() || fields.severity.is_some() {
        // A lone --severity re-rates the symptom already on record.
        let symptom = fields
            .symptom
            .as_deref()
            .or_else(|| current.reaction().map(|r| r.symptom()));
        let severity = fields
            .severity
            .or_else(|| current.reaction().map(|r| r.severity()));
        draft.reaction = parse_reaction(symptom, severity)?;
    }
    if fields.notes.is_some() {
        draft = draft.with_notes(fields.notes.as_deref());
    }

    let record = match cache.upsert(Some(&id), &draft).await {
        Err(Error::NotFound(_)) => exit_not_found(&format!("Meal '{id}' not found"), json),
        other => other.context("Failed to save meal")?,
    };
    print_saved("Updated", &record, json)
}

pub(crate) async fn cmd_delete<S: MealStore, Tz: TimeZone>(
    cache: &mut ViewCache<S, Tz>,
    id: &str,
    json: bool,
) -> Result<()> {
    let id = MealId::from(id);
    match cache.remove(&id).await {
        Err(Error::NotFound(_)) => exit_not_found(&format!("Meal '{id}' not found"), json),
        other => other.context("Failed to delete meal")?,
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted meal {id}");
    }
    Ok(())
}
