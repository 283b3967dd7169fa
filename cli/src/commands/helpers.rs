use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use bitelog_core::display::{category_label, entry_time_label, symptom_label};
use bitelog_core::models::{MealRecord, Reaction};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<Option<NaiveDate>> {
    let Some(s) = date_str else {
        return Ok(None);
    };
    let today = Local::now().date_naive();
    let date = match s.as_str() {
        "today" => today,
        "yesterday" => today - chrono::Duration::days(1),
        "tomorrow" => today + chrono::Duration::days(1),
        _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
            format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
        })?,
    };
    Ok(Some(date))
}

/// Parse `--at`: "now", an RFC 3339 instant, or a local "YYYY-MM-DD HH:MM".
pub(crate) fn parse_meal_time(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .with_context(|| {
            format!("Invalid time '{value}'. Use 'now', 'YYYY-MM-DD HH:MM' or an RFC 3339 timestamp")
        })?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{value}' does not exist in the local time zone"))?;
    Ok(local.with_timezone(&Utc))
}

/// Symptom and severity are given together or not at all.
pub(crate) fn parse_reaction(symptom: Option<&str>, severity: Option<u8>) -> Result<Option<Reaction>> {
    match (symptom, severity) {
        (None, None) => Ok(None),
        (Some(s), Some(n)) => Ok(Some(Reaction::new(s, n)?)),
        (Some(s), None) => bail!("--symptom '{s}' needs a --severity between 1 and 10"),
        (None, Some(_)) => bail!("--severity needs a --symptom"),
    }
}

/// Wall-clock label in the machine's zone, using the rules in force at that instant.
fn local_time_label(record: &MealRecord) -> String {
    entry_time_label(&record.timestamp().with_timezone(&Local))
}

pub(crate) fn print_meal_table(records: &[MealRecord]) {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "When")]
        when: String,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "Categories")]
        categories: String,
        #[tabled(rename = "Symptom")]
        symptom: String,
    }

    let rows: Vec<MealRow> = records
        .iter()
        .map(|r| MealRow {
            id: truncate(r.id().as_str(), 12),
            when: local_time_label(r),
            food: truncate(r.food_name(), 30),
            categories: truncate(&category_label(r), 30),
            symptom: symptom_label(r),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_meal_card(record: &MealRecord) {
    println!("{} ({})", record.food_name(), record.id());
    println!("  When:       {}", local_time_label(record));
    println!("  Categories: {}", category_label(record));
    println!("  Symptom:    {}", symptom_label(record));
    if let Some(notes) = record.notes() {
        println!("  Notes:      {notes}");
    }
}

/// Report a missing meal and exit with status 2.
pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
