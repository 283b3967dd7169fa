use anyhow::{Context, Result};
use chrono::TimeZone;
use serde::Serialize;

use bitelog_core::display::{date_range_label, log_count_label};
use bitelog_core::filter::{FilterCriteria, SymptomStatus};
use bitelog_core::models::MealRecord;
use bitelog_core::sort::SortKey;
use bitelog_core::stats::LogStats;
use bitelog_core::store::MealStore;
use bitelog_core::view::ViewCache;

use super::helpers::{parse_date, print_meal_table};

pub(crate) struct LogsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub symptoms: String,
    pub sort: String,
}

#[derive(Serialize)]
struct LogsOutput<'a> {
    range: String,
    sort: &'static str,
    stats: LogStats,
    meals: &'a [MealRecord],
}

pub(crate) async fn cmd_logs<S: MealStore, Tz: TimeZone>(
    cache: &mut ViewCache<S, Tz>,
    query: LogsQuery,
    json: bool,
) -> Result<()> {
    let criteria = FilterCriteria {
        start_date: parse_date(query.from)?,
        end_date: parse_date(query.to)?,
        category: query.category,
        symptom_status: SymptomStatus::parse(&query.symptoms),
    };
    let sort_key = SortKey::parse(&query.sort);
    let range = date_range_label(criteria.start_date, criteria.end_date);

    cache.apply_filter_and_sort(criteria, sort_key);
    cache.refresh().await.context("Failed to load meals")?;
    let stats = cache.stats();

    if json {
        let output = LogsOutput {
            range,
            sort: cache.sort_key().as_str(),
            stats,
            meals: cache.derived_view(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{range} {}", log_count_label(stats.total));
    println!(
        "{} with symptoms, {} without",
        stats.with_symptoms, stats.without_symptoms
    );
    if cache.derived_view().is_empty() {
        println!("No meals match these filters.");
        return Ok(());
    }
    print_meal_table(cache.derived_view());
    Ok(())
}
