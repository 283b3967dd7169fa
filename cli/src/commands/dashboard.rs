use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use serde::Serialize;

use bitelog_core::display::category_label;
use bitelog_core::models::MealRecord;
use bitelog_core::recency::format_recency;
use bitelog_core::store::MealStore;
use bitelog_core::view::ViewCache;

const RECENT_LIMIT: usize = 5;

#[derive(Serialize)]
struct RecentMeal<'a> {
    #[serde(flatten)]
    meal: &'a MealRecord,
    recency: String,
}

#[derive(Serialize)]
struct Dashboard<'a> {
    total: usize,
    with_symptoms: usize,
    dairy: usize,
    red_meat: usize,
    skipped: usize,
    recent: Vec<RecentMeal<'a>>,
}

pub(crate) async fn cmd_dashboard<S: MealStore, Tz: TimeZone>(
    cache: &mut ViewCache<S, Tz>,
    json: bool,
) -> Result<()> {
    cache.reset_filters();
    let report = cache.refresh().await.context("Failed to load meals")?;
    let stats = cache.stats();
    let recent = cache.recent(RECENT_LIMIT);
    let now = Local::now();

    let dashboard = Dashboard {
        total: stats.total,
        with_symptoms: stats.with_symptoms,
        dairy: stats.category_count("dairy"),
        red_meat: stats.category_count("red-meat"),
        skipped: report.rejected.len(),
        recent: recent
            .iter()
            .map(|meal| RecentMeal {
                meal,
                recency: format_recency(&meal.timestamp().with_timezone(&Local), &now),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    println!("Meals logged:     {}", dashboard.total);
    println!("With symptoms:    {}", dashboard.with_symptoms);
    println!("Dairy meals:      {}", dashboard.dairy);
    println!("Red meat meals:   {}", dashboard.red_meat);
    if dashboard.skipped > 0 {
        eprintln!("Skipped {} unreadable record(s)", dashboard.skipped);
    }

    println!();
    if dashboard.recent.is_empty() {
        println!("No meals logged yet. Add one with `bitelog add`.");
        return Ok(());
    }
    println!("Recent meals:");
    for entry in &dashboard.recent {
        let marker = if entry.meal.has_symptom() { " *" } else { "" };
        println!(
            "  {:<16} {} ({}){marker}",
            entry.recency,
            entry.meal.food_name(),
            category_label(entry.meal),
        );
    }
    Ok(())
}
