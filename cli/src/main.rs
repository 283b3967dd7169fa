mod commands;
mod config;
mod remote;

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    LogsQuery, MealFields, cmd_add, cmd_dashboard, cmd_delete, cmd_edit, cmd_logs, cmd_show,
};
use crate::config::Config;
use crate::remote::HttpMealStore;
use bitelog_core::view::ViewCache;

#[derive(Parser)]
#[command(
    name = "bitelog",
    version,
    about = "Log meals and symptoms, then slice the log",
    long_about = "Log what you eat and how you felt afterwards.\n\
        Meals are stored by a remote meal API; set its URL in config.json, \
        BITELOG_API_URL, or --api-url."
)]
struct Cli {
    /// Base URL of the meal API (overrides config and BITELOG_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, symptom and category counts, and the latest meals
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List meals with filters and sorting
    Logs {
        /// First day to include (YYYY-MM-DD, today, yesterday)
        #[arg(long)]
        from: Option<String>,
        /// Last day to include (YYYY-MM-DD, today, yesterday)
        #[arg(long)]
        to: Option<String>,
        /// Only meals tagged with this category
        #[arg(long)]
        category: Option<String>,
        /// Symptom filter: any, with, without
        #[arg(long, default_value = "any")]
        symptoms: String,
        /// Sort order: newest, oldest, name-asc, name-desc
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single meal
    Show {
        /// Meal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a new meal
    Add {
        #[command(flatten)]
        fields: MealArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing meal
    Edit {
        /// Meal ID
        id: String,
        #[command(flatten)]
        fields: MealArgs,
        /// Drop the recorded symptom
        #[arg(long)]
        no_symptom: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal
    Delete {
        /// Meal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct MealArgs {
    /// What you ate
    #[arg(long)]
    food: Option<String>,
    /// Category tag (repeatable, or comma-separated), e.g. dairy, red-meat
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<String>,
    /// When you ate it: now, "YYYY-MM-DD HH:MM" (local), or RFC 3339
    #[arg(long)]
    at: Option<String>,
    /// Symptom you noticed afterwards
    #[arg(long)]
    symptom: Option<String>,
    /// How bad the symptom was, 1-10
    #[arg(long)]
    severity: Option<u8>,
    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,
}

impl MealArgs {
    fn into_fields(self, no_symptom: bool) -> MealFields {
        MealFields {
            food: self.food,
            categories: self.categories,
            at: self.at,
            symptom: self.symptom,
            severity: self.severity,
            no_symptom,
            notes: self.notes,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.api_url.as_deref())?;
    tracing::debug!(api_url = %config.api_url, "using meal API");
    let store = HttpMealStore::new(&config);
    let mut cache = ViewCache::with_time_zone(store, Local);

    match cli.command {
        Commands::Dashboard { json } => cmd_dashboard(&mut cache, json).await,
        Commands::Logs {
            from,
            to,
            category,
            symptoms,
            sort,
            json,
        } => {
            let query = LogsQuery {
                from,
                to,
                category,
                symptoms,
                sort,
            };
            cmd_logs(&mut cache, query, json).await
        }
        Commands::Show { id, json } => cmd_show(&cache, &id, json).await,
        Commands::Add { fields, json } => cmd_add(&mut cache, fields.into_fields(false), json).await,
        Commands::Edit {
            id,
            fields,
            no_symptom,
            json,
        } => cmd_edit(&mut cache, &id, fields.into_fields(no_symptom), json).await,
        Commands::Delete { id, json } => cmd_delete(&mut cache, &id, json).await,
    }
}
