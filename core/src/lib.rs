//! Log view engine for the bitelog diet tracker.
//!
//! Raw records from a [`MealStore`] are normalized into [`MealRecord`]s,
//! mirrored by a [`ViewCache`], and projected through a filter and a sort
//! into the list the user sees.

pub mod display;
pub mod error;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod recency;
pub mod sort;
pub mod stats;
pub mod store;
pub mod view;

#[cfg(test)]
mod test_zone;

pub use error::{Error, Result, ValidationError};
pub use filter::{FilterCriteria, SymptomStatus, filter_records};
pub use models::{MealDraft, MealId, MealRecord, RawMealRecord, Reaction};
pub use normalize::normalize;
pub use recency::format_recency;
pub use sort::{SortKey, sort_records};
pub use stats::{LogStats, aggregate};
pub use store::{MealStore, MemoryStore};
pub use view::{RefreshReport, ViewCache};
