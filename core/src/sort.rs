use std::cmp::Ordering;
use std::sync::LazyLock;

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::locale;

use crate::models::MealRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    /// Arrival order. Used for selector values we don't recognise.
    Unsorted,
}

impl SortKey {
    /// Read a selector value such as `"name-asc"`. Unknown values fall back
    /// to [`SortKey::Unsorted`] instead of failing.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "newest" => Self::Newest,
            "oldest" => Self::Oldest,
            "name-asc" | "nameasc" | "name" => Self::NameAsc,
            "name-desc" | "namedesc" => Self::NameDesc,
            _ => Self::Unsorted,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::Unsorted => "unsorted",
        }
    }
}

/// Return a sorted copy. The sort is stable: ties keep their input order.
#[must_use]
pub fn sort_records(records: &[MealRecord], key: SortKey) -> Vec<MealRecord> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::Newest => sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
        SortKey::Oldest => sorted.sort_by_key(MealRecord::timestamp),
        SortKey::NameAsc => sorted.sort_by(|a, b| collate(a.food_name(), b.food_name())),
        SortKey::NameDesc => sorted.sort_by(|a, b| collate(b.food_name(), a.food_name())),
        SortKey::Unsorted => {}
    }
    sorted
}

static COLLATOR: LazyLock<CollatorBorrowed<'static>> = LazyLock::new(|| {
    Collator::try_new(locale!("en").into(), CollatorOptions::default())
        .expect("compiled collation data covers en")
});

/// Locale-aware comparison using the `en` collation: letters first compare
/// without regard to accents or case, then accents, then lowercase before
/// uppercase.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR.compare(a, b)
}
