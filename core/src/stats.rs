use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::MealRecord;

/// Dashboard counters for a set of meals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub total: usize,
    pub with_symptoms: usize,
    pub without_symptoms: usize,
    pub category_counts: BTreeMap<String, usize>,
}

impl LogStats {
    #[must_use]
    pub fn category_count(&self, tag: &str) -> usize {
        self.category_counts
            .get(&tag.trim().to_lowercase())
            .copied()
            .unwrap_or(0)
    }
}

#[must_use]
pub fn aggregate(records: &[MealRecord]) -> LogStats {
    let total = records.len();
    let with_symptoms = records.iter().filter(|r| r.has_symptom()).count();

    let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        // Categories are a set, so each record counts once per tag.
        for tag in record.categories() {
            *category_counts.entry(tag.clone()).or_default() += 1;
        }
    }

    LogStats {
        total,
        with_symptoms,
        without_symptoms: total - with_symptoms,
        category_counts,
    }
}
