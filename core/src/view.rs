use chrono::{TimeZone, Utc};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::filter::{FilterCriteria, filter_records};
use crate::models::{MealDraft, MealId, MealRecord};
use crate::normalize::normalize;
use crate::sort::{SortKey, sort_records};
use crate::stats::{LogStats, aggregate};
use crate::store::MealStore;

/// Outcome of a successful [`ViewCache::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Records kept in the full set.
    pub total: usize,
    /// Records dropped by normalization, keyed by whatever id they carried.
    pub rejected: Vec<(String, ValidationError)>,
}

/// Local mirror of the meal store plus the filtered, sorted view over it.
///
/// Every remote operation either succeeds and updates the mirror, or fails
/// and leaves the mirror exactly as it was.
///
/// `Tz` decides which calendar day a meal falls on when filtering by date.
/// Its rules are applied at each meal's own instant, so daylight-saving
/// changes are honoured.
pub struct ViewCache<S, Tz: TimeZone = Utc> {
    store: S,
    full_set: IndexMap<MealId, MealRecord>,
    derived_view: Vec<MealRecord>,
    criteria: FilterCriteria,
    sort_key: SortKey,
    tz: Tz,
}

impl<S: MealStore> ViewCache<S> {
    /// Calendar days are UTC days.
    pub fn new(store: S) -> Self {
        Self::with_time_zone(store, Utc)
    }
}

impl<S: MealStore, Tz: TimeZone> ViewCache<S, Tz> {
    pub fn with_time_zone(store: S, tz: Tz) -> Self {
        Self {
            store,
            full_set: IndexMap::new(),
            derived_view: Vec::new(),
            criteria: FilterCriteria::default(),
            sort_key: SortKey::default(),
            tz,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Remote operations ---

    /// Replace the full set with a fresh listing from the store.
    pub async fn refresh(&mut self) -> Result<RefreshReport> {
        let raw = self.store.list_all().await?;
        let fetched = raw.len();

        let mut full_set = IndexMap::with_capacity(fetched);
        let mut rejected = Vec::new();
        for record in raw {
            let label = record
                .id
                .as_ref()
                .map_or_else(|| "<no id>".to_string(), ToString::to_string);
            match normalize(record) {
                Ok(meal) => {
                    if full_set.shift_remove(meal.id()).is_some() {
                        warn!(id = %meal.id(), "duplicate meal id, keeping the later record");
                    }
                    full_set.insert(meal.id().clone(), meal);
                }
                Err(err) => {
                    warn!(id = %label, error = %err, "skipping malformed meal record");
                    rejected.push((label, err));
                }
            }
        }

        self.full_set = full_set;
        self.recompute();
        info!(
            fetched,
            kept = self.full_set.len(),
            rejected = rejected.len(),
            "refreshed meal log"
        );

        Ok(RefreshReport {
            total: self.full_set.len(),
            rejected,
        })
    }

    /// Delete remotely, then drop the record locally.
    pub async fn remove(&mut self, id: &MealId) -> Result<()> {
        self.store.delete(id).await?;
        self.full_set.shift_remove(id);
        self.recompute();
        debug!(%id, "removed meal");
        Ok(())
    }

    /// Create (`target = None`) or update a meal, then mirror what the store
    /// returned.
    pub async fn upsert(&mut self, target: Option<&MealId>, draft: &MealDraft) -> Result<MealRecord> {
        draft.validate()?;
        let fields = draft.to_raw();
        let returned = match target {
            Some(id) => self.store.update(id, &fields).await?,
            None => self.store.create(&fields).await?,
        };
        let record = normalize(returned)?;

        if let Some(old) = target {
            if old != record.id() {
                self.full_set.shift_remove(old);
            }
        }
        self.full_set.insert(record.id().clone(), record.clone());
        self.recompute();
        debug!(id = %record.id(), created = target.is_none(), "saved meal");
        Ok(record)
    }

    /// Fetch and normalize a single record without touching local state.
    pub async fn fetch_one(&self, id: &MealId) -> Result<MealRecord> {
        let raw = self.store.get_one(id).await?;
        Ok(normalize(raw)?)
    }

    // --- Local view ---

    pub fn apply_filter_and_sort(&mut self, criteria: FilterCriteria, sort_key: SortKey) {
        self.criteria = criteria;
        self.sort_key = sort_key;
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.apply_filter_and_sort(FilterCriteria::default(), SortKey::default());
    }

    fn recompute(&mut self) {
        let all: Vec<MealRecord> = self.full_set.values().cloned().collect();
        let filtered = filter_records(&all, &self.criteria, &self.tz);
        self.derived_view = sort_records(&filtered, self.sort_key);
        debug!(
            total = self.full_set.len(),
            shown = self.derived_view.len(),
            sort = self.sort_key.as_str(),
            "recomputed derived view"
        );
    }

    // --- Accessors ---

    pub fn full_set(&self) -> &IndexMap<MealId, MealRecord> {
        &self.full_set
    }

    pub fn derived_view(&self) -> &[MealRecord] {
        &self.derived_view
    }

    pub fn get(&self, id: &MealId) -> Option<&MealRecord> {
        self.full_set.get(id)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Counters over the derived view.
    pub fn stats(&self) -> LogStats {
        aggregate(&self.derived_view)
    }

    /// The newest `limit` meals of the full set, ignoring any filter.
    pub fn recent(&self, limit: usize) -> Vec<MealRecord> {
        let all: Vec<MealRecord> = self.full_set.values().cloned().collect();
        let mut newest = sort_records(&all, SortKey::Newest);
        newest.truncate(limit);
        newest
    }
}
