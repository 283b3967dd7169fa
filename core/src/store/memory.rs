use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use uuid::Uuid;

use super::MealStore;
use crate::error::{Error, Result};
use crate::models::{MealId, RawId, RawMealRecord};

/// A `MealStore` that lives in process memory. Records keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<IndexMap<String, RawMealRecord>>,
    fail_next: Mutex<Option<Error>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw records as-is, malformed ones included.
    /// Records without an id get a generated one.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = RawMealRecord>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records();
            for mut record in records {
                let key = match &record.id {
                    Some(id) => id.to_string(),
                    None => {
                        let id = Uuid::new_v4().to_string();
                        record.id = Some(RawId::Text(id.clone()));
                        id
                    }
                };
                map.insert(key, record);
            }
        }
        store
    }

    /// Make the next store call fail with `error` instead of running.
    pub fn fail_next_call(&self, error: Error) {
        *self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &MealId) -> bool {
        self.records().contains_key(id.as_str())
    }

    fn records(&self) -> MutexGuard<'_, IndexMap<String, RawMealRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_injected_failure(&self) -> Result<()> {
        match self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl MealStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<RawMealRecord>> {
        self.check_injected_failure()?;
        Ok(self.records().values().cloned().collect())
    }

    async fn get_one(&self, id: &MealId) -> Result<RawMealRecord> {
        self.check_injected_failure()?;
        self.records()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn create(&self, fields: &RawMealRecord) -> Result<RawMealRecord> {
        self.check_injected_failure()?;
        let id = Uuid::new_v4().to_string();
        let record = RawMealRecord {
            id: Some(RawId::Text(id.clone())),
            ..fields.clone()
        };
        self.records().insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &MealId, fields: &RawMealRecord) -> Result<RawMealRecord> {
        self.check_injected_failure()?;
        let mut records = self.records();
        let slot = records
            .get_mut(id.as_str())
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        *slot = RawMealRecord {
            id: Some(RawId::Text(id.to_string())),
            ..fields.clone()
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: &MealId) -> Result<()> {
        self.check_injected_failure()?;
        self.records()
            .shift_remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}
