//! The remote meal store the view cache mirrors.

mod memory;

use std::future::Future;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{MealId, RawMealRecord};

/// Remote CRUD over raw meal records.
///
/// Implementations hand back records exactly as stored; normalization is the
/// caller's job.
pub trait MealStore: Send + Sync {
    fn list_all(&self) -> impl Future<Output = Result<Vec<RawMealRecord>>> + Send;

    /// Fails with [`Error::NotFound`](crate::Error::NotFound) for unknown ids.
    fn get_one(&self, id: &MealId) -> impl Future<Output = Result<RawMealRecord>> + Send;

    /// Returns the stored record, including the id the store assigned.
    fn create(&self, fields: &RawMealRecord) -> impl Future<Output = Result<RawMealRecord>> + Send;

    fn update(
        &self,
        id: &MealId,
        fields: &RawMealRecord,
    ) -> impl Future<Output = Result<RawMealRecord>> + Send;

    fn delete(&self, id: &MealId) -> impl Future<Output = Result<()>> + Send;
}
