//! Repository generico - lega un backend a una tabella e a un tipo di record

use super::traits::Record;
use crate::db::{Conditions, DatabaseManager, DbError, SelectOptions};
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed CRUD operations on the table of `T`
///
/// Pure delegation to the [`DatabaseManager`]: errors come back unchanged.
pub struct Repository<T: Record> {
    manager: Arc<dyn DatabaseManager>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.manager.clone())
    }
}

impl<T: Record> Repository<T> {
    pub fn new(manager: Arc<dyn DatabaseManager>) -> Self {
        Self {
            manager,
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        T::TABLE
    }

    /// # Returns
    /// * `Ok(Some(T))` - exactly one record matched
    /// * `Ok(None)` - no record matched
    pub async fn select_one(&self, conditions: &Conditions) -> Result<Option<T>, DbError> {
        self.manager.select_one_as(T::TABLE, conditions).await
    }

    /// Records matching `conditions` and the total count ignoring the range
    pub async fn select_many(
        &self,
        conditions: &Conditions,
        options: &SelectOptions,
    ) -> Result<(Vec<T>, u64), DbError> {
        self.manager
            .select_many_as(T::TABLE, conditions, options)
            .await
    }

    /// Inserts `data`, which must serialize to a field map
    pub async fn insert<D>(&self, data: &D) -> Result<T, DbError>
    where
        D: Serialize + Sync + ?Sized,
    {
        self.manager.insert_as(T::TABLE, data).await
    }

    pub async fn update<D>(&self, id: impl Into<Value>, data: &D) -> Result<T, DbError>
    where
        D: Serialize + Sync + ?Sized,
    {
        self.manager.update_as(T::TABLE, &id.into(), data).await
    }

    pub async fn delete(&self, id: impl Into<Value>) -> Result<bool, DbError> {
        self.manager.delete(T::TABLE, &id.into()).await
    }

    pub async fn exists(&self, field: &str, value: impl Into<Value>) -> Result<bool, DbError> {
        self.manager.exists(T::TABLE, field, &value.into()).await
    }
}
