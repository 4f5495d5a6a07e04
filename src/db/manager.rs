//! DatabaseManager - interfaccia comune dei backend di database
//!
//! Backends speak in JSON rows; the typed layer on `dyn DatabaseManager`
//! turns them into records of a given shape.

use super::error::DbError;
use super::query::{Conditions, SelectOptions};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A single row as returned by the database
pub type Row = Map<String, Value>;

/// Generic CRUD operations against a table-oriented database
///
/// Every method is self-contained (filters, payload and response are
/// call-scoped), so one instance can be shared across requests.
#[async_trait]
pub trait DatabaseManager: Send + Sync {
    /// Reads the only row matching `conditions`
    ///
    /// # Returns
    /// * `Ok(Some(row))` - exactly one row matched
    /// * `Ok(None)` - the database reported no match
    async fn select_one(&self, table: &str, conditions: &Conditions)
    -> Result<Option<Row>, DbError>;

    /// Reads the rows matching `conditions`, together with the total number
    /// of matches ignoring the requested range
    async fn select_many(
        &self,
        table: &str,
        conditions: &Conditions,
        options: &SelectOptions,
    ) -> Result<(Vec<Row>, u64), DbError>;

    /// Inserts `data` (must be a JSON object) and returns the stored row
    async fn insert(&self, table: &str, data: &Value) -> Result<Row, DbError>;

    /// Applies `data` to the row whose `id` equals `id` and returns it
    async fn update(&self, table: &str, id: &Value, data: &Value) -> Result<Row, DbError>;

    /// Deletes the row whose `id` equals `id`; succeeds even if none existed
    async fn delete(&self, table: &str, id: &Value) -> Result<bool, DbError>;

    /// Whether at least one row has `field` equal to `value`
    ///
    /// Several matching rows also give `true`, unlike [`select_one`](Self::select_one)
    /// which reports them as absent.
    async fn exists(&self, table: &str, field: &str, value: &Value) -> Result<bool, DbError>;
}

/// Rejects anything that is not a field map, before any call is issued
pub fn require_object<'a>(table: &str, data: &'a Value) -> Result<&'a Row, DbError> {
    match data {
        Value::Object(map) => Ok(map),
        Value::String(_) => {
            tracing::error!(
                "String passed as payload for table {} instead of a field map",
                table
            );
            Err(DbError::InvalidPayload(
                "the data argument must be a field map, not a JSON string".to_string(),
            ))
        }
        other => Err(DbError::InvalidPayload(format!(
            "the data argument must be a field map, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parses a row into the record shape `T`
pub fn decode_row<T: DeserializeOwned>(table: &str, row: Row) -> Result<T, DbError> {
    serde_json::from_value(Value::Object(row)).map_err(|source| DbError::Decode {
        table: table.to_string(),
        source,
    })
}

fn encode<D: Serialize + ?Sized>(table: &str, data: &D) -> Result<Value, DbError> {
    let value = serde_json::to_value(data)
        .map_err(|e| DbError::InvalidPayload(format!("cannot serialize payload: {e}")))?;
    require_object(table, &value)?;
    Ok(value)
}

// Typed layer: same operations, parametrized by record shape
impl dyn DatabaseManager {
    pub async fn select_one_as<T: DeserializeOwned + Send>(
        &self,
        table: &str,
        conditions: &Conditions,
    ) -> Result<Option<T>, DbError> {
        self.select_one(table, conditions)
            .await?
            .map(|row| decode_row(table, row))
            .transpose()
    }

    pub async fn select_many_as<T: DeserializeOwned + Send>(
        &self,
        table: &str,
        conditions: &Conditions,
        options: &SelectOptions,
    ) -> Result<(Vec<T>, u64), DbError> {
        let (rows, count) = self.select_many(table, conditions, options).await?;
        let records = rows
            .into_iter()
            .map(|row| decode_row(table, row))
            .collect::<Result<Vec<T>, _>>()?;
        Ok((records, count))
    }

    pub async fn insert_as<T, D>(&self, table: &str, data: &D) -> Result<T, DbError>
    where
        T: DeserializeOwned + Send,
        D: Serialize + Sync + ?Sized,
    {
        let payload = encode(table, data)?;
        let row = self.insert(table, &payload).await?;
        decode_row(table, row)
    }

    pub async fn update_as<T, D>(
        &self,
        table: &str,
        id: &Value,
        data: &D,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned + Send,
        D: Serialize + Sync + ?Sized,
    {
        let payload = encode(table, data)?;
        let row = self.update(table, id, &payload).await?;
        decode_row(table, row)
    }
}
