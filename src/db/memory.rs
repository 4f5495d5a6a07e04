//! MemoryManager - backend in memoria
//!
//! Keeps every table in process memory and mimics what the REST database
//! does for this application: server assigned `id`/`created_at`/`updated_at`,
//! unique columns, and the same absent/duplicate/empty-result outcomes.
//! Used as a substitutable backend in tests.

use super::error::DbError;
use super::manager::{DatabaseManager, Row, require_object};
use super::query::{Conditions, SelectOptions, SortDirection};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryManager {
    tables: Mutex<HashMap<String, Table>>,
    unique: HashSet<(String, String)>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `column` of `table` as unique
    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.unique.insert((table.to_string(), column.to_string()));
        self
    }

    /// Number of rows currently stored in `table`
    pub fn len(&self, table: &str) -> usize {
        self.lock().get(table).map_or(0, |t| t.rows.len())
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Table>> {
        // a poisoned lock only means another test thread panicked
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_unique(&self, table: &str, rows: &[Row], candidate: &Row) -> Result<(), DbError> {
        for (unique_table, column) in &self.unique {
            if unique_table != table {
                continue;
            }
            let Some(value) = candidate.get(column) else {
                continue;
            };
            if rows.iter().any(|row| row.get(column) == Some(value)) {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(DbError::duplicate_key(Some(&format!(
                    "Key ({column})=({rendered}) already exists."
                ))));
            }
        }
        Ok(())
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        // nulls last, as Postgres does for ascending order
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl DatabaseManager for MemoryManager {
    async fn select_one(
        &self,
        table: &str,
        conditions: &Conditions,
    ) -> Result<Option<Row>, DbError> {
        let tables = self.lock();
        let mut matches = tables
            .get(table)
            .into_iter()
            .flat_map(|t| t.rows.iter())
            .filter(|row| conditions.matches(row));
        // exactly one row, as a single-object request demands
        match (matches.next(), matches.next()) {
            (Some(row), None) => Ok(Some(row.clone())),
            _ => Ok(None),
        }
    }

    async fn select_many(
        &self,
        table: &str,
        conditions: &Conditions,
        options: &SelectOptions,
    ) -> Result<(Vec<Row>, u64), DbError> {
        let tables = self.lock();
        let mut rows: Vec<Row> = tables
            .get(table)
            .into_iter()
            .flat_map(|t| t.rows.iter())
            .filter(|row| conditions.matches(row))
            .cloned()
            .collect();
        let total = rows.len() as u64;

        if let Some(field) = &options.sort_by {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(field), b.get(field));
                match options.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(range) = options.range {
            let skip = usize::try_from(range.start).unwrap_or(usize::MAX);
            let take = usize::try_from(range.end.saturating_sub(range.start))
                .unwrap_or(usize::MAX)
                .saturating_add(1);
            rows = rows.into_iter().skip(skip).take(take).collect();
        }
        Ok((rows, total))
    }

    async fn insert(&self, table: &str, data: &Value) -> Result<Row, DbError> {
        let fields = require_object(table, data)?;
        let mut tables = self.lock();
        let entry = tables.entry(table.to_string()).or_default();
        self.check_unique(table, &entry.rows, fields)?;

        entry.next_id += 1;
        let mut row = fields.clone();
        row.insert("id".to_string(), json!(entry.next_id));
        row.insert("created_at".to_string(), json!(Utc::now().to_rfc3339()));
        row.insert("updated_at".to_string(), Value::Null);
        entry.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &Value, data: &Value) -> Result<Row, DbError> {
        let fields = require_object(table, data)?;
        let mut tables = self.lock();
        let empty = || DbError::EmptyResult {
            table: table.to_string(),
            operation: "update",
        };
        let entry = tables.get_mut(table).ok_or_else(empty)?;
        let position = entry
            .rows
            .iter()
            .position(|row| row.get("id") == Some(id))
            .ok_or_else(empty)?;

        let others: Vec<Row> = entry
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != position)
            .map(|(_, row)| row.clone())
            .collect();
        self.check_unique(table, &others, fields)?;

        let row = &mut entry.rows[position];
        for (field, value) in fields {
            row.insert(field.clone(), value.clone());
        }
        row.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &Value) -> Result<bool, DbError> {
        if let Some(entry) = self.lock().get_mut(table) {
            entry.rows.retain(|row| row.get("id") != Some(id));
        }
        Ok(true)
    }

    async fn exists(&self, table: &str, field: &str, value: &Value) -> Result<bool, DbError> {
        let conditions = Conditions::new().eq(field, value.clone());
        Ok(self
            .lock()
            .get(table)
            .is_some_and(|t| t.rows.iter().any(|row| conditions.matches(row))))
    }
}
