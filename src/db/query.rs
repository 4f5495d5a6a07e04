//! Query descriptors - filtri di uguaglianza, ordinamento e paginazione

use serde_json::Value;
use std::fmt;

/// Ordered list of equality filters (`field = value`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions(Vec<(String, Value)>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter on `field`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every filter matches the corresponding field of `row`
    pub fn matches(&self, row: &serde_json::Map<String, Value>) -> bool {
        self.iter()
            .all(|(field, value)| row.get(field).unwrap_or(&Value::Null) == value)
    }
}

impl<K, V> FromIterator<(K, V)> for Conditions
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Anything other than "desc" (case and leading blanks ignored) sorts ascending
impl From<&str> for SortDirection {
    fn from(value: &str) -> Self {
        if value.trim_start().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive row range, both ends zero based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

/// Ordering and pagination for `select_many`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub sort_by: Option<String>,
    pub direction: SortDirection,
    pub range: Option<RowRange>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.direction = direction;
        self
    }

    /// The range is applied only when both bounds are known
    pub fn range(mut self, start: Option<u64>, end: Option<u64>) -> Self {
        self.range = match (start, end) {
            (Some(start), Some(end)) => Some(RowRange { start, end }),
            _ => None,
        };
        self
    }
}
