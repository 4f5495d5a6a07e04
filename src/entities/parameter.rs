//! Parameter entity - Entità parametro chiave/valore

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key/value setting scoped to a deployment environment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub key: String,
    pub value: String,
    /// e.g. "production", "staging"
    pub environment: String,
}
