//! Database errors - classificazione degli errori del layer di accesso ai dati
//!
//! Every backend reports failures through [`DbError`]. Only [`DbError::Api`]
//! is considered transient and is eligible for retry.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

/// PostgREST code for "JSON object requested, multiple (or no) rows returned"
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Postgres SQLSTATE for unique_violation
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

lazy_static! {
    static ref DUPLICATE_DETAIL: Regex =
        Regex::new(r"Key \(([^)]+)\)=\(([^)]+)\) already exists").expect("valid regex");
}

/// Error payload returned by the REST database
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code.into()),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// True when the database reports that no row matched a single-row request
    pub fn is_no_rows(&self) -> bool {
        self.code.as_deref() == Some(NO_ROWS_CODE)
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code.as_deref() == Some(UNIQUE_VIOLATION_CODE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (status {})",
            self.code.as_deref().unwrap_or("-"),
            self.message,
            self.status
        )?;
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Missing base URL or credential, never retried
    #[error("database configuration error: {0}")]
    Config(String),

    #[error("database unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("database rejected the credentials (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Generic API error reported by the database, the only retryable kind
    #[error("database API error {0}")]
    Api(ApiError),

    #[error("{message}")]
    DuplicateKey {
        column: Option<String>,
        value: Option<String>,
        message: String,
    },

    /// Programmer error: the payload is not a field map
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{operation} on table {table} returned no rows")]
    EmptyResult {
        table: String,
        operation: &'static str,
    },

    #[error("failed to decode row from table {table}: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("database transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl DbError {
    /// Whether the retry policy may attempt the operation again
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Api(_))
    }

    /// Builds a duplicate-key error from the database detail text.
    ///
    /// The detail is expected as `Key (<col>)=(<val>) already exists.`;
    /// anything else is surfaced raw.
    pub fn duplicate_key(details: Option<&str>) -> Self {
        let details = details.unwrap_or_default();
        match DUPLICATE_DETAIL.captures(details) {
            Some(caps) => {
                let column = caps[1].to_string();
                let value = caps[2].to_string();
                DbError::DuplicateKey {
                    message: format!("Duplicate key detected. Key: {column}, Value: {value}"),
                    column: Some(column),
                    value: Some(value),
                }
            }
            None => DbError::DuplicateKey {
                column: None,
                value: None,
                message: format!("Duplicate key error {details}"),
            },
        }
    }
}

impl From<ApiError> for DbError {
    fn from(err: ApiError) -> Self {
        DbError::Api(err)
    }
}
