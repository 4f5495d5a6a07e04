//! Common repository traits
//!
//! This module defines the binding between a record shape and its table.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record shape persisted in one table
///
/// # Example
/// ```
/// use storefront::repositories::Record;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Note {
///     id: i64,
///     text: String,
/// }
///
/// impl Record for Note {
///     const TABLE: &'static str = "notes";
/// }
/// ```
pub trait Record: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Name of the table holding the stored view of the record
    const TABLE: &'static str;
}
