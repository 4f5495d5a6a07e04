//! Database module - adapter verso il database remoto
//!
//! - [`DatabaseManager`]: common interface of every backend
//! - [`SupabaseManager`]: PostgREST backend used in production
//! - [`MemoryManager`]: in-process backend
//! - [`RetryingManager`]: decorator applying the [`RetryPolicy`]

pub mod error;
pub mod manager;
pub mod memory;
pub mod query;
pub mod retry;
pub mod supabase;

pub use error::{ApiError, DbError};
pub use manager::{DatabaseManager, Row, decode_row, require_object};
pub use memory::MemoryManager;
pub use query::{Conditions, RowRange, SelectOptions, SortDirection};
pub use retry::{ExponentialBackoff, RetryPolicy, RetryingManager};
pub use supabase::SupabaseManager;
