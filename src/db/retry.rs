//! Retry - politica di retry con backoff esponenziale
//!
//! [`RetryPolicy::run`] is the single place where the retry policy lives;
//! [`RetryingManager`] applies it to every operation of a wrapped backend.
//!
//! ```rust
//! use storefront::db::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = ExponentialBackoff::new(Duration::from_secs(2), Duration::from_secs(10));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(4));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(8));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(10));
//! ```

use super::error::DbError;
use super::manager::{DatabaseManager, Row};
use super::query::{Conditions, SelectOptions};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Doubling backoff calculator, capped at a maximum
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial: Duration,
    current: Duration,
    max: Duration,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            current: initial.min(max),
            max,
        }
    }

    /// Returns the current wait and doubles it for the next call
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        result
    }

    pub fn reset(&mut self) {
        self.current = self.initial.min(self.max);
    }
}

/// How many times, and how patiently, a transient failure is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Runs `attempt` until it succeeds, fails with a non transient error, or
    /// the attempts are exhausted; in the last case the last error is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, DbError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbError>>,
    {
        let mut backoff = ExponentialBackoff::new(self.initial_backoff, self.max_backoff);
        let mut attempt_number = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt_number < self.max_attempts => {
                    let wait = backoff.next_backoff();
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        operation, attempt_number, self.max_attempts, err, wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt_number += 1;
                }
                Err(err) => {
                    if err.is_transient() {
                        error!(
                            "{} failed after {} attempts: {}",
                            operation, attempt_number, err
                        );
                    }
                    return Err(err);
                }
            }
        }
    }
}

/// Backend decorator applying a [`RetryPolicy`] to every operation
pub struct RetryingManager<M> {
    inner: M,
    policy: RetryPolicy,
}

impl<M: DatabaseManager> RetryingManager<M> {
    pub fn new(inner: M, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: DatabaseManager> DatabaseManager for RetryingManager<M> {
    async fn select_one(
        &self,
        table: &str,
        conditions: &Conditions,
    ) -> Result<Option<Row>, DbError> {
        self.policy
            .run("select_one", || self.inner.select_one(table, conditions))
            .await
    }

    async fn select_many(
        &self,
        table: &str,
        conditions: &Conditions,
        options: &SelectOptions,
    ) -> Result<(Vec<Row>, u64), DbError> {
        self.policy
            .run("select_many", || {
                self.inner.select_many(table, conditions, options)
            })
            .await
    }

    async fn insert(&self, table: &str, data: &Value) -> Result<Row, DbError> {
        self.policy
            .run("insert", || self.inner.insert(table, data))
            .await
    }

    async fn update(&self, table: &str, id: &Value, data: &Value) -> Result<Row, DbError> {
        self.policy
            .run("update", || self.inner.update(table, id, data))
            .await
    }

    async fn delete(&self, table: &str, id: &Value) -> Result<bool, DbError> {
        self.policy
            .run("delete", || self.inner.delete(table, id))
            .await
    }

    async fn exists(&self, table: &str, field: &str, value: &Value) -> Result<bool, DbError> {
        self.policy
            .run("exists", || self.inner.exists(table, field, value))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::error::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn transient() -> DbError {
        DbError::Api(ApiError::new(503, "PGRST000", "connection pool exhausted"))
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let mut backoff = ExponentialBackoff::new(Duration::from_secs(2), Duration::from_secs(10));
        let waits: Vec<u64> = (0..5).map(|_| backoff.next_backoff().as_secs()).collect();
        assert_eq!(waits, vec![2, 4, 8, 10, 10]);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run("update", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok("updated")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "updated");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s after the first failure, 4s after the second
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), DbError> = RetryPolicy::default()
            .run("update", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            })
            .await;

        assert!(matches!(result, Err(DbError::Api(ref e)) if e.code.as_deref() == Some("PGRST000")));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn programmer_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), DbError> = RetryPolicy::default()
            .run("insert", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DbError::InvalidPayload("string".into()))
            })
            .await;

        assert!(matches!(result, Err(DbError::InvalidPayload(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
