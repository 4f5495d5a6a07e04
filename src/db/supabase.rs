//! SupabaseManager - backend REST (PostgREST) per Supabase
//!
//! Native REST implementation on top of `reqwest`. Requests go to
//! `{url}/rest/v1/{table}` authenticated with the service role key.
//!
//! References:
//! - [PostgREST API](https://postgrest.org/en/stable/references/api.html)
//! - [PostgREST errors](https://postgrest.org/en/stable/references/errors.html)

use super::error::{ApiError, DbError};
use super::manager::{DatabaseManager, Row, require_object};
use super::query::{Conditions, SelectOptions};
use crate::core::config::DatabaseConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Supabase REST client
pub struct SupabaseManager {
    http_client: Client,
    rest_url: String,
}

impl SupabaseManager {
    /// Builds the client without contacting the service
    ///
    /// # Errors
    /// * `DbError::Config` - base URL or key missing, or key not usable as a header
    pub fn new(config: &DatabaseConfig) -> Result<Self, DbError> {
        let url = config.url.trim().trim_end_matches('/');
        let key = config.service_role_key.trim();
        if url.is_empty() || key.is_empty() {
            return Err(DbError::Config(
                "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(key)
            .map_err(|_| DbError::Config("service role key is not a valid header".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| DbError::Config("service role key is not a valid header".to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DbError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            rest_url: format!("{url}/rest/v1"),
        })
    }

    /// Builds the client and verifies connectivity and credentials
    ///
    /// # Errors
    /// * `DbError::Config` - see [`SupabaseManager::new`]
    /// * `DbError::Unreachable` - the service cannot be reached
    /// * `DbError::Unauthorized` - the key was rejected
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let manager = Self::new(config)?;
        manager.ping().await?;
        info!("Successfully connected to Supabase.");
        Ok(manager)
    }

    /// Liveness check against the REST root
    pub async fn ping(&self) -> Result<(), DbError> {
        let response = self
            .http_client
            .get(format!("{}/", self.rest_url))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    error!("Failed to connect: network unreachable ({})", e);
                    DbError::Unreachable(e)
                } else {
                    error!("Unexpected Supabase connection error: {}", e);
                    DbError::Transport(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let err = api_error(response).await;
            error!("Supabase API error (check your key): {}", err);
            return Err(DbError::Unauthorized {
                status: status.as_u16(),
                message: err.message,
            });
        }
        if !status.is_success() {
            let err = api_error(response).await;
            error!("Unexpected Supabase liveness response: {}", err);
            return Err(DbError::Api(err));
        }
        Ok(())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DbError> {
        let response = request.send().await.map_err(DbError::Transport)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(DbError::Api(api_error(response).await))
        }
    }

    async fn rows(response: Response) -> Result<Vec<Row>, DbError> {
        response.json::<Vec<Row>>().await.map_err(DbError::Transport)
    }
}

/// Renders a value as a PostgREST equality filter
pub fn eq_filter(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{s}"),
        other => format!("eq.{other}"),
    }
}

fn filters(conditions: &Conditions) -> Vec<(String, String)> {
    conditions
        .iter()
        .map(|(field, value)| (field.to_string(), eq_filter(value)))
        .collect()
}

/// Total count from a `Content-Range` header such as `0-9/42` or `*/0`
pub fn parse_content_range(header: Option<&str>) -> Option<u64> {
    header?.rsplit('/').next()?.trim().parse().ok()
}

async fn api_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let mut err = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| ApiError {
        message: body,
        ..ApiError::default()
    });
    err.status = status;
    err
}

#[async_trait]
impl DatabaseManager for SupabaseManager {
    #[instrument(skip_all, fields(table = %table))]
    async fn select_one(
        &self,
        table: &str,
        conditions: &Conditions,
    ) -> Result<Option<Row>, DbError> {
        let request = self
            .http_client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(&filters(conditions))
            .header(ACCEPT, SINGLE_OBJECT);

        match self.send(request).await {
            Ok(response) => {
                let row = response.json::<Row>().await.map_err(DbError::Transport)?;
                Ok(Some(row))
            }
            Err(DbError::Api(err)) if err.is_no_rows() => {
                debug!("No row in {} matching {:?}", table, conditions);
                Ok(None)
            }
            Err(err) => {
                error!(
                    "Error executing select_one on table {} with conditions {:?}: {}",
                    table, conditions, err
                );
                Err(err)
            }
        }
    }

    #[instrument(skip_all, fields(table = %table))]
    async fn select_many(
        &self,
        table: &str,
        conditions: &Conditions,
        options: &SelectOptions,
    ) -> Result<(Vec<Row>, u64), DbError> {
        let mut request = self
            .http_client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(&filters(conditions))
            .header("Prefer", "count=exact");

        if let Some(field) = &options.sort_by {
            request = request.query(&[("order", format!("{}.{}", field, options.direction))]);
        }
        if let Some(range) = options.range {
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", range.start, range.end));
        }

        let response = self.send(request).await?;
        let total = parse_content_range(
            response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|h| h.to_str().ok()),
        );
        let rows = Self::rows(response).await?;
        let count = total.unwrap_or(rows.len() as u64);
        debug!("Fetched {} of {} rows", rows.len(), count);
        Ok((rows, count))
    }

    #[instrument(skip_all, fields(table = %table))]
    async fn insert(&self, table: &str, data: &Value) -> Result<Row, DbError> {
        let body = require_object(table, data)?;

        let request = self
            .http_client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(DbError::Api(err)) if err.is_unique_violation() => {
                let err = DbError::duplicate_key(err.details.as_deref());
                error!("insert(): {}", err);
                return Err(err);
            }
            Err(err) => {
                error!("Error inserting into {}: {}", table, err);
                return Err(err);
            }
        };

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                error!("Result of insert into {} is empty", table);
                DbError::EmptyResult {
                    table: table.to_string(),
                    operation: "insert",
                }
            })
    }

    #[instrument(skip_all, fields(table = %table, id = %id))]
    async fn update(&self, table: &str, id: &Value, data: &Value) -> Result<Row, DbError> {
        let body = require_object(table, data)?;

        let request = self
            .http_client
            .patch(self.table_url(table))
            .query(&[("id", eq_filter(id))])
            .header("Prefer", "return=representation")
            .json(body);

        let response = self.send(request).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::EmptyResult {
                table: table.to_string(),
                operation: "update",
            })
    }

    #[instrument(skip_all, fields(table = %table, id = %id))]
    async fn delete(&self, table: &str, id: &Value) -> Result<bool, DbError> {
        let request = self
            .http_client
            .delete(self.table_url(table))
            .query(&[("id", eq_filter(id))]);

        self.send(request).await?;
        Ok(true)
    }

    #[instrument(skip_all, fields(table = %table, field = %field))]
    async fn exists(&self, table: &str, field: &str, value: &Value) -> Result<bool, DbError> {
        let request = self
            .http_client
            .get(self.table_url(table))
            .query(&[
                ("select", "id".to_string()),
                (field, eq_filter(value)),
                ("limit", "1".to_string()),
            ])
            .header("Prefer", "count=exact");

        match self.send(request).await {
            Ok(response) => {
                let total = parse_content_range(
                    response
                        .headers()
                        .get(CONTENT_RANGE)
                        .and_then(|h| h.to_str().ok()),
                );
                let count = match total {
                    Some(count) => count,
                    None => Self::rows(response).await?.len() as u64,
                };
                Ok(count > 0)
            }
            Err(DbError::Api(err)) if err.is_no_rows() => Ok(false),
            Err(err) => {
                error!("exists(): {}", err);
                Err(err)
            }
        }
    }
}
