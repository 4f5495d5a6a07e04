//! Integration tests per i repository generici
//!
//! Test per:
//! - Repository<Product> / Repository<Parameter> sopra MemoryManager
//! - errori propagati invariati (chiave duplicata, payload non valido)
//! - retry con backoff tramite RetryingManager

mod common;

#[cfg(test)]
mod repository_tests {
    use super::common::*;
    use serde_json::json;
    use storefront::db::{Conditions, DbError, SelectOptions, SortDirection};
    use storefront::dtos::{CreateParameterDTO, CreateProductDTO, UpdateParameterDTO};
    use storefront::repositories::{ParameterRepository, ProductRepository};

    fn product_dto(slug: &str) -> CreateProductDTO {
        CreateProductDTO {
            title: "Demo".into(),
            description: "A demo product".into(),
            order_link: "https://forms.example.org/demo".into(),
            image_path: "/images/demo.webp".into(),
            icon: "fa-gavel".into(),
            slug: slug.into(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_select_one() {
        let repo = ProductRepository::new(memory_manager());

        let created = repo.insert(&product_dto("demo")).await.unwrap();
        assert!(created.id > 0);
        assert!(created.updated_at.is_none());

        let found = repo
            .select_one(&Conditions::new().eq("slug", "demo"))
            .await
            .unwrap()
            .expect("product should exist");
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_select_one_absent_is_none() {
        let repo = ProductRepository::new(memory_manager());

        let found = repo
            .select_one(&Conditions::new().eq("slug", "none"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_reported() {
        let repo = ProductRepository::new(memory_manager());
        repo.insert(&product_dto("demo")).await.unwrap();

        let err = repo.insert(&product_dto("demo")).await.unwrap_err();
        match err {
            DbError::DuplicateKey {
                column,
                value,
                message,
            } => {
                assert_eq!(column.as_deref(), Some("slug"));
                assert_eq!(value.as_deref(), Some("demo"));
                assert_eq!(message, "Duplicate key detected. Key: slug, Value: demo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_string_payload_is_rejected() {
        let manager = memory_manager();
        let repo = ProductRepository::new(manager.clone());

        let err = repo
            .insert(&json!({"title": "Demo"}).to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidPayload(_)));
        assert!(manager.is_empty("products"));
    }

    #[tokio::test]
    async fn test_select_many_count_sort_and_range() {
        let manager = memory_manager();
        seed_products(&manager).await;
        let repo = ProductRepository::new(manager);

        let options = SelectOptions::new()
            .sort_by("id", SortDirection::from("DESC"))
            .range(Some(0), Some(1));
        let (products, total) = repo.select_many(&Conditions::new(), &options).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);

        // un solo estremo: nessuna paginazione
        let options = SelectOptions::new().range(Some(1), None);
        let (products, total) = repo.select_many(&Conditions::new(), &options).await.unwrap();
        assert_eq!((products.len(), total), (3, 3));

        let filtered = Conditions::new().eq("slug", "small-claims");
        let (products, total) = repo
            .select_many(&filtered, &SelectOptions::new())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(products[0].title, "Small Claims");
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let manager = memory_manager();
        seed_products(&manager).await;
        let repo = ProductRepository::new(manager.clone());

        assert!(repo.exists("slug", "court-filing").await.unwrap());
        assert!(repo.exists("icon", "fa-gavel").await.unwrap());
        assert!(!repo.exists("slug", "missing").await.unwrap());

        assert!(repo.delete(2).await.unwrap());
        assert!(!repo.exists("slug", "court-filing").await.unwrap());
        assert_eq!(manager.len("products"), 2);

        // cancellare un id assente non è un errore
        assert!(repo.delete(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_parameter_update() {
        let repo = ParameterRepository::new(memory_manager());
        let created = repo
            .insert(&CreateParameterDTO {
                key: "contact_email".into(),
                value: "info@example.org".into(),
                environment: "production".into(),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &UpdateParameterDTO {
                    value: "help@example.org".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.value, "help@example.org");
        assert_eq!(updated.environment, "production");
        assert!(updated.updated_at.is_some());

        let err = repo
            .update(42, &UpdateParameterDTO { value: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::EmptyResult { operation: "update", .. }));
    }
}

#[cfg(test)]
mod retry_tests {
    use super::common::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use storefront::db::{
        ApiError, Conditions, DatabaseManager, DbError, MemoryManager, RetryPolicy,
        RetryingManager, Row, SelectOptions,
    };
    use storefront::dtos::UpdateParameterDTO;
    use storefront::repositories::{ParameterRepository, ProductRepository};
    use tokio::time::Instant;

    /// Backend che fallisce le prime `failures` letture e modifiche con un errore transitorio
    struct FlakyManager {
        inner: Arc<MemoryManager>,
        failures: usize,
        calls: Arc<AtomicUsize>,
    }

    impl FlakyManager {
        fn fail_first(&self) -> Result<(), DbError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(DbError::Api(ApiError::new(503, "PGRST000", "database busy")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DatabaseManager for FlakyManager {
        async fn select_one(
            &self,
            table: &str,
            conditions: &Conditions,
        ) -> Result<Option<Row>, DbError> {
            self.fail_first()?;
            self.inner.select_one(table, conditions).await
        }

        async fn select_many(
            &self,
            table: &str,
            conditions: &Conditions,
            options: &SelectOptions,
        ) -> Result<(Vec<Row>, u64), DbError> {
            self.fail_first()?;
            self.inner.select_many(table, conditions, options).await
        }

        async fn insert(&self, table: &str, data: &Value) -> Result<Row, DbError> {
            self.inner.insert(table, data).await
        }

        async fn update(&self, table: &str, id: &Value, data: &Value) -> Result<Row, DbError> {
            self.fail_first()?;
            self.inner.update(table, id, data).await
        }

        async fn delete(&self, table: &str, id: &Value) -> Result<bool, DbError> {
            self.inner.delete(table, id).await
        }

        async fn exists(&self, table: &str, field: &str, value: &Value) -> Result<bool, DbError> {
            self.inner.exists(table, field, value).await
        }
    }

    /// Backend con retry sopra un FlakyManager, con la politica di default
    fn flaky(
        inner: Arc<MemoryManager>,
        failures: usize,
    ) -> (Arc<RetryingManager<FlakyManager>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let flaky = FlakyManager {
            inner,
            failures,
            calls: calls.clone(),
        };
        let manager = RetryingManager::new(flaky, RetryPolicy::default());
        (Arc::new(manager), calls)
    }

    fn retrying(inner: Arc<MemoryManager>, failures: usize) -> (ProductRepository, Arc<AtomicUsize>) {
        let (manager, calls) = flaky(inner, failures);
        (ProductRepository::new(manager), calls)
    }

    /// Memoria con un parametro (id 1) già presente
    async fn with_parameter() -> Arc<MemoryManager> {
        let memory = memory_manager();
        memory
            .insert(
                "parameters",
                &serde_json::json!({"key": "maintenance", "value": "off", "environment": "production"}),
            )
            .await
            .unwrap();
        memory
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let memory = memory_manager();
        seed_products(&memory).await;
        let (repo, calls) = retrying(memory, 2);

        let start = Instant::now();
        let (products, total) = repo
            .select_many(&Conditions::new(), &SelectOptions::new())
            .await
            .unwrap();

        assert_eq!(total, 3);
        assert_eq!(products.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2 s dopo il primo errore, 4 s dopo il secondo
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_failure_is_reraised() {
        let (repo, calls) = retrying(memory_manager(), usize::MAX);

        let err = repo
            .select_one(&Conditions::new().eq("slug", "demo"))
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert!(matches!(&err, DbError::Api(api) if api.message == "database busy"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_succeeds_after_two_transient_failures() {
        let memory = with_parameter().await;
        let (manager, calls) = flaky(memory, 2);
        let repo = ParameterRepository::new(manager);

        let start = Instant::now();
        let updated = repo
            .update(1, &UpdateParameterDTO { value: "on".into() })
            .await
            .unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.value, "on");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_failing_three_times_is_reraised() {
        let memory = with_parameter().await;
        let (manager, calls) = flaky(memory.clone(), usize::MAX);
        let repo = ParameterRepository::new(manager);

        let start = Instant::now();
        let err = repo
            .update(1, &UpdateParameterDTO { value: "on".into() })
            .await
            .unwrap_err();

        assert!(matches!(&err, DbError::Api(api) if api.code.as_deref() == Some("PGRST000")));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(6));

        // la riga non è stata toccata
        let row = memory
            .select_one("parameters", &Conditions::new().eq("id", 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row["value"], "off");
    }
}
