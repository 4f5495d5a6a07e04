//! Seed - caricamento amministrativo di prodotti e parametri
//!
//! ```bash
//! seed --products data/products.json --parameters data/parameters.json
//! seed --products data/products.json --update-existing
//! ```
//!
//! Each file holds a JSON array of records without `id` and timestamps.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storefront::core::{Config, init_tracing};
use storefront::db::{Conditions, RetryPolicy, RetryingManager, SelectOptions, SupabaseManager};
use storefront::dtos::{CreateParameterDTO, CreateProductDTO, UpdateParameterDTO};
use storefront::repositories::{ParameterRepository, ProductRepository};
use tracing::{info, warn};
use validator::Validate;

/// Loads products and parameters into the database
#[derive(Parser, Debug)]
#[command(name = "seed", about = "Load products and parameters into the database")]
struct Args {
    /// JSON array of products
    #[arg(long)]
    products: Option<PathBuf>,

    /// JSON array of parameters
    #[arg(long)]
    parameters: Option<PathBuf>,

    /// Overwrite records that already exist instead of skipping them
    #[arg(long)]
    update_existing: bool,
}

#[derive(Debug, Default)]
struct Summary {
    inserted: usize,
    updated: usize,
    skipped: usize,
}

impl Summary {
    fn log(&self, what: &str, path: &Path) {
        info!(
            inserted = self.inserted,
            updated = self.updated,
            skipped = self.skipped,
            "{} seeded from {}",
            what,
            path.display()
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::from_env()?;
    init_tracing(&config);

    if args.products.is_none() && args.parameters.is_none() {
        warn!("Nothing to seed: pass --products and/or --parameters");
        return Ok(());
    }

    let supabase = SupabaseManager::connect(&config.database).await?;
    let manager = Arc::new(RetryingManager::new(supabase, RetryPolicy::default()));

    if let Some(path) = &args.products {
        let records: Vec<CreateProductDTO> = read_records(path).await?;
        let summary =
            seed_products(&ProductRepository::new(manager.clone()), records, args.update_existing)
                .await?;
        summary.log("Products", path);
    }

    if let Some(path) = &args.parameters {
        let records: Vec<CreateParameterDTO> = read_records(path).await?;
        let summary =
            seed_parameters(&ParameterRepository::new(manager), records, args.update_existing)
                .await?;
        summary.log("Parameters", path);
    }

    Ok(())
}

async fn read_records<T>(path: &Path) -> Result<Vec<T>, Box<dyn std::error::Error>>
where
    T: serde::de::DeserializeOwned + Validate,
{
    let text = tokio::fs::read_to_string(path).await?;
    let records: Vec<T> = serde_json::from_str(&text)?;
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|e| format!("{} record #{}: {}", path.display(), index, e))?;
    }
    Ok(records)
}

/// Products are matched on `slug`
async fn seed_products(
    repo: &ProductRepository,
    records: Vec<CreateProductDTO>,
    update_existing: bool,
) -> Result<Summary, Box<dyn std::error::Error>> {
    let mut summary = Summary::default();
    for record in records {
        let by_slug = Conditions::new().eq("slug", record.slug.as_str());
        let (existing, _) = repo.select_many(&by_slug, &SelectOptions::new()).await?;
        if existing.is_empty() {
            repo.insert(&record).await?;
            summary.inserted += 1;
        } else if update_existing {
            for product in &existing {
                repo.update(product.id, &record).await?;
            }
            summary.updated += 1;
        } else {
            info!("Product '{}' already present, skipped", record.slug);
            summary.skipped += 1;
        }
    }
    Ok(summary)
}

/// Parameters are matched on (`key`, `environment`)
async fn seed_parameters(
    repo: &ParameterRepository,
    records: Vec<CreateParameterDTO>,
    update_existing: bool,
) -> Result<Summary, Box<dyn std::error::Error>> {
    let mut summary = Summary::default();
    for record in records {
        let conditions = Conditions::new()
            .eq("key", record.key.as_str())
            .eq("environment", record.environment.as_str());
        // (key, environment) is not unique in the table: every copy is a match
        let (existing, _) = repo.select_many(&conditions, &SelectOptions::new()).await?;
        if existing.is_empty() {
            repo.insert(&record).await?;
            summary.inserted += 1;
        } else if update_existing {
            let change = UpdateParameterDTO {
                value: record.value.clone(),
            };
            for parameter in &existing {
                repo.update(parameter.id, &change).await?;
            }
            summary.updated += 1;
        } else {
            info!(
                "Parameter '{}' ({}) already present, skipped",
                record.key, record.environment
            );
            summary.skipped += 1;
        }
    }
    Ok(summary)
}
