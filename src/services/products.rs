//! Product services - Catalogo prodotti

use crate::core::{AppError, AppState};
use crate::db::{Conditions, SelectOptions, SortDirection};
use crate::entities::Product;
use axum::extract::{Json, Path, State};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// All products ordered by `id` ascending
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, AppError> {
    debug!("Listing products");
    let options = SelectOptions::new().sort_by("id", SortDirection::Asc);
    let (products, total) = state
        .products
        .select_many(&Conditions::new(), &options)
        .await?;
    info!("Returning {} of {} products", products.len(), total);
    Ok(Json(products))
}

#[instrument(skip(state), fields(slug = %slug))]
pub async fn get_product_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>, // parametro dalla URL /api/products/{slug}
) -> Result<Json<Product>, AppError> {
    debug!("Fetching product by slug");
    let conditions = Conditions::new().eq("slug", slug.as_str());
    match state.products.select_one(&conditions).await? {
        Some(product) => Ok(Json(product)),
        None => {
            warn!("Product not found");
            Err(AppError::not_found(format!(
                "Product with slug '{slug}' not found"
            )))
        }
    }
}
