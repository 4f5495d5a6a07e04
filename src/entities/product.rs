//! Product entity - Entità prodotto del catalogo

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product as stored in the `products` table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Title header for the product card
    pub title: String,
    /// Markdown description
    pub description: String,
    /// URL of the order form
    pub order_link: String,
    /// Path or URL of the card background image
    pub image_path: String,
    /// Font Awesome code of the product icon
    pub icon: String,
    pub slug: String,
}

impl Product {
    /// Date of the last change, falling back to the creation date
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}
