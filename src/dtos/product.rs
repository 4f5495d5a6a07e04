//! Product DTOs - Data Transfer Objects per prodotti

use crate::entities::Product;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Lowercase words separated by single dashes, e.g. `divorce-petition`
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex");
}

/// DTO per creare un nuovo prodotto (senza id e timestamp)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct CreateProductDTO {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub description: String,
    pub order_link: String,
    pub image_path: String,
    pub icon: String,
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lowercase letters, digits and single dashes"))]
    pub slug: String,
}

impl From<Product> for CreateProductDTO {
    fn from(value: Product) -> Self {
        Self {
            title: value.title,
            description: value.description,
            order_link: value.order_link,
            image_path: value.image_path,
            icon: value.icon,
            slug: value.slug,
        }
    }
}
