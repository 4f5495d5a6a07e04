//! ProductRepository - Repository per la gestione dei prodotti

use super::base::Repository;
use super::traits::Record;
use crate::entities::Product;

impl Record for Product {
    const TABLE: &'static str = "products";
}

pub type ProductRepository = Repository<Product>;
