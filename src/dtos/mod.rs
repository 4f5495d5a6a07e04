//! DTOs module - Data Transfer Objects
//!
//! Viste di creazione delle entità: solo i campi forniti dall'applicazione,
//! senza `id` e timestamp che sono assegnati dal database.

pub mod parameter;
pub mod product;

pub use parameter::{CreateParameterDTO, UpdateParameterDTO};
pub use product::{CreateProductDTO, SLUG_REGEX};
