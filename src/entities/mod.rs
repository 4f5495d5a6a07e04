//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene le entità che rappresentano le righe persistite nel database.
//! Ogni entity corrisponde a una tabella; `id` e timestamp sono assegnati dal database.

pub mod parameter;
pub mod product;

pub use parameter::Parameter;
pub use product::Product;
