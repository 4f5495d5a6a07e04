//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Un solo repository generico, [`Repository<T>`], parametrizzato sul tipo di record.
//! Ogni repository concreto fissa soltanto la tabella e il tipo (vedi [`Record`]).
//!
//! ```text
//! Repository<Product>  ──▶  dyn DatabaseManager  ──▶  RetryingManager<SupabaseManager>
//! ```

pub mod base;
pub mod parameter;
pub mod product;
pub mod traits;

pub use base::Repository;
pub use parameter::ParameterRepository;
pub use product::ProductRepository;
pub use traits::Record;
