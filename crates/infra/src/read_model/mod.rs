//! Read-side storage for the records the metrics pipeline consumes:
//! inventory items, recipes and reservations.

pub mod catalog;
pub mod store;

pub use catalog::{CafeCatalog, CatalogSeed};
pub use store::{InMemoryStore, KeyValueStore};
