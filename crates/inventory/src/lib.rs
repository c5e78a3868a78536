//! Inventory, recipe and reservation records.
//!
//! These are owned by the document store; the metrics pipeline only reads
//! them. The defaults applied here (lead time, safety stock, order floor) are
//! the ones the restock engine relies on.

pub mod item;
pub mod recipe;
pub mod reservation;

pub use item::{DEFAULT_LEAD_TIME_DAYS, InventoryItem};
pub use recipe::{Recipe, RecipeComponent};
pub use reservation::Reservation;
