use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cafeops_core::{DomainError, DomainResult};
use cafeops_forecast::{CatalogError, InventoryCatalog};
use cafeops_inventory::{InventoryItem, Recipe, Reservation};

use super::store::{InMemoryStore, KeyValueStore};

/// Initial catalog content, typically loaded from a JSON file at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

/// Inventory items (by SKU), recipes (by menu item) and reservations (by id).
#[derive(Debug, Default)]
pub struct CafeCatalog {
    items: InMemoryStore<String, InventoryItem>,
    recipes: InMemoryStore<String, Recipe>,
    reservations: InMemoryStore<String, Reservation>,
}

impl CafeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalid items and recipes are logged and skipped.
    pub fn from_seed(seed: CatalogSeed) -> Self {
        let catalog = Self::new();
        let mut skipped = 0usize;
        for item in seed.inventory {
            if let Err(e) = catalog.upsert_item(item) {
                warn!(error = %e, "skipping seeded inventory item");
                skipped += 1;
            }
        }
        for recipe in seed.recipes {
            if let Err(e) = catalog.upsert_recipe(recipe) {
                warn!(error = %e, "skipping seeded recipe");
                skipped += 1;
            }
        }
        for reservation in seed.reservations {
            catalog.upsert_reservation(reservation);
        }
        info!(
            items = catalog.items.list().len(),
            recipes = catalog.recipes.list().len(),
            reservations = catalog.reservations.list().len(),
            skipped,
            "catalog seeded"
        );
        catalog
    }

    pub fn upsert_item(&self, item: InventoryItem) -> DomainResult<()> {
        item.validate()?;
        self.items.upsert(item.sku.clone(), item);
        Ok(())
    }

    pub fn remove_item(&self, sku: &str) -> DomainResult<InventoryItem> {
        self.items
            .remove(&sku.to_string())
            .ok_or_else(|| DomainError::not_found(format!("inventory item {sku}")))
    }

    pub fn upsert_recipe(&self, recipe: Recipe) -> DomainResult<()> {
        recipe.validate()?;
        self.recipes.upsert(recipe.menu_item_id.clone(), recipe);
        Ok(())
    }

    pub fn upsert_reservation(&self, reservation: Reservation) {
        self.reservations.upsert(reservation.id.clone(), reservation);
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.recipes.list()
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.reservations.list()
    }
}

impl InventoryCatalog for CafeCatalog {
    fn find_by_sku(&self, sku: &str) -> Result<Option<InventoryItem>, CatalogError> {
        Ok(self.items.get(&sku.to_string()))
    }

    fn list_items(&self) -> Result<Vec<InventoryItem>, CatalogError> {
        Ok(self.items.list())
    }
}

#[cfg(test)]
mod tests {
    use cafeops_inventory::RecipeComponent;

    use super::*;

    #[test]
    fn seed_parses_camel_case_json() {
        let seed: CatalogSeed = serde_json::from_str(
            r#"{
                "inventory": [
                    {"id": "i1", "sku": "MILK", "quantity": 10, "reorderThreshold": 5, "leadTimeDays": 2}
                ],
                "recipes": [
                    {"menuItemId": "latte", "components": [{"sku": "MILK", "unitsPerItem": 0.25}]}
                ]
            }"#,
        )
        .unwrap();

        let catalog = CafeCatalog::from_seed(seed);
        let milk = catalog.find_by_sku("MILK").unwrap().unwrap();
        assert_eq!(milk.lead_time_days, Some(2));
        assert_eq!(catalog.recipes().len(), 1);
        assert!(catalog.reservations().is_empty());
    }

    #[test]
    fn items_are_keyed_by_sku() {
        let catalog = CafeCatalog::new();
        catalog.upsert_item(InventoryItem::new("i1", "BEANS", 4, 2)).unwrap();
        catalog.upsert_item(InventoryItem::new("i1", "BEANS", 9, 2)).unwrap();
        catalog
            .upsert_recipe(Recipe::new("mocha", vec![RecipeComponent::new("BEANS", 0.02)]))
            .unwrap();

        assert_eq!(catalog.list_items().unwrap().len(), 1);
        assert_eq!(catalog.find_by_sku("BEANS").unwrap().map(|i| i.quantity), Some(9));
        assert_eq!(catalog.find_by_sku("SUGAR").unwrap(), None);
        assert!(catalog.remove_item("BEANS").is_ok());
        assert!(catalog.list_items().unwrap().is_empty());
        assert!(matches!(catalog.remove_item("BEANS"), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn invalid_records_are_rejected() {
        let catalog = CafeCatalog::new();
        assert!(catalog.upsert_item(InventoryItem::new("i1", "", 4, 2)).is_err());
        assert!(catalog.list_items().unwrap().is_empty());

        let seed = CatalogSeed {
            inventory: vec![InventoryItem::new("i1", "MILK", 4, 2), InventoryItem::new("i2", "CUPS", -1, 2)],
            ..CatalogSeed::default()
        };
        assert_eq!(CafeCatalog::from_seed(seed).list_items().unwrap().len(), 1);
    }
}
