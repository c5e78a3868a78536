use serde::{Deserialize, Serialize};

use cafeops_core::{DomainError, DomainResult};

/// One ingredient line of a menu item's recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeComponent {
    pub sku: String,
    pub units_per_item: f64,
    /// Fraction lost to waste (0.02 = 2%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wastage_rate: Option<f64>,
}

impl RecipeComponent {
    pub fn new(sku: impl Into<String>, units_per_item: f64) -> Self {
        Self {
            sku: sku.into(),
            units_per_item,
            wastage_rate: None,
        }
    }

    pub fn with_wastage_rate(mut self, rate: f64) -> Self {
        self.wastage_rate = Some(rate);
        self
    }

    /// Ingredient units consumed by `quantity` menu items.
    pub fn usage_for(&self, quantity: f64) -> f64 {
        quantity * self.units_per_item * (1.0 + self.wastage_rate.unwrap_or(0.0))
    }
}

/// Recipe for a menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub menu_item_id: String,
    pub components: Vec<RecipeComponent>,
}

impl Recipe {
    pub fn new(menu_item_id: impl Into<String>, components: Vec<RecipeComponent>) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            components,
        }
    }

    /// Every component needs a SKU and finite, non-negative amounts.
    pub fn validate(&self) -> DomainResult<()> {
        if self.menu_item_id.trim().is_empty() {
            return Err(DomainError::validation("menuItemId must not be blank"));
        }
        for c in &self.components {
            let wastage = c.wastage_rate.unwrap_or(0.0);
            if c.sku.trim().is_empty()
                || !c.units_per_item.is_finite()
                || c.units_per_item < 0.0
                || !wastage.is_finite()
                || wastage < 0.0
            {
                return Err(DomainError::validation(format!(
                    "{}: invalid component {:?}",
                    self.menu_item_id, c.sku
                )));
            }
        }
        Ok(())
    }
}
