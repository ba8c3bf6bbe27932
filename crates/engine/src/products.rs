//! Inventory products.

use serde::{Deserialize, Serialize};

use crate::{ResultEngine, util};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub barcode: String,
    pub name: String,
    /// Units in stock; never negative.
    pub quantity: f64,
    /// Base (purchase) price per unit.
    pub price: f64,
}

impl Product {
    /// Stock value of this product.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }
}

/// User-provided fields for creating or editing a product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductInput {
    pub barcode: String,
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

impl ProductInput {
    /// Trims text fields and checks numeric bounds.
    pub(crate) fn validated(&self) -> ResultEngine<ProductInput> {
        Ok(ProductInput {
            barcode: util::normalize_required_text(&self.barcode, "barcode")?,
            name: util::normalize_required_text(&self.name, "product name")?,
            quantity: util::ensure_non_negative(self.quantity, "quantity")?,
            price: util::ensure_non_negative(self.price, "price")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    #[test]
    fn validated_trims_and_rejects_negative_values() {
        let input = ProductInput {
            barcode: " 123 ".to_string(),
            name: " Rice ".to_string(),
            quantity: 4.0,
            price: 2.5,
        };
        let clean = input.validated().unwrap();
        assert_eq!(clean.barcode, "123");
        assert_eq!(clean.name, "Rice");

        let bad = ProductInput {
            quantity: -1.0,
            ..input.clone()
        };
        assert_eq!(
            bad.validated().unwrap_err(),
            EngineError::InvalidAmount("quantity must be >= 0".to_string())
        );

        let blank = ProductInput {
            name: "  ".to_string(),
            ..input
        };
        assert_eq!(
            blank.validated().unwrap_err(),
            EngineError::InvalidName("product name must not be empty".to_string())
        );
    }
}
