//! Sales invoices and the in-memory draft used to assemble them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Product, ResultEngine, util};

/// One invoice line: the product as it was when sold plus the sale terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub barcode: String,
    pub name: String,
    /// Stock level at the time the line was added.
    pub quantity: f64,
    /// Base price from the inventory.
    pub price: f64,
    pub sale_quantity: f64,
    pub sale_price: f64,
}

impl InvoiceItem {
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.sale_price * self.sale_quantity
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
    pub total: f64,
}

impl Invoice {
    #[must_use]
    pub fn items_sold(&self) -> f64 {
        self.items.iter().map(|item| item.sale_quantity).sum()
    }
}

/// An invoice being assembled.
///
/// Lines for the same product at the same sale price are merged; the same
/// product at a different price gets its own line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvoiceDraft {
    items: Vec<InvoiceItem>,
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(InvoiceItem::line_total).sum()
    }

    /// Quantity of `product_id` already on the draft, across all prices.
    fn reserved(&self, product_id: &str) -> f64 {
        self.items
            .iter()
            .filter(|item| item.id == product_id)
            .map(|item| item.sale_quantity)
            .sum()
    }

    /// Add `quantity` units of `product` sold at `sale_price` each.
    ///
    /// The quantity already on the draft for this product counts against the
    /// available stock.
    pub fn add_item(&mut self, product: &Product, quantity: f64, sale_price: f64) -> ResultEngine<()> {
        let quantity = util::ensure_positive(quantity, "sale quantity")?;
        let sale_price = util::ensure_non_negative(sale_price, "sale price")?;

        let requested = self.reserved(&product.id) + quantity;
        if requested > product.quantity {
            return Err(EngineError::InsufficientStock(format!(
                "requested {requested} of '{}', available {}",
                product.name, product.quantity
            )));
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.id == product.id && item.sale_price == sale_price)
        {
            item.sale_quantity += quantity;
            return Ok(());
        }

        self.items.push(InvoiceItem {
            id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            quantity: product.quantity,
            price: product.price,
            sale_quantity: quantity,
            sale_price,
        });
        Ok(())
    }

    /// Remove the first line for `product_id` at `sale_price`.
    ///
    /// Returns `false` when no such line exists.
    pub fn remove_item(&mut self, product_id: &str, sale_price: f64) -> bool {
        match self
            .items
            .iter()
            .position(|item| item.id == product_id && item.sale_price == sale_price)
        {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Turn the draft into an invoice with a fresh id.
    pub(crate) fn into_invoice(self, date: DateTime<Utc>) -> ResultEngine<Invoice> {
        if self.items.is_empty() {
            return Err(EngineError::EmptyInvoice);
        }
        let total = self.total();
        Ok(Invoice {
            id: util::new_id("INV"),
            date,
            items: self.items,
            total,
        })
    }
}
