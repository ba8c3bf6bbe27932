use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;

use crate::{Invoice, InvoiceDraft, ResultEngine, storage};

use super::{Engine, with_tx};

impl Engine {
    /// Save a draft as an invoice and take the sold units out of stock.
    ///
    /// Stock never goes below zero. The invoice and the stock change are
    /// written together or not at all.
    pub async fn finalize_invoice(
        &self,
        draft: InvoiceDraft,
        at: DateTime<Utc>,
    ) -> ResultEngine<Invoice> {
        let invoice = draft.into_invoice(at)?;

        let mut sold: HashMap<String, f64> = HashMap::new();
        for item in &invoice.items {
            *sold.entry(item.id.clone()).or_default() += item.sale_quantity;
        }

        with_tx!(self, |db_tx| {
            let mut products = self.load_products(&db_tx).await?;
            for (product_id, quantity) in &sold {
                match products.iter_mut().find(|p| p.id == *product_id) {
                    Some(product) => product.quantity = (product.quantity - quantity).max(0.0),
                    None => {
                        tracing::warn!(%product_id, "sold product no longer in inventory");
                    }
                }
            }

            let mut invoices = storage::load_collection::<Invoice, _>(&db_tx).await?;
            invoices.insert(0, invoice.clone());

            storage::replace_collection(&db_tx, &products).await?;
            storage::replace_collection(&db_tx, &invoices).await?;
            tracing::info!(
                invoice_id = %invoice.id,
                lines = invoice.items.len(),
                total = invoice.total,
                "invoice finalized"
            );
            Ok(invoice)
        })
    }

    /// Stored invoices, newest first.
    pub async fn list_invoices(&self) -> ResultEngine<Vec<Invoice>> {
        with_tx!(self, |db_tx| storage::load_collection::<Invoice, _>(&db_tx).await)
    }
}
