use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{EngineError, Product, ProductInput, ResultEngine, storage, util};

use super::{Engine, with_tx};

fn ensure_unique_barcode(
    products: &[Product],
    barcode: &str,
    except_id: Option<&str>,
) -> ResultEngine<()> {
    let taken = products
        .iter()
        .filter(|p| Some(p.id.as_str()) != except_id)
        .any(|p| p.barcode == barcode);
    if taken {
        return Err(EngineError::ExistingKey(format!("barcode {barcode}")));
    }
    Ok(())
}

impl Engine {
    pub(super) async fn load_products<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> ResultEngine<Vec<Product>> {
        storage::load_collection::<Product, _>(conn).await
    }

    /// Add a product to the inventory.
    pub async fn add_product(&self, input: &ProductInput) -> ResultEngine<Product> {
        let input = input.validated()?;
        with_tx!(self, |db_tx| {
            let mut products = self.load_products(&db_tx).await?;
            ensure_unique_barcode(&products, &input.barcode, None)?;

            let product = Product {
                id: util::new_id("prod"),
                barcode: input.barcode,
                name: input.name,
                quantity: input.quantity,
                price: input.price,
            };
            products.push(product.clone());
            storage::replace_collection(&db_tx, &products).await?;
            tracing::info!(product_id = %product.id, barcode = %product.barcode, "product added");
            Ok(product)
        })
    }

    /// Replace every editable field of an existing product.
    pub async fn update_product(
        &self,
        product_id: &str,
        input: &ProductInput,
    ) -> ResultEngine<Product> {
        let input = input.validated()?;
        with_tx!(self, |db_tx| {
            let mut products = self.load_products(&db_tx).await?;
            ensure_unique_barcode(&products, &input.barcode, Some(product_id))?;

            let product = products
                .iter_mut()
                .find(|p| p.id == product_id)
                .ok_or_else(|| EngineError::KeyNotFound(format!("product {product_id}")))?;
            product.barcode = input.barcode;
            product.name = input.name;
            product.quantity = input.quantity;
            product.price = input.price;
            let updated = product.clone();

            storage::replace_collection(&db_tx, &products).await?;
            tracing::info!(product_id, "product updated");
            Ok(updated)
        })
    }

    pub async fn delete_product(&self, product_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let mut products = self.load_products(&db_tx).await?;
            let before = products.len();
            products.retain(|p| p.id != product_id);
            if products.len() == before {
                return Err(EngineError::KeyNotFound(format!("product {product_id}")));
            }
            storage::replace_collection(&db_tx, &products).await?;
            tracing::info!(product_id, "product deleted");
            Ok(())
        })
    }

    /// Products whose name or barcode contains `search`, in stored order.
    pub async fn list_products(&self, search: Option<&str>) -> ResultEngine<Vec<Product>> {
        let products = with_tx!(self, |db_tx| self.load_products(&db_tx).await)?;
        Ok(products
            .into_iter()
            .filter(|p| {
                util::matches_search(search, &[Some(p.name.as_str()), Some(p.barcode.as_str())])
            })
            .collect())
    }

    pub async fn product(&self, product_id: &str) -> ResultEngine<Product> {
        self.list_products(None)
            .await?
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("product {product_id}")))
    }

    /// Exact barcode lookup, as done by a scanner.
    pub async fn product_by_barcode(&self, barcode: &str) -> ResultEngine<Product> {
        let barcode = barcode.trim();
        self.list_products(None)
            .await?
            .into_iter()
            .find(|p| p.barcode == barcode)
            .ok_or_else(|| EngineError::KeyNotFound(format!("barcode {barcode}")))
    }

    /// Total stock value: sum of `quantity * price`.
    pub async fn inventory_value(&self) -> ResultEngine<f64> {
        Ok(self.list_products(None).await?.iter().map(Product::value).sum())
    }
}
