//! Load boundary between stored JSON and typed records.
//!
//! Stored documents are untrusted: they may come from older versions, from a
//! restored backup or from hand edits. Every tolerance for bad data lives in
//! this module so the rest of the engine only ever sees valid records:
//!
//! - text that is not JSON, or a collection that is not an array, is treated
//!   as absent and the key is removed;
//! - records that cannot be attributed (missing id, unknown type) are
//!   skipped;
//! - non-numeric amounts are read as `0`, unparseable dates as the Unix
//!   epoch.

use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    Debtor, Invoice, InvoiceItem, Polarity, Product, ResultEngine, Role, Transaction, kv,
};

pub const DEBTORS_KEY: &str = "debtors";
pub const TRANSACTIONS_KEY: &str = "debtTransactions";
pub const PRODUCTS_KEY: &str = "inventoryProducts";
pub const INVOICES_KEY: &str = "salesInvoices";
pub const BUSINESS_NAME_KEY: &str = "businessName";
pub const BUSINESS_PHONE_KEY: &str = "businessPhone";

/// Every key that belongs to the application, in backup order.
pub const KNOWN_KEYS: [&str; 6] = [
    PRODUCTS_KEY,
    INVOICES_KEY,
    DEBTORS_KEY,
    TRANSACTIONS_KEY,
    BUSINESS_NAME_KEY,
    BUSINESS_PHONE_KEY,
];

/// Why a stored collection was discarded as a whole.
#[derive(Debug, Error, PartialEq)]
pub enum LoadFailure {
    #[error("not valid JSON: {0}")]
    InvalidJson(String),
    #[error("expected a JSON array")]
    NotAnArray,
}

/// A record kind stored as a JSON array under a fixed key.
pub(crate) trait Document: Serialize + Sized {
    const KEY: &'static str;

    /// Decode one array element, or explain why it must be skipped.
    fn decode(value: Value) -> Result<Self, String>;
}

/// Parse a stored collection; bad elements are skipped with a warning.
pub(crate) fn parse_collection<T: Document>(raw: &str) -> Result<Vec<T>, LoadFailure> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| LoadFailure::InvalidJson(err.to_string()))?;
    let Value::Array(elements) = value else {
        return Err(LoadFailure::NotAnArray);
    };

    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match T::decode(element) {
            Ok(item) => items.push(item),
            Err(reason) => {
                tracing::warn!(key = T::KEY, index, %reason, "skipping invalid stored record");
            }
        }
    }
    Ok(items)
}

/// Load a whole collection. Absent or corrupted documents give an empty
/// collection; a corrupted document is also removed from the store.
pub(crate) async fn load_collection<T: Document, C: ConnectionTrait>(
    conn: &C,
) -> ResultEngine<Vec<T>> {
    let Some(raw) = kv::load(conn, T::KEY).await? else {
        return Ok(Vec::new());
    };
    match parse_collection::<T>(&raw) {
        Ok(items) => Ok(items),
        Err(reason) => {
            tracing::warn!(key = T::KEY, %reason, "discarding corrupted collection");
            kv::remove(conn, T::KEY).await?;
            Ok(Vec::new())
        }
    }
}

/// Replace a whole collection.
pub(crate) async fn replace_collection<T: Document, C: ConnectionTrait>(
    conn: &C,
    items: &[T],
) -> ResultEngine<()> {
    let payload = serde_json::to_string(items)?;
    kv::save(conn, T::KEY, payload).await?;
    tracing::debug!(key = T::KEY, count = items.len(), "collection replaced");
    Ok(())
}

/// Load a single JSON value; a corrupted one is removed and reads as absent.
pub(crate) async fn load_value<T: DeserializeOwned, C: ConnectionTrait>(
    conn: &C,
    key: &str,
) -> ResultEngine<Option<T>> {
    let Some(raw) = kv::load(conn, key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, %err, "discarding corrupted value");
            kv::remove(conn, key).await?;
            Ok(None)
        }
    }
}

pub(crate) async fn save_value<T: Serialize + ?Sized, C: ConnectionTrait>(
    conn: &C,
    key: &str,
    value: &T,
) -> ResultEngine<()> {
    kv::save(conn, key, serde_json::to_string(value)?).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Element decoding
// ─────────────────────────────────────────────────────────────────────────────

fn required_string(value: Option<String>, field: &str) -> Result<String, String> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("missing {field}"))
}

/// Numbers pass through; anything else (strings, null, objects) reads as 0.
fn coerce_number(value: &Value, key: &str, field: &str) -> f64 {
    match value.as_f64() {
        Some(number) if number.is_finite() => number,
        _ => {
            tracing::warn!(key, field, raw = %value, "non-numeric value read as 0");
            0.0
        }
    }
}

/// Ledger amounts are unsigned magnitudes; zero, negatives and non-numbers
/// read as 0 so a stored sign can never flip an entry's polarity.
fn coerce_magnitude(value: &Value, key: &str, field: &str) -> f64 {
    let number = coerce_number(value, key, field);
    if number < 0.0 {
        tracing::warn!(key, field, raw = %value, "negative amount read as 0");
        return 0.0;
    }
    number
}

fn coerce_date(value: Option<&str>, key: &str) -> DateTime<Utc> {
    match value.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok()) {
        Some(date) => date.with_timezone(&Utc),
        None => {
            tracing::warn!(key, raw = ?value, "unparseable date read as epoch");
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

#[derive(Deserialize)]
struct RawDebtor {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    role: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl Document for Debtor {
    const KEY: &'static str = DEBTORS_KEY;

    fn decode(value: Value) -> Result<Self, String> {
        let raw: RawDebtor = serde_json::from_value(value).map_err(|err| err.to_string())?;
        let role = raw
            .role
            .as_deref()
            .ok_or_else(|| "missing type".to_string())
            .and_then(|r| Role::try_from(r).map_err(|err| err.to_string()))?;
        Ok(Debtor {
            id: required_string(raw.id, "id")?,
            name: required_string(raw.name, "name")?.trim().to_string(),
            role,
            phone: crate::util::normalize_optional_text(raw.phone.as_deref()),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    debtor_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    amount: Value,
    #[serde(default, rename = "type")]
    polarity: Option<String>,
}

impl Document for Transaction {
    const KEY: &'static str = TRANSACTIONS_KEY;

    fn decode(value: Value) -> Result<Self, String> {
        let raw: RawTransaction = serde_json::from_value(value).map_err(|err| err.to_string())?;
        let polarity = raw
            .polarity
            .as_deref()
            .ok_or_else(|| "missing type".to_string())
            .and_then(|p| Polarity::try_from(p).map_err(|err| err.to_string()))?;
        Ok(Transaction {
            id: required_string(raw.id, "id")?,
            debtor_id: required_string(raw.debtor_id, "debtorId")?,
            date: coerce_date(raw.date.as_deref(), Self::KEY),
            description: raw.description.unwrap_or_default(),
            amount: coerce_magnitude(&raw.amount, Self::KEY, "amount"),
            polarity,
        })
    }
}

#[derive(Deserialize)]
struct RawProduct {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    barcode: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    price: Value,
}

impl RawProduct {
    fn into_product(self, key: &str) -> Result<Product, String> {
        let id = required_string(self.id, "id")?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Product ({id})"));
        Ok(Product {
            barcode: self.barcode.unwrap_or_default(),
            name,
            quantity: coerce_number(&self.quantity, key, "quantity"),
            price: coerce_number(&self.price, key, "price"),
            id,
        })
    }
}

impl Document for Product {
    const KEY: &'static str = PRODUCTS_KEY;

    fn decode(value: Value) -> Result<Self, String> {
        let raw: RawProduct = serde_json::from_value(value).map_err(|err| err.to_string())?;
        raw.into_product(Self::KEY)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInvoiceItem {
    #[serde(flatten)]
    product: RawProduct,
    #[serde(default)]
    sale_quantity: Value,
    #[serde(default)]
    sale_price: Value,
}

#[derive(Deserialize)]
struct RawInvoice {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    total: Value,
}

impl Document for Invoice {
    const KEY: &'static str = INVOICES_KEY;

    fn decode(value: Value) -> Result<Self, String> {
        let raw: RawInvoice = serde_json::from_value(value).map_err(|err| err.to_string())?;
        let id = required_string(raw.id, "id")?;

        let mut items = Vec::with_capacity(raw.items.len());
        for element in raw.items {
            let decoded = serde_json::from_value::<RawInvoiceItem>(element)
                .map_err(|err| err.to_string())
                .and_then(|item| {
                    let sale_quantity = coerce_number(&item.sale_quantity, Self::KEY, "saleQuantity");
                    let sale_price = coerce_number(&item.sale_price, Self::KEY, "salePrice");
                    let product = item.product.into_product(Self::KEY)?;
                    Ok(InvoiceItem {
                        id: product.id,
                        barcode: product.barcode,
                        name: product.name,
                        quantity: product.quantity,
                        price: product.price,
                        sale_quantity,
                        sale_price,
                    })
                });
            match decoded {
                Ok(item) => items.push(item),
                Err(reason) => {
                    tracing::warn!(key = Self::KEY, invoice = %id, %reason, "skipping invalid invoice line");
                }
            }
        }

        Ok(Invoice {
            date: coerce_date(raw.date.as_deref(), Self::KEY),
            total: coerce_number(&raw.total, Self::KEY, "total"),
            items,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn corrupted_text_and_non_arrays_are_rejected_whole() {
        assert!(matches!(
            parse_collection::<Debtor>("{not json"),
            Err(LoadFailure::InvalidJson(_))
        ));
        assert_eq!(
            parse_collection::<Debtor>("{\"a\": 1}"),
            Err(LoadFailure::NotAnArray)
        );
    }

    #[test]
    fn non_numeric_amounts_read_as_zero() {
        let raw = json!([
            {"id": "t1", "debtorId": "d1", "date": "2026-01-02T10:00:00.000Z",
             "description": "ok", "amount": 12.5, "type": "debt"},
            {"id": "t2", "debtorId": "d1", "date": "2026-01-02T11:00:00.000Z",
             "description": "bad", "amount": "twelve", "type": "payment"}
        ])
        .to_string();
        let log = parse_collection::<Transaction>(&raw).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].amount, 12.5);
        assert_eq!(log[1].amount, 0.0);
    }

    #[test]
    fn negative_and_missing_amounts_read_as_zero() {
        let raw = json!([
            {"id": "t1", "debtorId": "d1", "date": "2026-01-02T10:00:00Z", "amount": -50, "type": "debt"},
            {"id": "t2", "debtorId": "d1", "date": "2026-01-02T10:00:00Z", "amount": null, "type": "debt"},
            {"id": "t3", "debtorId": "d1", "date": "2026-01-02T10:00:00Z", "amount": {}, "type": "payment"},
            {"id": "t4", "debtorId": "d1", "date": "2026-01-02T10:00:00Z", "type": "payment"}
        ])
        .to_string();
        let log = parse_collection::<Transaction>(&raw).unwrap();
        assert_eq!(log.len(), 4);
        assert!(log.iter().all(|tx| tx.amount == 0.0));
        assert_eq!(crate::reduce_balance(Role::Customer, &log), 0.0);
    }

    #[test]
    fn unattributable_records_are_skipped() {
        let raw = json!([
            {"id": "t1", "date": "2026-01-02T10:00:00Z", "amount": 1, "type": "debt"},
            {"id": "t2", "debtorId": "d1", "amount": 1, "type": "refund"},
            {"id": "t3", "debtorId": "d1", "date": "yesterday", "amount": 2, "type": "payment"}
        ])
        .to_string();
        let log = parse_collection::<Transaction>(&raw).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, "t3");
        assert_eq!(log[0].date, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn legacy_debtor_balance_is_ignored() {
        let raw = json!([
            {"id": "debtor-1", "name": " Ali ", "type": "customer", "balance": 999, "phone": ""},
            {"id": "debtor-2", "name": "Bad", "type": "partner"}
        ])
        .to_string();
        let debtors = parse_collection::<Debtor>(&raw).unwrap();
        assert_eq!(debtors.len(), 1);
        assert_eq!(debtors[0].name, "Ali");
        assert_eq!(debtors[0].phone, None);
        assert_eq!(
            serde_json::to_value(&debtors[0]).unwrap(),
            json!({"id": "debtor-1", "name": "Ali", "type": "customer"})
        );
    }

    #[test]
    fn invoices_tolerate_bad_lines_and_totals() {
        let raw = json!([{
            "id": "INV-1",
            "date": "2026-02-01T08:30:00.000Z",
            "total": "n/a",
            "items": [
                {"id": "p1", "barcode": "111", "name": "Tea", "quantity": 4, "price": 1,
                 "saleQuantity": 2, "salePrice": 1.5},
                {"barcode": "no id"}
            ]
        }])
        .to_string();
        let invoices = parse_collection::<Invoice>(&raw).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].total, 0.0);
        assert_eq!(invoices[0].items.len(), 1);
        assert_eq!(invoices[0].items[0].sale_price, 1.5);
        assert_eq!(invoices[0].items_sold(), 2.0);
    }
}
