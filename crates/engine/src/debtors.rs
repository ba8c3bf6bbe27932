//! Customers and suppliers tracked in the debt ledger.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, transactions::Polarity};

/// Which side of the business a debtor sits on.
///
/// The role decides how a ledger entry moves the balance:
///
/// | role       | `debt` | `payment` |
/// |------------|--------|-----------|
/// | `customer` | `+m`   | `-m`      |
/// | `supplier` | `-m`   | `+m`      |
///
/// A positive balance is in the business' favour (the customer owes us, or
/// the supplier was overpaid); a negative balance is owed by the business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Supplier,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
        }
    }

    /// Signed contribution of one entry of magnitude `amount` to the balance.
    #[must_use]
    pub fn signed(self, polarity: Polarity, amount: f64) -> f64 {
        match (self, polarity) {
            (Self::Customer, Polarity::Debt) | (Self::Supplier, Polarity::Payment) => amount,
            (Self::Customer, Polarity::Payment) | (Self::Supplier, Polarity::Debt) => -amount,
        }
    }

    /// Settlement boundary: a zero balance is settled for both roles.
    #[must_use]
    pub fn is_settled(self, balance: f64) -> bool {
        match self {
            Self::Customer => balance <= 0.0,
            Self::Supplier => balance >= 0.0,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "supplier" => Ok(Self::Supplier),
            other => Err(EngineError::InvalidName(format!("invalid debtor type: {other}"))),
        }
    }
}

/// A customer or supplier.
///
/// The balance is intentionally absent: it is derived from the ledger on
/// every read (see [`crate::ledger`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debtor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
