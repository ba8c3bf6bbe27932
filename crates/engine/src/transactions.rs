//! Ledger entries.
//!
//! A `Transaction` records one debt or payment against a debtor. The amount
//! is always an unsigned magnitude; the direction comes from the debtor's
//! [`Role`](crate::Role) at read time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Increases what is owed.
    Debt,
    /// Reduces what is owed.
    Payment,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debt => "debt",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Polarity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debt" => Ok(Self::Debt),
            "payment" => Ok(Self::Payment),
            other => Err(EngineError::InvalidName(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub debtor_id: String,
    pub date: DateTime<Utc>,
    /// Free-text note.
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub polarity: Polarity,
}

impl Transaction {
    /// Build a validated entry with a fresh id.
    ///
    /// Rejects zero, negative and non-finite amounts, and notes that are
    /// blank after trimming.
    pub fn new(
        debtor_id: String,
        polarity: Polarity,
        amount: f64,
        note: &str,
        date: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let amount = util::ensure_positive(amount, "amount")?;
        let description = util::normalize_required_text(note, "note")?;
        Ok(Self {
            id: util::new_id("trans"),
            debtor_id,
            date,
            description,
            amount,
            polarity,
        })
    }
}
