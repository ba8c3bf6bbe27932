//! Pure balance reduction and settlement progress.
//!
//! Nothing here touches storage. Both functions are total: given any set of
//! entries they return a number, never an error.

use serde::Serialize;

use crate::{Role, Transaction, transactions::Polarity};

/// Signed balance of a debtor with the given role.
///
/// Order-independent: entries are summed, so any permutation of the same
/// entries gives the same result.
pub fn reduce_balance<'a, I>(role: Role, entries: I) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    entries
        .into_iter()
        .fold(0.0, |acc, tx| acc + role.signed(tx.polarity, tx.amount))
}

/// How far a debtor's recorded debt has been paid off.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementProgress {
    /// Sum of the magnitudes of `debt` entries.
    pub total_debt: f64,
    /// Sum of the magnitudes of `payment` entries.
    pub total_payments: f64,
    /// Always within `[0, 100]`.
    pub progress_percent: f64,
    pub is_settled: bool,
}

impl SettlementProgress {
    /// Totals the entries and derives the progress for the current balance.
    pub fn from_entries(role: Role, entries: &[Transaction], balance: f64) -> Self {
        let (total_debt, total_payments) =
            entries
                .iter()
                .fold((0.0, 0.0), |(debt, paid), tx| match tx.polarity {
                    Polarity::Debt => (debt + tx.amount, paid),
                    Polarity::Payment => (debt, paid + tx.amount),
                });
        Self::compute(role, total_debt, total_payments, entries.len(), balance)
    }

    /// Progress is measured against the total debt ever recorded, not the
    /// outstanding balance, so new debt lowers the percentage instead of
    /// resetting it.
    pub fn compute(
        role: Role,
        total_debt: f64,
        total_payments: f64,
        entry_count: usize,
        balance: f64,
    ) -> Self {
        let is_settled = role.is_settled(balance);
        if entry_count == 0 {
            return Self {
                total_debt,
                total_payments,
                progress_percent: 0.0,
                is_settled,
            };
        }

        let progress = if total_debt > 0.0 {
            total_payments * 100.0 / total_debt
        } else if total_payments > 0.0 {
            // Prepayment: money moved before any debt was recorded.
            100.0
        } else if is_settled {
            100.0
        } else {
            0.0
        };

        Self {
            total_debt,
            total_payments,
            progress_percent: clamp_percent(progress),
            is_settled,
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}
