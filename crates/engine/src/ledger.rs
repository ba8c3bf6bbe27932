//! Per-debtor views over the full transaction log.
//!
//! Balances are recomputed from the log on every call and never stored.

use serde::Serialize;

use crate::{
    Debtor, Role, SettlementProgress, Transaction, balance::reduce_balance, util::matches_search,
};

/// A debtor together with its entries, balance and settlement progress.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub debtor: Debtor,
    pub balance: f64,
    /// Most recent first; entries sharing a timestamp keep log order.
    pub transactions: Vec<Transaction>,
    pub progress: SettlementProgress,
}

impl SubjectView {
    pub fn build(debtor: Debtor, log: &[Transaction]) -> Self {
        let mut transactions: Vec<Transaction> = log
            .iter()
            .filter(|tx| tx.debtor_id == debtor.id)
            .cloned()
            .collect();
        // `sort_by` is stable.
        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        let balance = reduce_balance(debtor.role, &transactions);
        let progress = SettlementProgress::from_entries(debtor.role, &transactions, balance);

        Self {
            debtor,
            balance,
            transactions,
            progress,
        }
    }
}

/// A debtor with its current balance, as shown in listings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtorSummary {
    pub debtor: Debtor,
    pub balance: f64,
}

/// Balances for every debtor matching `search` (name or phone, case
/// insensitive), in stored order.
pub fn summarize(debtors: &[Debtor], log: &[Transaction], search: Option<&str>) -> Vec<DebtorSummary> {
    debtors
        .iter()
        .filter(|d| matches_search(search, &[Some(d.name.as_str()), d.phone.as_deref()]))
        .map(|debtor| DebtorSummary {
            balance: reduce_balance(
                debtor.role,
                log.iter().filter(|tx| tx.debtor_id == debtor.id),
            ),
            debtor: debtor.clone(),
        })
        .collect()
}

/// Money owed to and by the business across all debtors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtTotals {
    /// Sum of positive customer balances.
    pub receivables: f64,
    /// Sum of the absolute values of negative supplier balances.
    pub payables: f64,
    /// `receivables - payables`; positive is in the business' favour.
    pub net_position: f64,
}

impl DebtTotals {
    pub fn from_summaries(summaries: &[DebtorSummary]) -> Self {
        let receivables: f64 = summaries
            .iter()
            .filter(|s| s.debtor.role == Role::Customer && s.balance > 0.0)
            .map(|s| s.balance)
            .sum();
        let payables: f64 = summaries
            .iter()
            .filter(|s| s.debtor.role == Role::Supplier && s.balance < 0.0)
            .map(|s| s.balance.abs())
            .sum();
        Self {
            receivables,
            payables,
            net_position: receivables - payables,
        }
    }
}
