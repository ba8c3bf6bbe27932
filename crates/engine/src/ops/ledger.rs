use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{
    Debtor, EngineError, Polarity, ResultEngine, SubjectView, Transaction, storage,
};

use super::{Engine, with_tx};

impl Engine {
    /// Look up a debtor by id.
    pub(super) async fn require_debtor<C: ConnectionTrait>(
        &self,
        conn: &C,
        debtor_id: &str,
    ) -> ResultEngine<Debtor> {
        storage::load_collection::<Debtor, _>(conn)
            .await?
            .into_iter()
            .find(|d| d.id == debtor_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("debtor {debtor_id}")))
    }

    pub(super) async fn load_subject_view<C: ConnectionTrait>(
        &self,
        conn: &C,
        debtor_id: &str,
    ) -> ResultEngine<SubjectView> {
        let debtor = self.require_debtor(conn, debtor_id).await?;
        let log = storage::load_collection::<Transaction, _>(conn).await?;
        Ok(SubjectView::build(debtor, &log))
    }

    /// Balance, entries and settlement progress of one debtor.
    pub async fn subject_view(&self, debtor_id: &str) -> ResultEngine<SubjectView> {
        with_tx!(self, |db_tx| self.load_subject_view(&db_tx, debtor_id).await)
    }

    /// Append a ledger entry for `debtor_id` and return the updated view.
    ///
    /// Nothing is written when the amount is not strictly positive, the note
    /// is blank or the debtor does not exist. `at` defaults to now.
    pub async fn record_transaction(
        &self,
        debtor_id: &str,
        polarity: Polarity,
        amount: f64,
        note: &str,
        at: Option<DateTime<Utc>>,
    ) -> ResultEngine<SubjectView> {
        let tx = Transaction::new(
            debtor_id.to_string(),
            polarity,
            amount,
            note,
            at.unwrap_or_else(Utc::now),
        )?;
        with_tx!(self, |db_tx| {
            let debtor = self.require_debtor(&db_tx, debtor_id).await?;

            let mut log = storage::load_collection::<Transaction, _>(&db_tx).await?;
            let (transaction_id, amount) = (tx.id.clone(), tx.amount);
            log.push(tx);
            storage::replace_collection(&db_tx, &log).await?;
            tracing::info!(
                debtor_id,
                %transaction_id,
                %polarity,
                amount,
                "ledger entry recorded"
            );

            Ok(SubjectView::build(debtor, &log))
        })
    }
}
