use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;

use crate::{
    Debtor, Invoice, Report, ReportInput, ReportPeriod, ResultEngine, Transaction, build_report,
    storage,
};

use super::{Engine, with_tx};

impl Engine {
    /// Sales, stock and debt figures for `period`, with month boundaries in
    /// the engine timezone.
    pub async fn report(&self, period: ReportPeriod, now: DateTime<Utc>) -> ResultEngine<Report> {
        with_tx!(self, |db_tx| {
            let products = self.load_products(&db_tx).await?;
            let invoices = storage::load_collection::<Invoice, _>(&db_tx).await?;
            let debtors = storage::load_collection::<Debtor, _>(&db_tx).await?;
            let log = storage::load_collection::<Transaction, _>(&db_tx).await?;

            let input = ReportInput {
                products: &products,
                invoices: &invoices,
                debtors: &debtors,
                log: &log,
            };
            Ok(build_report(period, now, self.timezone, &input))
        })
    }
}
