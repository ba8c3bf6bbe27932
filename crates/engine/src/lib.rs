pub use balance::{SettlementProgress, reduce_balance};
pub use business::{BusinessProfile, DEFAULT_BUSINESS_NAME};
pub use debtors::{Debtor, Role};
pub use error::EngineError;
pub use invoices::{Invoice, InvoiceDraft, InvoiceItem};
pub use ledger::{DebtTotals, DebtorSummary, SubjectView, summarize};
pub use money::{Amount, format_amount};
pub use ops::{Engine, EngineBuilder};
pub use products::{Product, ProductInput};
pub use reports::{
    DailySales, InventorySummary, LedgerActivity, ProductSales, Report, ReportInput, ReportPeriod,
    SalesSummary, StockValue, Window, build_report,
};
pub use statement::{balance_label, statement_csv, statement_text};
pub use storage::{
    BUSINESS_NAME_KEY, BUSINESS_PHONE_KEY, DEBTORS_KEY, INVOICES_KEY, KNOWN_KEYS, LoadFailure,
    PRODUCTS_KEY, TRANSACTIONS_KEY,
};
pub use transactions::{Polarity, Transaction};

mod balance;
mod business;
mod debtors;
mod error;
mod invoices;
mod kv;
mod ledger;
mod money;
mod ops;
mod products;
mod reports;
mod statement;
mod storage;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
