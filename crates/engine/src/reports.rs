//! Aggregate reports over sales, stock and the debt ledger.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::{
    DebtTotals, Debtor, EngineError, Invoice, Polarity, Product, Transaction, ledger,
};

const TOP_PRODUCTS: usize = 5;
const TOP_STOCK_VALUES: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// From the first day of the current month through today.
    #[default]
    ThisMonth,
    /// The whole previous calendar month.
    LastMonth,
    AllTime,
}

impl ReportPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::AllTime => "all_time",
        }
    }

    /// Half-open `[start, end)` window in UTC; month boundaries are taken in
    /// `tz`.
    pub fn window(self, now: DateTime<Utc>, tz: Tz) -> Window {
        let today = now.with_timezone(&tz).date_naive();
        let month_start = today.with_day(1).unwrap_or(today);
        match self {
            Self::ThisMonth => Window {
                start: Some(local_midnight(tz, month_start)),
                end: Some(local_midnight(tz, today + Days::new(1))),
            },
            Self::LastMonth => {
                let previous = month_start
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(month_start);
                Window {
                    start: Some(local_midnight(tz, previous)),
                    end: Some(local_midnight(tz, month_start)),
                }
            }
            Self::AllTime => Window::default(),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "this_month" => Ok(Self::ThisMonth),
            "last_month" => Ok(Self::LastMonth),
            "all_time" | "all" => Ok(Self::AllTime),
            other => Err(EngineError::InvalidName(format!(
                "invalid report period: {other}"
            ))),
        }
    }
}

/// First instant of `date` in `tz`, in UTC. A midnight that falls in a DST
/// gap is read as UTC midnight.
fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at < end)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub invoice_count: usize,
    pub total_value: f64,
    pub items_sold: f64,
    pub average_invoice_value: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_items: f64,
    pub total_value: f64,
}

/// Ledger entries recorded inside the report window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerActivity {
    pub entry_count: usize,
    pub debt_total: f64,
    pub payment_total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub quantity: f64,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StockValue {
    pub name: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub period: ReportPeriod,
    pub window: Window,
    pub sales: SalesSummary,
    pub inventory: InventorySummary,
    /// Balances as of now, regardless of the window.
    pub debts: DebtTotals,
    pub ledger_activity: LedgerActivity,
    /// Ascending by local date.
    pub sales_by_day: Vec<DailySales>,
    /// Best sellers by sold value, at most five.
    pub top_products: Vec<ProductSales>,
    /// Products by stock value, at most ten, zero values left out.
    pub stock_values: Vec<StockValue>,
}

/// Everything a report is computed from.
pub struct ReportInput<'a> {
    pub products: &'a [Product],
    pub invoices: &'a [Invoice],
    pub debtors: &'a [Debtor],
    pub log: &'a [Transaction],
}

pub fn build_report(
    period: ReportPeriod,
    now: DateTime<Utc>,
    tz: Tz,
    input: &ReportInput<'_>,
) -> Report {
    let window = period.window(now, tz);
    let sales: Vec<&Invoice> = input
        .invoices
        .iter()
        .filter(|invoice| window.contains(invoice.date))
        .collect();

    Report {
        period,
        window,
        sales: sales_summary(&sales),
        inventory: inventory_summary(input.products),
        debts: DebtTotals::from_summaries(&ledger::summarize(input.debtors, input.log, None)),
        ledger_activity: ledger_activity(input.log, &window),
        sales_by_day: sales_by_day(&sales, tz),
        top_products: top_products(&sales),
        stock_values: stock_values(input.products),
    }
}

fn sales_summary(sales: &[&Invoice]) -> SalesSummary {
    let total_value: f64 = sales.iter().map(|invoice| invoice.total).sum();
    let items_sold: f64 = sales.iter().map(|invoice| invoice.items_sold()).sum();
    let average_invoice_value = if sales.is_empty() {
        0.0
    } else {
        total_value / sales.len() as f64
    };
    SalesSummary {
        invoice_count: sales.len(),
        total_value,
        items_sold,
        average_invoice_value,
    }
}

fn inventory_summary(products: &[Product]) -> InventorySummary {
    InventorySummary {
        product_count: products.len(),
        total_items: products.iter().map(|p| p.quantity).sum(),
        total_value: products.iter().map(Product::value).sum(),
    }
}

fn ledger_activity(log: &[Transaction], window: &Window) -> LedgerActivity {
    log.iter()
        .filter(|tx| window.contains(tx.date))
        .fold(LedgerActivity::default(), |mut acc, tx| {
            acc.entry_count += 1;
            match tx.polarity {
                Polarity::Debt => acc.debt_total += tx.amount,
                Polarity::Payment => acc.payment_total += tx.amount,
            }
            acc
        })
}

fn sales_by_day(sales: &[&Invoice], tz: Tz) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for invoice in sales {
        let day = invoice.date.with_timezone(&tz).date_naive();
        *days.entry(day).or_default() += invoice.total;
    }
    days.into_iter()
        .map(|(date, total)| DailySales { date, total })
        .collect()
}

fn top_products(sales: &[&Invoice]) -> Vec<ProductSales> {
    let mut by_product: Vec<ProductSales> = Vec::new();
    for item in sales.iter().flat_map(|invoice| invoice.items.iter()) {
        match by_product.iter_mut().find(|p| p.product_id == item.id) {
            Some(entry) => {
                entry.quantity += item.sale_quantity;
                entry.value += item.line_total();
            }
            None => by_product.push(ProductSales {
                product_id: item.id.clone(),
                name: item.name.clone(),
                quantity: item.sale_quantity,
                value: item.line_total(),
            }),
        }
    }
    by_product.sort_by(|a, b| b.value.total_cmp(&a.value));
    by_product.truncate(TOP_PRODUCTS);
    by_product
}

fn stock_values(products: &[Product]) -> Vec<StockValue> {
    let mut values: Vec<StockValue> = products
        .iter()
        .map(|p| StockValue {
            name: p.name.clone(),
            value: p.value(),
        })
        .filter(|s| s.value > 0.0)
        .collect();
    values.sort_by(|a, b| b.value.total_cmp(&a.value));
    values.truncate(TOP_STOCK_VALUES);
    values
}
