use std::{path::PathBuf, str::FromStr};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{Amount, Polarity, ReportPeriod, Role};

#[derive(Parser, Debug)]
#[command(name = "easy_inventory")]
#[command(about = "Inventory, sales and customer/supplier debts for a small shop")]
pub struct Cli {
    /// Settings file, without extension.
    #[arg(long, env = "EASY_INVENTORY_CONFIG", default_value = "settings")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Debtor(Debtor),
    Ledger(Ledger),
    Product(Product),
    Sale(Sale),
    /// Sales, stock and debt figures for a period.
    Report(ReportArgs),
    /// Write every stored key as one JSON document.
    Backup(BackupArgs),
    /// Load a backup document written by `backup`.
    Restore(RestoreArgs),
    Business(Business),
}

#[derive(Args, Debug)]
pub struct Debtor {
    #[command(subcommand)]
    pub command: DebtorCommand,
}

#[derive(Subcommand, Debug)]
pub enum DebtorCommand {
    Add(DebtorAddArgs),
    /// Add a debtor from a contact; the phone must not be known yet.
    Import(DebtorAddArgs),
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        debtor_id: String,
    },
    Statement {
        debtor_id: String,
    },
    /// Export the debtor's entries as CSV.
    Export {
        debtor_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct DebtorAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, value_parser = parse_role, default_value = "customer")]
    pub role: Role,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Args, Debug)]
pub struct Ledger {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    Record(RecordArgs),
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    pub debtor_id: String,
    #[arg(long = "type", value_parser = parse_polarity)]
    pub polarity: Polarity,
    #[arg(long)]
    pub amount: Amount,
    #[arg(long)]
    pub note: String,
    /// RFC 3339 instant; defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub struct Product {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    Add(ProductArgs),
    Update {
        product_id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete {
        product_id: String,
    },
    List {
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    #[arg(long)]
    pub barcode: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub quantity: Amount,
    #[arg(long)]
    pub price: Amount,
}

#[derive(Args, Debug)]
pub struct Sale {
    #[command(subcommand)]
    pub command: SaleCommand,
}

#[derive(Subcommand, Debug)]
pub enum SaleCommand {
    /// Sell one or more items, given as `BARCODE:QUANTITY[:PRICE]`.
    Create {
        #[arg(long = "item", required = true)]
        items: Vec<SaleItem>,
    },
    List,
}

/// One `--item` of `sale create`. Without a price the product's own price
/// is used.
#[derive(Clone, Debug)]
pub struct SaleItem {
    pub barcode: String,
    pub quantity: f64,
    pub price: Option<f64>,
}

impl FromStr for SaleItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let barcode = parts
            .next()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| format!("missing barcode in '{s}'"))?;
        let quantity = match parts.next() {
            Some(raw) => raw.parse::<Amount>().map_err(|err| err.to_string())?.value(),
            None => 1.0,
        };
        let price = parts
            .next()
            .map(|raw| raw.parse::<Amount>().map(Amount::value))
            .transpose()
            .map_err(|err| err.to_string())?;
        if parts.next().is_some() {
            return Err(format!("expected BARCODE:QUANTITY[:PRICE], got '{s}'"));
        }
        Ok(Self {
            barcode: barcode.to_string(),
            quantity,
            price,
        })
    }
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// `this-month`, `last-month` or `all-time`.
    #[arg(long, default_value = "this-month")]
    pub period: ReportPeriod,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Defaults to stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct Business {
    #[command(subcommand)]
    pub command: BusinessCommand,
}

#[derive(Subcommand, Debug)]
pub enum BusinessCommand {
    Show,
    Set {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

fn parse_polarity(raw: &str) -> Result<Polarity, String> {
    Polarity::try_from(raw).map_err(|err| err.to_string())
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|err| format!("invalid date '{raw}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_item_defaults_quantity_and_price() {
        let item: SaleItem = "6221".parse().unwrap();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.price, None);

        let item: SaleItem = "6221:2,5:4".parse().unwrap();
        assert_eq!(item.quantity, 2.5);
        assert_eq!(item.price, Some(4.0));

        assert!(":2".parse::<SaleItem>().is_err());
        assert!("1:2:3:4".parse::<SaleItem>().is_err());
    }

    #[test]
    fn parses_record_command() {
        let cli = Cli::try_parse_from([
            "easy_inventory",
            "ledger",
            "record",
            "debtor-1",
            "--type",
            "payment",
            "--amount",
            "12,50",
            "--note",
            "cash",
            "--date",
            "2026-03-01T10:00:00+02:00",
        ])
        .unwrap();
        let Command::Ledger(Ledger {
            command: LedgerCommand::Record(args),
        }) = cli.command
        else {
            panic!("expected ledger record");
        };
        assert_eq!(args.polarity, Polarity::Payment);
        assert_eq!(args.amount.value(), 12.5);
        assert_eq!(args.date.unwrap().to_rfc3339(), "2026-03-01T08:00:00+00:00");
    }
}
