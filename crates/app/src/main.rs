use std::error::Error;

use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use engine::{Engine, InvoiceDraft, ProductInput, SubjectView, balance_label, format_amount};
use migration::{Migrator, MigratorTrait};
use settings::Database;

use cli::{
    BusinessCommand, Cli, Command, DebtorCommand, LedgerCommand, ProductArgs, ProductCommand,
    SaleCommand,
};

mod cli;
mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "easy_inventory={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", settings.app.timezone))?;
    let db = parse_database(&settings.database).await?;
    let engine = Engine::builder()
        .database(db)
        .timezone(timezone)
        .build()
        .await?;

    run(&engine, cli.command).await
}

async fn parse_database(config: &Database) -> AppResult<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };
    tracing::debug!(%url, "opening database");

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn product_input(args: ProductArgs) -> ProductInput {
    ProductInput {
        barcode: args.barcode,
        name: args.name,
        quantity: args.quantity.value(),
        price: args.price.value(),
    }
}

fn print_view(view: &SubjectView, tz: Tz) {
    let debtor = &view.debtor;
    println!("{} ({}) {}", debtor.name, debtor.role, debtor.id);
    if let Some(phone) = &debtor.phone {
        println!("phone: {phone}");
    }
    println!("{}", balance_label(debtor.role, view.balance));
    println!(
        "debt {} / paid {} ({:.0}%){}",
        format_amount(view.progress.total_debt),
        format_amount(view.progress.total_payments),
        view.progress.progress_percent,
        if view.progress.is_settled { ", settled" } else { "" }
    );
    for tx in &view.transactions {
        println!(
            "  {}  {:<7}  {:>10}  {}",
            tx.date.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
            tx.polarity.as_str(),
            format_amount(tx.amount),
            tx.description
        );
    }
}

async fn run(engine: &Engine, command: Command) -> AppResult<()> {
    match command {
        Command::Debtor(debtor) => match debtor.command {
            DebtorCommand::Add(args) => {
                let debtor = engine
                    .add_debtor(&args.name, args.role, args.phone.as_deref())
                    .await?;
                println!("created {}: {} ({})", debtor.role, debtor.name, debtor.id);
            }
            DebtorCommand::Import(args) => {
                let debtor = engine
                    .import_contact(&args.name, args.phone.as_deref(), args.role)
                    .await?;
                println!("imported {}: {} ({})", debtor.role, debtor.name, debtor.id);
            }
            DebtorCommand::List { search } => {
                let summaries = engine.list_debtors(search.as_deref()).await?;
                for summary in &summaries {
                    println!(
                        "{}  {:<8}  {:<24}  {}",
                        summary.debtor.id,
                        summary.debtor.role.as_str(),
                        summary.debtor.name,
                        balance_label(summary.debtor.role, summary.balance)
                    );
                }
                let totals = engine.debt_totals().await?;
                println!(
                    "receivables {}  payables {}  net {}",
                    format_amount(totals.receivables),
                    format_amount(totals.payables),
                    format_amount(totals.net_position)
                );
            }
            DebtorCommand::Show { debtor_id } => {
                let view = engine.subject_view(&debtor_id).await?;
                print_view(&view, engine.timezone());
            }
            DebtorCommand::Statement { debtor_id } => {
                println!("{}", engine.statement_text(&debtor_id).await?);
            }
            DebtorCommand::Export { debtor_id, output } => {
                let csv = engine.statement_csv(&debtor_id).await?;
                match output {
                    Some(path) => {
                        tokio::fs::write(&path, csv).await?;
                        println!("written {}", path.display());
                    }
                    None => print!("{csv}"),
                }
            }
        },
        Command::Ledger(ledger) => match ledger.command {
            LedgerCommand::Record(args) => {
                let view = engine
                    .record_transaction(
                        &args.debtor_id,
                        args.polarity,
                        args.amount.value(),
                        &args.note,
                        args.date,
                    )
                    .await?;
                print_view(&view, engine.timezone());
            }
        },
        Command::Product(product) => match product.command {
            ProductCommand::Add(args) => {
                let product = engine.add_product(&product_input(args)).await?;
                println!("created product {} ({})", product.name, product.id);
            }
            ProductCommand::Update { product_id, fields } => {
                let product = engine
                    .update_product(&product_id, &product_input(fields))
                    .await?;
                println!("updated product {} ({})", product.name, product.id);
            }
            ProductCommand::Delete { product_id } => {
                engine.delete_product(&product_id).await?;
                println!("deleted product {product_id}");
            }
            ProductCommand::List { search } => {
                for product in engine.list_products(search.as_deref()).await? {
                    println!(
                        "{}  {:<14}  {:<24}  qty {:>8}  price {:>10}",
                        product.id,
                        product.barcode,
                        product.name,
                        product.quantity,
                        format_amount(product.price)
                    );
                }
                println!(
                    "inventory value {}",
                    format_amount(engine.inventory_value().await?)
                );
            }
        },
        Command::Sale(sale) => match sale.command {
            SaleCommand::Create { items } => {
                let mut draft = InvoiceDraft::new();
                for item in items {
                    let product = engine.product_by_barcode(&item.barcode).await?;
                    let price = item.price.unwrap_or(product.price);
                    draft.add_item(&product, item.quantity, price)?;
                }
                let invoice = engine.finalize_invoice(draft, Utc::now()).await?;
                for line in &invoice.items {
                    println!(
                        "  {:<24} {} x {} = {}",
                        line.name,
                        line.sale_quantity,
                        format_amount(line.sale_price),
                        format_amount(line.line_total())
                    );
                }
                println!("invoice {} total {}", invoice.id, format_amount(invoice.total));
            }
            SaleCommand::List => {
                for invoice in engine.list_invoices().await? {
                    println!(
                        "{}  {}  items {}  total {}",
                        invoice.id,
                        invoice
                            .date
                            .with_timezone(&engine.timezone())
                            .format("%Y-%m-%d %H:%M"),
                        invoice.items_sold(),
                        format_amount(invoice.total)
                    );
                }
            }
        },
        Command::Report(args) => {
            let report = engine.report(args.period, Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Backup(args) => {
            let backup = serde_json::to_string_pretty(&engine.backup().await?)?;
            match args.output {
                Some(path) => {
                    tokio::fs::write(&path, backup).await?;
                    println!("backup written to {}", path.display());
                }
                None => println!("{backup}"),
            }
        }
        Command::Restore(args) => {
            let document = tokio::fs::read_to_string(&args.input).await?;
            let restored = engine.restore(&document).await?;
            println!("restored {restored} keys");
        }
        Command::Business(business) => match business.command {
            BusinessCommand::Show => {
                let profile = engine.business_profile().await?;
                println!("{}", profile.name);
                if !profile.phone.is_empty() {
                    println!("{}", profile.phone);
                }
            }
            BusinessCommand::Set { name, phone } => {
                let profile = engine
                    .set_business_profile(&name, phone.as_deref())
                    .await?;
                println!("business name set to {}", profile.name);
            }
        },
    }
    Ok(())
}
