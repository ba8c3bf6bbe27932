//! Account statements for a single debtor: shareable text and CSV.

use chrono_tz::Tz;
use serde::Serialize;

use crate::{BusinessProfile, EngineError, ResultEngine, Role, SubjectView, money::format_amount};

/// Entries listed in a text statement; older ones are elided.
const TEXT_STATEMENT_ENTRIES: usize = 10;
const RULE: &str = "--------------------";

/// Human wording for a balance, by role and sign.
pub fn balance_label(role: Role, balance: f64) -> String {
    let abs = format_amount(balance.abs());
    if balance == 0.0 {
        return "Balance: 0.00 (settled)".to_string();
    }
    match role {
        Role::Customer if balance > 0.0 => format!("Owes you: {abs}"),
        Role::Customer => format!("Credit in their favour: {abs}"),
        Role::Supplier if balance < 0.0 => format!("You owe: {abs}"),
        Role::Supplier => format!("Owes you: {abs}"),
    }
}

/// Plain-text statement suitable for messaging apps.
pub fn statement_text(view: &SubjectView, business: &BusinessProfile, tz: Tz) -> String {
    let mut out = String::new();
    let debtor = &view.debtor;

    if !business.name.is_empty() {
        out.push_str(&format!("{}\n", business.name));
    }
    if !business.phone.is_empty() {
        out.push_str(&format!("Phone: {}\n", business.phone));
    }
    out.push_str(&format!("{RULE}\n"));
    out.push_str(&format!("Account: {} ({})\n", debtor.name, debtor.role));
    out.push_str(&format!(
        "Debtor phone: {}\n",
        debtor.phone.as_deref().unwrap_or("n/a")
    ));
    out.push_str(&format!("{RULE}\n"));
    out.push_str(&format!(
        "Current balance: {}\n",
        balance_label(debtor.role, view.balance)
    ));
    out.push_str(&format!(
        "Total debt recorded: {}\n",
        format_amount(view.progress.total_debt)
    ));
    out.push_str(&format!(
        "Total payments recorded: {}\n",
        format_amount(view.progress.total_payments)
    ));
    out.push_str(&format!("{RULE}\n"));
    out.push_str("Latest entries:");
    for tx in view.transactions.iter().take(TEXT_STATEMENT_ENTRIES) {
        out.push_str(&format!(
            "\n- {}: {} ({}) - {}",
            tx.date.with_timezone(&tz).format("%y/%m/%d"),
            tx.description,
            tx.polarity,
            format_amount(tx.amount)
        ));
    }
    if view.transactions.len() > TEXT_STATEMENT_ENTRIES {
        out.push_str("\n...");
    }
    out
}

#[derive(Serialize)]
struct StatementRow<'a> {
    date: String,
    note: &'a str,
    #[serde(rename = "type")]
    polarity: &'a str,
    amount: String,
}

/// CSV with one row per entry, newest first.
pub fn statement_csv(view: &SubjectView, tz: Tz) -> ResultEngine<String> {
    let export_err = |err: csv::Error| EngineError::Export(err.to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    for tx in &view.transactions {
        writer
            .serialize(StatementRow {
                date: tx.date.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
                note: &tx.description,
                polarity: tx.polarity.as_str(),
                amount: format_amount(tx.amount),
            })
            .map_err(export_err)?;
    }
    if view.transactions.is_empty() {
        writer
            .write_record(["date", "note", "type", "amount"])
            .map_err(export_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| EngineError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| EngineError::Export(err.to_string()))
}
