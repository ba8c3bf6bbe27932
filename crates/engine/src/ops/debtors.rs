use sea_orm::TransactionTrait;

use crate::{
    DebtTotals, Debtor, DebtorSummary, EngineError, ResultEngine, Role, Transaction, ledger,
    storage, util,
};

use super::{Engine, with_tx};

/// Digits of a phone number, with a leading `+` kept.
fn phone_key(phone: &str) -> String {
    let trimmed = phone.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if trimmed.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}

fn ensure_unique_name(debtors: &[Debtor], name: &str) -> ResultEngine<()> {
    let key = util::normalize_key(name);
    if debtors.iter().any(|d| util::normalize_key(&d.name) == key) {
        return Err(EngineError::ExistingKey(name.to_string()));
    }
    Ok(())
}

fn ensure_unique_phone(debtors: &[Debtor], phone: &str) -> ResultEngine<()> {
    let key = phone_key(phone);
    if key.is_empty() {
        return Ok(());
    }
    let taken = debtors
        .iter()
        .filter_map(|d| d.phone.as_deref())
        .any(|p| phone_key(p) == key);
    if taken {
        return Err(EngineError::ExistingKey(phone.to_string()));
    }
    Ok(())
}

impl Engine {
    /// Create a customer or supplier.
    ///
    /// Names are compared ignoring case, accents and punctuation, so
    /// "José Pérez" and "jose perez" are the same debtor.
    pub async fn add_debtor(
        &self,
        name: &str,
        role: Role,
        phone: Option<&str>,
    ) -> ResultEngine<Debtor> {
        let name = util::normalize_required_text(name, "debtor name")?;
        let phone = util::normalize_optional_text(phone);
        with_tx!(self, |db_tx| {
            let mut debtors = storage::load_collection::<Debtor, _>(&db_tx).await?;
            ensure_unique_name(&debtors, &name)?;

            let debtor = Debtor {
                id: util::new_id("debtor"),
                name,
                role,
                phone,
            };
            debtors.push(debtor.clone());
            storage::replace_collection(&db_tx, &debtors).await?;
            tracing::info!(debtor_id = %debtor.id, %role, "debtor added");
            Ok(debtor)
        })
    }

    /// Create a debtor from an address-book contact.
    ///
    /// Besides the name check of [`Engine::add_debtor`], a contact whose
    /// phone number is already used by another debtor is rejected.
    pub async fn import_contact(
        &self,
        name: &str,
        phone: Option<&str>,
        role: Role,
    ) -> ResultEngine<Debtor> {
        let name = util::normalize_required_text(name, "contact name")?;
        let phone = util::normalize_optional_text(phone);
        with_tx!(self, |db_tx| {
            let mut debtors = storage::load_collection::<Debtor, _>(&db_tx).await?;
            ensure_unique_name(&debtors, &name)?;
            if let Some(phone) = phone.as_deref() {
                ensure_unique_phone(&debtors, phone)?;
            }

            let debtor = Debtor {
                id: util::new_id("debtor"),
                name,
                role,
                phone,
            };
            debtors.push(debtor.clone());
            storage::replace_collection(&db_tx, &debtors).await?;
            tracing::info!(debtor_id = %debtor.id, %role, "contact imported");
            Ok(debtor)
        })
    }

    /// Every debtor with its balance, optionally filtered by name or phone.
    pub async fn list_debtors(&self, search: Option<&str>) -> ResultEngine<Vec<DebtorSummary>> {
        with_tx!(self, |db_tx| {
            let debtors = storage::load_collection::<Debtor, _>(&db_tx).await?;
            let log = storage::load_collection::<Transaction, _>(&db_tx).await?;
            Ok(ledger::summarize(&debtors, &log, search))
        })
    }

    /// Receivables, payables and the net position across all debtors.
    pub async fn debt_totals(&self) -> ResultEngine<DebtTotals> {
        let summaries = self.list_debtors(None).await?;
        Ok(DebtTotals::from_summaries(&summaries))
    }
}
