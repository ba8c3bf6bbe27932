use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{
    BusinessProfile, ResultEngine, statement,
    storage::{self, BUSINESS_NAME_KEY, BUSINESS_PHONE_KEY},
    util,
};

use super::{Engine, with_tx};

impl Engine {
    async fn load_business_profile<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> ResultEngine<BusinessProfile> {
        let default = BusinessProfile::default();
        let name = storage::load_value::<String, _>(conn, BUSINESS_NAME_KEY)
            .await?
            .and_then(|name| util::normalize_optional_text(Some(name.as_str())))
            .unwrap_or(default.name);
        let phone = storage::load_value::<String, _>(conn, BUSINESS_PHONE_KEY)
            .await?
            .and_then(|phone| util::normalize_optional_text(Some(phone.as_str())))
            .unwrap_or(default.phone);
        Ok(BusinessProfile { name, phone })
    }

    /// Business name and phone, with defaults for unset values.
    pub async fn business_profile(&self) -> ResultEngine<BusinessProfile> {
        with_tx!(self, |db_tx| self.load_business_profile(&db_tx).await)
    }

    /// Store the business name and phone. A blank phone clears it.
    pub async fn set_business_profile(
        &self,
        name: &str,
        phone: Option<&str>,
    ) -> ResultEngine<BusinessProfile> {
        let profile = BusinessProfile {
            name: util::normalize_required_text(name, "business name")?,
            phone: util::normalize_optional_text(phone).unwrap_or_default(),
        };
        with_tx!(self, |db_tx| {
            storage::save_value(&db_tx, BUSINESS_NAME_KEY, &profile.name).await?;
            storage::save_value(&db_tx, BUSINESS_PHONE_KEY, &profile.phone).await?;
            tracing::info!(name = %profile.name, "business profile updated");
            Ok(profile)
        })
    }

    /// Shareable text statement for one debtor.
    pub async fn statement_text(&self, debtor_id: &str) -> ResultEngine<String> {
        with_tx!(self, |db_tx| {
            let view = self.load_subject_view(&db_tx, debtor_id).await?;
            let business = self.load_business_profile(&db_tx).await?;
            Ok(statement::statement_text(&view, &business, self.timezone))
        })
    }

    /// CSV export of one debtor's ledger entries.
    pub async fn statement_csv(&self, debtor_id: &str) -> ResultEngine<String> {
        let view = self.subject_view(debtor_id).await?;
        statement::statement_csv(&view, self.timezone)
    }
}
