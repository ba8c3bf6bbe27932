use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod backup;
mod business;
mod debtors;
mod inventory;
mod ledger;
mod reports;
mod sales;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every stored operation.
///
/// Each read-modify-write runs inside one database transaction, so concurrent
/// writers against the same database never lose each other's updates.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Timezone used for report windows and statement dates.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Local timezone of the business. Defaults to UTC.
    pub fn timezone(mut self, tz: Tz) -> EngineBuilder {
        self.timezone = Some(tz);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            timezone: self.timezone.unwrap_or(Tz::UTC),
        })
    }
}
