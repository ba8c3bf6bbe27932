//! Key-value document table.
//!
//! Each row holds one JSON document. Writes replace the whole value.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, entity::prelude::*, sea_query::OnConflict};

use crate::ResultEngine;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kv_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    #[sea_orm(column_type = "Text")]
    pub value: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Raw text stored under `key`, if any.
pub(crate) async fn load<C: ConnectionTrait>(conn: &C, key: &str) -> ResultEngine<Option<String>> {
    Ok(Entity::find_by_id(key.to_string())
        .one(conn)
        .await?
        .map(|model| model.value))
}

/// Insert or fully replace the document under `key`.
pub(crate) async fn save<C: ConnectionTrait>(conn: &C, key: &str, value: String) -> ResultEngine<()> {
    let active = ActiveModel {
        key: ActiveValue::Set(key.to_string()),
        value: ActiveValue::Set(value),
        updated_at: ActiveValue::Set(Utc::now()),
    };
    Entity::insert(active)
        .on_conflict(
            OnConflict::column(Column::Key)
                .update_columns([Column::Value, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub(crate) async fn remove<C: ConnectionTrait>(conn: &C, key: &str) -> ResultEngine<()> {
    Entity::delete_by_id(key.to_string()).exec(conn).await?;
    Ok(())
}
