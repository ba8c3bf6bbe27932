#![allow(dead_code)]

use chrono_tz::Tz;
use sea_orm::{Database, DatabaseConnection};

use engine::Engine;
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_in(Tz::UTC).await
}

pub async fn engine_in(tz: Tz) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .timezone(tz)
        .build()
        .await
        .unwrap();
    (engine, db)
}
