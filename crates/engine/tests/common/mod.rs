#![allow(dead_code)]

use std::path::PathBuf;

use chrono::Utc;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Actor, Engine, LedgerSettings};
use migration::MigratorTrait;
use uuid::Uuid;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_settings(LedgerSettings::default()).await
}

pub async fn engine_with_settings(settings: LedgerSettings) -> (Engine, DatabaseConnection) {
    // A second pooled connection would open a different in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    let engine = prepare(&db, settings).await;
    (engine, db)
}

/// File-backed database with a real connection pool, for tests that need
/// transactions to overlap. Remove the returned path when done.
pub async fn engine_with_file_db(
    settings: LedgerSettings,
) -> (Engine, DatabaseConnection, PathBuf) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", path.display()));
    options.max_connections(8);
    let db = Database::connect(options).await.unwrap();
    let engine = prepare(&db, settings).await;
    (engine, db, path)
}

async fn prepare(db: &DatabaseConnection, settings: LedgerSettings) -> Engine {
    migration::Migrator::up(db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["mom".into(), "password".into()],
    ))
    .await
    .unwrap();
    Engine::builder()
        .database(db.clone())
        .settings(settings)
        .build()
        .await
        .unwrap()
}

pub fn parent() -> Actor {
    Actor::parent("mom")
}

pub async fn insert_child(db: &DatabaseConnection, name: &str) -> i64 {
    let res = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO children (name, username, auth_key, created_at) VALUES (?, ?, ?, ?)",
            vec![
                name.into(),
                name.to_lowercase().into(),
                "secret".into(),
                Utc::now().into(),
            ],
        ))
        .await
        .unwrap();
    res.last_insert_id() as i64
}

pub async fn insert_reward(db: &DatabaseConnection, name: &str, points: i64, active: bool) -> i64 {
    let res = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO rewards (name, required_points, category, active, created_at) \
             VALUES (?, ?, ?, ?, ?)",
            vec![
                name.into(),
                points.into(),
                "TOY".into(),
                active.into(),
                Utc::now().into(),
            ],
        ))
        .await
        .unwrap();
    res.last_insert_id() as i64
}

/// Writes an EARN row directly, bypassing the per-award cap.
pub async fn seed_earn(db: &DatabaseConnection, child_id: i64, points: i64) {
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO point_transactions (child_id, kind, points, reason, created_at) \
         VALUES (?, 'EARN', ?, 'seed', ?)",
        vec![child_id.into(), points.into(), Utc::now().into()],
    ))
    .await
    .unwrap();
}
