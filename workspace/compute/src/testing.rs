//! Shared scenario helpers for the compute test suites.

use std::sync::atomic::AtomicU64;

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::{bill, transaction_journal, user};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set,
};

pub type Result<T> = std::result::Result<T, DbErr>;

pub async fn setup_db() -> Result<DatabaseConnection> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    // Try to apply migrations first
    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

pub async fn new_user(db: &DatabaseConnection) -> Result<user::Model> {
    static USER_ID: AtomicU64 = AtomicU64::new(0);

    let current_id = USER_ID.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    user::ActiveModel {
        username: Set(format!("user_{}", current_id)),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts an active bill with the given anchor and recurrence rule.
/// Amount bounds are given in cents.
pub async fn new_bill(
    db: &DatabaseConnection,
    user: &user::Model,
    anchor: NaiveDate,
    repeat_freq: bill::RecurrenceFrequency,
    skip: i32,
    amount_min: i64,
    amount_max: i64,
) -> Result<bill::Model> {
    bill::ActiveModel {
        name: Set("Test bill".to_string()),
        amount_min: Set(Decimal::new(amount_min, 2)),
        amount_max: Set(Decimal::new(amount_max, 2)),
        date: Set(anchor),
        repeat_freq: Set(repeat_freq),
        skip: Set(skip),
        active: Set(true),
        owner_id: Set(user.id),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts a journal, optionally linked to a bill. Amount is in cents,
/// negative for expenses.
pub async fn new_journal(
    db: &DatabaseConnection,
    user: &user::Model,
    bill: Option<&bill::Model>,
    date: NaiveDate,
    amount: i64,
) -> Result<transaction_journal::Model> {
    transaction_journal::ActiveModel {
        user_id: Set(user.id),
        bill_id: Set(bill.map(|b| b.id)),
        date: Set(date),
        description: Set("Test journal".to_string()),
        amount: Set(Decimal::new(amount, 2)),
        ..Default::default()
    }
    .insert(db)
    .await
}
