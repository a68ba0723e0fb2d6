//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the recurring-bill tracker here: users own
//! bills, bills carry a recurrence rule, and transaction journals record what
//! actually happened (optionally linked back to a bill).

pub mod bill;
pub mod transaction_journal;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::bill::Entity as Bill;
    pub use super::transaction_journal::Entity as TransactionJournal;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user1 = user::ActiveModel {
            username: Set("user1".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let user2 = user::ActiveModel {
            username: Set("user2".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create bills
        let rent = bill::ActiveModel {
            name: Set("Rent".to_string()),
            amount_min: Set(Decimal::new(120000, 2)), // 1200.00
            amount_max: Set(Decimal::new(120000, 2)),
            date: Set(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            repeat_freq: Set(bill::RecurrenceFrequency::Monthly),
            skip: Set(0),
            active: Set(true),
            owner_id: Set(user1.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let insurance = bill::ActiveModel {
            name: Set("Car insurance".to_string()),
            amount_min: Set(Decimal::new(30000, 2)), // 300.00
            amount_max: Set(Decimal::new(35000, 2)), // 350.00
            date: Set(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()),
            repeat_freq: Set(bill::RecurrenceFrequency::HalfYearly),
            skip: Set(0),
            active: Set(false),
            owner_id: Set(user1.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Journal linked to the rent bill
        let linked_journal = transaction_journal::ActiveModel {
            user_id: Set(user1.id),
            bill_id: Set(Some(rent.id)),
            date: Set(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()),
            description: Set("Rent January".to_string()),
            amount: Set(Decimal::new(-120000, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Journal without a bill link
        let loose_journal = transaction_journal::ActiveModel {
            user_id: Set(user1.id),
            bill_id: Set(None),
            date: Set(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()),
            description: Set("Groceries".to_string()),
            amount: Set(Decimal::new(-4500, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.username == "user1"));
        assert!(users.iter().any(|u| u.username == "user2"));

        let bills = Bill::find().all(&db).await?;
        assert_eq!(bills.len(), 2);
        assert!(bills.iter().any(|b| b.name == "Rent" && b.active));
        assert!(bills.iter().any(|b| b.name == "Car insurance" && !b.active));

        let journals = TransactionJournal::find().all(&db).await?;
        assert_eq!(journals.len(), 2);
        assert_eq!(journals.iter().filter(|j| j.bill_id.is_some()).count(), 1);

        // Round-trip of the recurrence rule fields
        let rent_again = Bill::find_by_id(rent.id).one(&db).await?.unwrap();
        assert_eq!(rent_again.repeat_freq, bill::RecurrenceFrequency::Monthly);
        assert_eq!(rent_again.skip, 0);
        assert_eq!(rent_again.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());

        // Journals linked to the rent bill, queried through the FK
        let rent_journals = TransactionJournal::find()
            .filter(transaction_journal::Column::BillId.eq(rent.id))
            .all(&db)
            .await?;
        assert_eq!(rent_journals.len(), 1);
        assert_eq!(rent_journals[0].id, linked_journal.id);
        assert_eq!(rent_journals[0].amount, Decimal::new(-120000, 2));
        assert_ne!(rent_journals[0].id, loose_journal.id);

        assert_eq!(insurance.amount_min, Decimal::new(30000, 2));

        Ok(())
    }

    #[tokio::test]
    async fn test_bill_rejects_inverted_amount_band() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user = user::ActiveModel {
            username: Set("user".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // amount_min > amount_max must fail at save time, not at aggregation time
        let result = bill::ActiveModel {
            name: Set("Broken".to_string()),
            amount_min: Set(Decimal::new(2000, 2)),
            amount_max: Set(Decimal::new(1000, 2)),
            date: Set(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            repeat_freq: Set(bill::RecurrenceFrequency::Monthly),
            skip: Set(0),
            active: Set(true),
            owner_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(matches!(result, Err(DbErr::Custom(_))));
        assert_eq!(Bill::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_bill_rejects_negative_skip() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user = user::ActiveModel {
            username: Set("user".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let result = bill::ActiveModel {
            name: Set("Broken".to_string()),
            amount_min: Set(Decimal::new(1000, 2)),
            amount_max: Set(Decimal::new(2000, 2)),
            date: Set(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            repeat_freq: Set(bill::RecurrenceFrequency::Weekly),
            skip: Set(-1),
            active: Set(true),
            owner_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(matches!(result, Err(DbErr::Custom(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_bill_update_is_validated_too() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user = user::ActiveModel {
            username: Set("user".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let bill = bill::ActiveModel {
            name: Set("Gym".to_string()),
            amount_min: Set(Decimal::new(2500, 2)),
            amount_max: Set(Decimal::new(2500, 2)),
            date: Set(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            repeat_freq: Set(bill::RecurrenceFrequency::Monthly),
            skip: Set(0),
            active: Set(true),
            owner_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let mut update: bill::ActiveModel = bill.into();
        update.amount_min = Set(Decimal::new(5000, 2));
        update.amount_max = Set(Decimal::new(4000, 2));
        let result = update.update(&db).await;

        assert!(matches!(result, Err(DbErr::Custom(_))));

        Ok(())
    }
}
