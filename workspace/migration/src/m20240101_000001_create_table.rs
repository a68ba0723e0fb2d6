use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create bills table
        manager
            .create_table(
                Table::create()
                    .table(Bills::Table)
                    .if_not_exists()
                    .col(pk_auto(Bills::Id))
                    .col(string(Bills::Name))
                    .col(decimal_len(Bills::AmountMin, 16, 4))
                    .col(decimal_len(Bills::AmountMax, 16, 4))
                    .col(date(Bills::Date))
                    .col(string(Bills::RepeatFreq))
                    .col(integer(Bills::Skip).default(0))
                    .col(boolean(Bills::Active).default(true))
                    .col(integer(Bills::OwnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bill_owner")
                            .from(Bills::Table, Bills::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create transaction_journals table
        manager
            .create_table(
                Table::create()
                    .table(TransactionJournals::Table)
                    .if_not_exists()
                    .col(pk_auto(TransactionJournals::Id))
                    .col(integer(TransactionJournals::UserId))
                    .col(integer_null(TransactionJournals::BillId))
                    .col(date(TransactionJournals::Date))
                    .col(string(TransactionJournals::Description))
                    .col(decimal_len(TransactionJournals::Amount, 16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_user")
                            .from(TransactionJournals::Table, TransactionJournals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_journal_bill")
                            .from(TransactionJournals::Table, TransactionJournals::BillId)
                            .to(Bills::Table, Bills::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Journals are filtered by (bill, date) in every aggregation query.
        manager
            .create_index(
                Index::create()
                    .name("idx_journal_bill_date")
                    .table(TransactionJournals::Table)
                    .col(TransactionJournals::BillId)
                    .col(TransactionJournals::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionJournals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
}

#[derive(DeriveIden)]
enum Bills {
    Table,
    Id,
    Name,
    AmountMin,
    AmountMax,
    Date,
    RepeatFreq,
    Skip,
    Active,
    OwnerId,
}

#[derive(DeriveIden)]
enum TransactionJournals {
    Table,
    Id,
    UserId,
    BillId,
    Date,
    Description,
    Amount,
}
