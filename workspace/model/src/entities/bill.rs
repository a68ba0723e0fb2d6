use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr};

use super::user;

/// Enum for bill recurrence frequencies.
///
/// Together with `skip` this forms the recurrence rule of a bill: one
/// occurrence every `(1 + skip)` intervals of the given frequency.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum RecurrenceFrequency {
    #[sea_orm(string_value = "W")]
    Weekly,
    #[sea_orm(string_value = "M")]
    Monthly,
    #[sea_orm(string_value = "Q")]
    Quarterly,
    #[sea_orm(string_value = "H")]
    HalfYearly,
    #[sea_orm(string_value = "Y")]
    Yearly,
}

/// A recurring expected charge, owned by a single user.
///
/// The amount of each occurrence is only known as a `[amount_min, amount_max]`
/// band; `date` is the anchor, the first known occurrence from which the
/// whole recurrence sequence is projected.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Lower bound of the expected charge.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount_min: Decimal,
    /// Upper bound of the expected charge. Invariant: amount_min <= amount_max.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount_max: Decimal,
    /// The first known occurrence; anchors the recurrence sequence.
    pub date: NaiveDate,
    pub repeat_freq: RecurrenceFrequency,
    /// Number of intervals skipped between occurrences.
    /// skip = 1 means "every other interval". Never negative.
    pub skip: i32,
    #[sea_orm(default_value = "true")]
    pub active: bool,
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::OwnerId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::transaction_journal::Entity")]
    TransactionJournal,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::transaction_journal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionJournal.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Rejects invalid bill definitions before they reach the store.
    /// Aggregation code relies on these invariants instead of re-checking them.
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let (Some(min), Some(max)) = (self.amount_min.try_as_ref(), self.amount_max.try_as_ref())
        {
            if min > max {
                return Err(DbErr::Custom(format!(
                    "invalid bill definition: amount_min {} exceeds amount_max {}",
                    min, max
                )));
            }
        }
        if let Some(skip) = self.skip.try_as_ref() {
            if *skip < 0 {
                return Err(DbErr::Custom(format!(
                    "invalid bill definition: negative skip {}",
                    skip
                )));
            }
        }
        Ok(self)
    }
}
