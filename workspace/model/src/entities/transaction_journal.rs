use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{bill, user};

/// A recorded transaction event: one dated, signed amount.
///
/// A journal may be linked to a bill via `bill_id`; the link is nullable and
/// maintained elsewhere (the "link transactions to bill" operation). This
/// crate only reads it when reconciling expected occurrences against what was
/// actually recorded.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_journals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// The bill this journal is linked to, if any.
    pub bill_id: Option<i32>,
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount. Negative for expenses, positive for income.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "bill::Entity",
        from = "Column::BillId",
        to = "bill::Column::Id",
        on_delete = "SetNull"
    )]
    Bill,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bill.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
