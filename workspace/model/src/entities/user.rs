use sea_orm::entity::prelude::*;

/// Represents a user of the system. Bills and journals always belong to
/// exactly one user, and every query into them is user-scoped.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    // Other fields like password_hash, email, etc., would go here.
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // A user can own multiple bills and journals.
    #[sea_orm(has_many = "super::bill::Entity")]
    Bill,
    #[sea_orm(has_many = "super::transaction_journal::Entity")]
    TransactionJournal,
}

impl ActiveModelBehavior for ActiveModel {}
