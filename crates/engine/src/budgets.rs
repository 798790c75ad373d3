//! Monthly budgets.
//!
//! A budget row belongs to one category, one wallet and one month. Rows that
//! share a `budget_id` are the same recurring budget seen in different
//! months; renewal copies the group forward.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub id: Uuid,
    /// Recurrence group shared by every month of the same budget.
    pub budget_id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub wallet_id: Uuid,
    pub goal: Money,
    /// Sum of the magnitudes of the month's transactions in this scope.
    pub balance: Money,
    /// Always the first day of the month.
    pub month: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub wallet_id: Uuid,
    pub goal: String,
    pub balance: String,
    pub month: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            budget_id: ActiveValue::Set(value.budget_id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            category_id: ActiveValue::Set(value.category_id),
            wallet_id: ActiveValue::Set(value.wallet_id),
            goal: ActiveValue::Set(value.goal.to_db()),
            balance: ActiveValue::Set(value.balance.to_db()),
            month: ActiveValue::Set(value.month),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            budget_id: model.budget_id,
            user_id: model.user_id,
            category_id: model.category_id,
            wallet_id: model.wallet_id,
            goal: Money::from_db(&model.goal, "budget goal")?,
            balance: Money::from_db(&model.balance, "budget balance")?,
            month: model.month,
        })
    }
}
