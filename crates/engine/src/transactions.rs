//! The module contains the `Transaction` struct and its target types.
//!
//! A transaction moves money in or out of one wallet and settles against
//! exactly one target: a budget category, a saving or a debt. The row keeps a
//! `target_kind` tag next to three nullable id columns, exactly one of which
//! is set. Deleting the target deletes the transaction with it.

use chrono::NaiveDate;
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, Money};

/// Which rule set a transaction was applied with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Category,
    Saving,
    Debt,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Saving => "saving",
            Self::Debt => "debt",
        }
    }
}

impl TryFrom<&str> for TargetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "category" => Ok(Self::Category),
            "saving" => Ok(Self::Saving),
            "debt" => Ok(Self::Debt),
            other => Err(EngineError::Validation(format!(
                "invalid transaction target kind: {other}"
            ))),
        }
    }
}

/// Reference to the entity a transaction settles against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TargetRef {
    Category(Uuid),
    Saving(Uuid),
    Debt(Uuid),
}

impl TargetRef {
    pub fn kind(self) -> TargetKind {
        match self {
            Self::Category(_) => TargetKind::Category,
            Self::Saving(_) => TargetKind::Saving,
            Self::Debt(_) => TargetKind::Debt,
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::Category(id) | Self::Saving(id) | Self::Debt(id) => id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub wallet_id: Uuid,
    /// Signed amount as entered.
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub target: TargetRef,
}

impl Transaction {
    pub fn kind(&self) -> TargetKind {
        self.target.kind()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub wallet_id: Uuid,
    pub amount: String,
    pub description: String,
    pub date: Date,
    pub target_kind: String,
    pub category_id: Option<Uuid>,
    pub saving_id: Option<Uuid>,
    pub debt_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::savings::Entity",
        from = "Column::SavingId",
        to = "super::savings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Saving,
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Debt,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::savings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saving.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(value: &Transaction) -> Self {
        let target_id = |kind: TargetKind| (value.kind() == kind).then_some(value.target.id());
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            wallet_id: ActiveValue::Set(value.wallet_id),
            amount: ActiveValue::Set(value.amount.to_db()),
            description: ActiveValue::Set(value.description.clone()),
            date: ActiveValue::Set(value.date),
            target_kind: ActiveValue::Set(value.kind().as_str().to_string()),
            category_id: ActiveValue::Set(target_id(TargetKind::Category)),
            saving_id: ActiveValue::Set(target_id(TargetKind::Saving)),
            debt_id: ActiveValue::Set(target_id(TargetKind::Debt)),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = TargetKind::try_from(model.target_kind.as_str())?;
        let target = match kind {
            TargetKind::Category => model.category_id.map(TargetRef::Category),
            TargetKind::Saving => model.saving_id.map(TargetRef::Saving),
            TargetKind::Debt => model.debt_id.map(TargetRef::Debt),
        }
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "transaction {} has no {} id",
                model.id,
                kind.as_str()
            ))
        })?;
        Ok(Self {
            id: model.id,
            amount: Money::from_db(&model.amount, "transaction amount")?,
            user_id: model.user_id,
            wallet_id: model.wallet_id,
            description: model.description,
            date: model.date,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(target: TargetRef) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            wallet_id: Uuid::new_v4(),
            amount: Money::from_cents(-450),
            description: "Coffee".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            target,
        }
    }

    #[test]
    fn only_the_matching_id_column_is_set() {
        let saving = Uuid::new_v4();
        let tx = transaction(TargetRef::Saving(saving));
        let active = ActiveModel::from(&tx);

        assert_eq!(active.target_kind, ActiveValue::Set("saving".to_string()));
        assert_eq!(active.saving_id, ActiveValue::Set(Some(saving)));
        assert_eq!(active.category_id, ActiveValue::Set(None));
        assert_eq!(active.debt_id, ActiveValue::Set(None));
    }

    fn model(target_kind: &str, debt_id: Option<Uuid>) -> Model {
        Model {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            wallet_id: Uuid::new_v4(),
            amount: "30.00".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            target_kind: target_kind.to_string(),
            category_id: None,
            saving_id: None,
            debt_id,
        }
    }

    #[test]
    fn model_reads_the_id_of_its_kind() {
        let debt = Uuid::new_v4();
        let tx = Transaction::try_from(model("debt", Some(debt))).unwrap();
        assert_eq!(tx.target, TargetRef::Debt(debt));
        assert_eq!(tx.kind(), TargetKind::Debt);
        assert_eq!(tx.amount, Money::from_cents(3000));
    }

    #[test]
    fn model_without_target_id_is_rejected() {
        let err = Transaction::try_from(model("saving", Some(Uuid::new_v4()))).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(Transaction::try_from(model("debt", None)).is_err());
    }
}
