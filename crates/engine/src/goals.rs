//! Savings and debts share one domain type.
//!
//! Both are goal entities: routed transactions feed their `balance` until it
//! reaches `goal`. They live in separate tables (`savings`, `debts`) and
//! [`GoalKind`] says which one a [`Goal`] came from.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue;
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, Money, debts, savings, util::name_key};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Saving,
    Debt,
}

impl GoalKind {
    /// Name used in messages and errors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Saving => "saving",
            Self::Debt => "debt",
        }
    }
}

/// A savings goal or a debt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub id: Uuid,
    pub kind: GoalKind,
    pub user_id: String,
    pub name: String,
    pub goal: Money,
    pub balance: Money,
    pub due_date: Option<NaiveDate>,
    pub notify_on_completion: bool,
    pub delete_on_completion: bool,
    pub completed: bool,
    pub hidden: bool,
    /// Only meaningful for debts: the money is owed to the user.
    pub is_receiving: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(kind: GoalKind, name: String, goal: Money, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            user_id: user_id.to_string(),
            name,
            goal,
            balance: Money::ZERO,
            due_date: None,
            notify_on_completion: true,
            delete_on_completion: false,
            completed: false,
            hidden: false,
            is_receiving: false,
            created_at: Utc::now(),
        }
    }

    /// Amount still missing to reach the goal, never negative.
    pub fn remaining(&self) -> Money {
        if self.balance >= self.goal {
            Money::ZERO
        } else {
            self.goal - self.balance
        }
    }
}

impl From<&Goal> for savings::ActiveModel {
    fn from(value: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::Set(name_key(&value.name)),
            goal: ActiveValue::Set(value.goal.to_db()),
            balance: ActiveValue::Set(value.balance.to_db()),
            due_date: ActiveValue::Set(value.due_date),
            notify_on_completion: ActiveValue::Set(value.notify_on_completion),
            delete_on_completion: ActiveValue::Set(value.delete_on_completion),
            completed: ActiveValue::Set(value.completed),
            hidden: ActiveValue::Set(value.hidden),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<&Goal> for debts::ActiveModel {
    fn from(value: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            name_norm: ActiveValue::Set(name_key(&value.name)),
            is_receiving: ActiveValue::Set(value.is_receiving),
            goal: ActiveValue::Set(value.goal.to_db()),
            balance: ActiveValue::Set(value.balance.to_db()),
            due_date: ActiveValue::Set(value.due_date),
            notify_on_completion: ActiveValue::Set(value.notify_on_completion),
            delete_on_completion: ActiveValue::Set(value.delete_on_completion),
            completed: ActiveValue::Set(value.completed),
            hidden: ActiveValue::Set(value.hidden),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<savings::Model> for Goal {
    type Error = EngineError;

    fn try_from(model: savings::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: GoalKind::Saving,
            goal: Money::from_db(&model.goal, "saving goal")?,
            balance: Money::from_db(&model.balance, "saving balance")?,
            user_id: model.user_id,
            name: model.name,
            due_date: model.due_date,
            notify_on_completion: model.notify_on_completion,
            delete_on_completion: model.delete_on_completion,
            completed: model.completed,
            hidden: model.hidden,
            is_receiving: false,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<debts::Model> for Goal {
    type Error = EngineError;

    fn try_from(model: debts::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: GoalKind::Debt,
            goal: Money::from_db(&model.goal, "debt goal")?,
            balance: Money::from_db(&model.balance, "debt balance")?,
            user_id: model.user_id,
            name: model.name,
            due_date: model.due_date,
            notify_on_completion: model.notify_on_completion,
            delete_on_completion: model.delete_on_completion,
            completed: model.completed,
            hidden: model.hidden,
            is_receiving: model.is_receiving,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_never_negative() {
        let mut goal = Goal::new(
            GoalKind::Saving,
            "Vacation".to_string(),
            Money::from_cents(10_000),
            "alice",
        );
        goal.balance = Money::from_cents(9_000);
        assert_eq!(goal.remaining(), Money::from_cents(1_000));

        goal.balance = Money::from_cents(12_000);
        assert_eq!(goal.remaining(), Money::ZERO);
    }
}
