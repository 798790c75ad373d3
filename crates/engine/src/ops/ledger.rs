//! Merged balance deltas for one unit of work.
//!
//! Every transaction write turns into one or two rule effects (apply, reverse
//! or both for an edit). The effects are summed per entity first, then each
//! wallet, budget and goal is read and written once with its combined delta.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, Goal, GoalKind, Money, ResultEngine, TargetRef, Transaction, Wallet, budgets,
    money::too_large,
    rules::{self, Effect, RuleTarget},
    transactions,
    util::month_start,
    wallets,
};

use super::{CompletedGoal, Engine, LedgerChanges, PendingNotice};

/// Budget rows affected by a transaction: category, wallet, first day of month.
type BudgetScope = (Uuid, Uuid, NaiveDate);

#[derive(Debug, Default)]
pub(super) struct Deltas {
    wallets: BTreeMap<Uuid, Money>,
    budgets: BTreeMap<BudgetScope, Money>,
    goals: BTreeMap<(GoalKind, Uuid), Money>,
}

impl Deltas {
    /// Add the effect `tx` has on its wallet and target.
    pub(super) fn record(&mut self, tx: &Transaction, effect: Effect) -> ResultEngine<()> {
        accumulate(&mut self.wallets, tx.wallet_id, effect.wallet)?;
        match tx.target {
            TargetRef::Category(category_id) => {
                let scope = (category_id, tx.wallet_id, month_start(tx.date));
                accumulate(&mut self.budgets, scope, effect.budget)
            }
            TargetRef::Saving(goal_id) => {
                accumulate(&mut self.goals, (GoalKind::Saving, goal_id), effect.goal)
            }
            TargetRef::Debt(goal_id) => {
                accumulate(&mut self.goals, (GoalKind::Debt, goal_id), effect.goal)
            }
        }
    }
}

fn accumulate<K: Ord>(map: &mut BTreeMap<K, Money>, key: K, delta: Money) -> ResultEngine<()> {
    let entry = map.entry(key).or_insert(Money::ZERO);
    *entry = entry.checked_add(delta).ok_or_else(too_large)?;
    Ok(())
}

fn shifted(balance: Money, delta: Money) -> ResultEngine<Money> {
    balance.checked_add(delta).ok_or_else(too_large)
}

/// Entities rewritten by [`Engine::apply_deltas`].
#[derive(Debug, Default)]
pub(super) struct Applied {
    wallets: Vec<Wallet>,
    budgets: Vec<Budget>,
    goals: Vec<Goal>,
    completed: Vec<CompletedGoal>,
    pending: Vec<PendingNotice>,
}

impl Applied {
    pub(super) fn into_changes(self, transaction: Transaction) -> (LedgerChanges, Vec<PendingNotice>) {
        (
            LedgerChanges {
                transaction,
                wallets: self.wallets,
                budgets: self.budgets,
                goals: self.goals,
                completed: self.completed,
            },
            self.pending,
        )
    }
}

impl Engine {
    /// Resolve what rule set a transaction uses, checking that its target
    /// exists and belongs to `user_id`.
    pub(super) async fn rule_target(
        &self,
        db: &DatabaseTransaction,
        target: TargetRef,
        user_id: &str,
    ) -> ResultEngine<RuleTarget> {
        match target {
            TargetRef::Category(category_id) => {
                let category = self
                    .find_category_owned(db, category_id, user_id)
                    .await?;
                Ok(RuleTarget::Category {
                    is_income: category.is_income,
                })
            }
            TargetRef::Saving(goal_id) => {
                self.find_goal_owned(db, GoalKind::Saving, goal_id, user_id)
                    .await?;
                Ok(RuleTarget::Saving)
            }
            TargetRef::Debt(goal_id) => {
                self.find_goal_owned(db, GoalKind::Debt, goal_id, user_id)
                    .await?;
                Ok(RuleTarget::Debt)
            }
        }
    }

    /// Persist merged deltas and run goal completion where a goal crossed
    /// its target.
    ///
    /// A balance pushed out of the amount range fails with `Validation`, which
    /// rolls back the whole unit of work.
    pub(super) async fn apply_deltas(
        &self,
        db: &DatabaseTransaction,
        deltas: Deltas,
        user_id: &str,
    ) -> ResultEngine<Applied> {
        let mut applied = Applied::default();

        for (wallet_id, delta) in deltas.wallets {
            if delta.is_zero() {
                continue;
            }
            let model = self.find_wallet_owned(db, wallet_id, user_id).await?;
            let balance = shifted(Money::from_db(&model.balance, "wallet balance")?, delta)?;
            let model = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id),
                balance: ActiveValue::Set(balance.to_db()),
                ..Default::default()
            }
            .update(db)
            .await?;
            tracing::debug!(%wallet_id, %delta, %balance, "wallet balance updated");
            applied.wallets.push(Wallet::try_from(model)?);
        }

        for ((category_id, wallet_id, month), delta) in deltas.budgets {
            if delta.is_zero() {
                continue;
            }
            let models = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .filter(budgets::Column::CategoryId.eq(category_id))
                .filter(budgets::Column::WalletId.eq(wallet_id))
                .filter(budgets::Column::Month.eq(month))
                .all(db)
                .await?;
            for model in models {
                let mut budget = Budget::try_from(model)?;
                budget.balance = shifted(budget.balance, delta)?;
                budgets::ActiveModel::from(&budget).update(db).await?;
                tracing::debug!(
                    budget_id = %budget.id,
                    %delta,
                    balance = %budget.balance,
                    "budget balance updated"
                );
                applied.budgets.push(budget);
            }
        }

        for ((kind, goal_id), delta) in deltas.goals {
            if delta.is_zero() {
                continue;
            }
            let mut goal = self.find_goal_owned(db, kind, goal_id, user_id).await?;
            goal.balance = shifted(goal.balance, delta)?;
            tracing::debug!(
                kind = kind.label(),
                %goal_id,
                %delta,
                balance = %goal.balance,
                "goal balance updated"
            );

            let met = rules::is_goal_met(goal.balance, goal.goal);
            if met && !goal.completed {
                let (completed, notice) = self.complete_goal(db, &mut goal).await?;
                applied.completed.push(completed);
                applied.pending.extend(notice);
            } else {
                goal.completed = met;
                self.persist_goal(db, &goal).await?;
            }
            applied.goals.push(goal);
        }

        Ok(applied)
    }

    /// Re-read a transaction row written earlier in the same unit of work.
    ///
    /// `None` when a goal completed by this write deleted it.
    pub(super) async fn reload_transaction(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<Option<Transaction>> {
        transactions::Entity::find_by_id(transaction_id)
            .one(db)
            .await?
            .map(Transaction::try_from)
            .transpose()
    }
}
