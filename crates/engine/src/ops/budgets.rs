use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetUpdate, EngineError, Money, ResultEngine, budgets,
    money::too_large,
    transactions,
    util::{month_bounds, month_start, previous_month_start},
};

use super::{Engine, with_tx};

fn validate_budget_goal(goal: Money) -> ResultEngine<()> {
    if goal.is_negative() {
        return Err(EngineError::Validation(
            "budget goal must not be negative".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    pub async fn budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.find_budget_owned(&db_tx, budget_id, user_id).await?;
            Budget::try_from(model)
        })
    }

    /// Budgets of the month containing `month`.
    pub async fn budgets(&self, month: NaiveDate, user_id: &str) -> ResultEngine<Vec<Budget>> {
        with_tx!(self, |db_tx| {
            self.budgets_of_month(&db_tx, month_start(month), user_id)
                .await
        })
    }

    /// Create a budget for a category and wallet in the month containing
    /// `month`.
    ///
    /// The balance starts from the transactions already recorded in that
    /// scope. A new recurrence group is opened.
    pub async fn new_budget(
        &self,
        category_id: Uuid,
        wallet_id: Uuid,
        goal: Money,
        month: NaiveDate,
        user_id: &str,
    ) -> ResultEngine<Budget> {
        validate_budget_goal(goal)?;
        let month = month_start(month);
        with_tx!(self, |db_tx| {
            let category = self
                .find_category_owned(&db_tx, category_id, user_id)
                .await?;
            self.find_wallet_owned(&db_tx, wallet_id, user_id).await?;
            if self
                .budget_scope_exists(&db_tx, category_id, wallet_id, month, None, user_id)
                .await?
            {
                return Err(EngineError::Conflict(format!(
                    "{} budget for {}",
                    category.name,
                    month.format("%B %Y")
                )));
            }

            let budget = Budget {
                id: Uuid::new_v4(),
                budget_id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                category_id,
                wallet_id,
                goal,
                balance: self
                    .scope_balance(&db_tx, category_id, wallet_id, month, user_id)
                    .await?,
                month,
            };
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;

            tracing::info!(
                budget_id = %budget.id,
                %category_id,
                %wallet_id,
                %month,
                "budget created"
            );
            Ok(budget)
        })
    }

    /// Change goal, category or wallet of a budget.
    ///
    /// Moving the budget to another category or wallet recomputes its balance
    /// from the ledger.
    pub async fn update_budget(
        &self,
        budget_id: Uuid,
        update: BudgetUpdate,
        user_id: &str,
    ) -> ResultEngine<Budget> {
        if let Some(goal) = update.goal {
            validate_budget_goal(goal)?;
        }
        with_tx!(self, |db_tx| {
            let model = self.find_budget_owned(&db_tx, budget_id, user_id).await?;
            let mut budget = Budget::try_from(model)?;

            let category_id = update.category_id.unwrap_or(budget.category_id);
            let wallet_id = update.wallet_id.unwrap_or(budget.wallet_id);
            let category = self
                .find_category_owned(&db_tx, category_id, user_id)
                .await?;
            self.find_wallet_owned(&db_tx, wallet_id, user_id).await?;

            if category_id != budget.category_id || wallet_id != budget.wallet_id {
                if self
                    .budget_scope_exists(
                        &db_tx,
                        category_id,
                        wallet_id,
                        budget.month,
                        Some(budget_id),
                        user_id,
                    )
                    .await?
                {
                    return Err(EngineError::Conflict(format!(
                        "{} budget for {}",
                        category.name,
                        budget.month.format("%B %Y")
                    )));
                }
                budget.category_id = category_id;
                budget.wallet_id = wallet_id;
                budget.balance = self
                    .scope_balance(&db_tx, category_id, wallet_id, budget.month, user_id)
                    .await?;
            }
            if let Some(goal) = update.goal {
                budget.goal = goal;
            }

            budgets::ActiveModel::from(&budget).update(&db_tx).await?;
            Ok(budget)
        })
    }

    pub async fn delete_budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.find_budget_owned(&db_tx, budget_id, user_id).await?;
            budgets::Entity::delete_by_id(budget_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(%budget_id, "budget deleted");
            Ok(())
        })
    }

    /// Carry last month's budgets into the month containing `today`.
    ///
    /// Every recurrence group present last month and missing this month gets
    /// one new row with the same goal, category and wallet. Groups are
    /// renewed at most once, so running this again in the same month creates
    /// nothing. The new balance is taken from the ledger, which is zero
    /// unless transactions were already recorded this month.
    pub async fn renew_budgets(&self, today: NaiveDate, user_id: &str) -> ResultEngine<Vec<Budget>> {
        let current = month_start(today);
        let previous = previous_month_start(today)?;
        with_tx!(self, |db_tx| {
            let existing = self.budgets_of_month(&db_tx, current, user_id).await?;
            let mut groups: HashSet<Uuid> = existing.iter().map(|b| b.budget_id).collect();
            let mut scopes: HashSet<(Uuid, Uuid)> = existing
                .iter()
                .map(|b| (b.category_id, b.wallet_id))
                .collect();

            let mut renewed = Vec::new();
            for last in self.budgets_of_month(&db_tx, previous, user_id).await? {
                if !groups.insert(last.budget_id) {
                    continue;
                }
                if !scopes.insert((last.category_id, last.wallet_id)) {
                    tracing::debug!(
                        budget_id = %last.budget_id,
                        "scope already budgeted this month, not renewed"
                    );
                    continue;
                }

                let budget = Budget {
                    id: Uuid::new_v4(),
                    budget_id: last.budget_id,
                    user_id: user_id.to_string(),
                    category_id: last.category_id,
                    wallet_id: last.wallet_id,
                    goal: last.goal,
                    balance: self
                        .scope_balance(&db_tx, last.category_id, last.wallet_id, current, user_id)
                        .await?,
                    month: current,
                };
                budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
                renewed.push(budget);
            }

            tracing::info!(month = %current, renewed = renewed.len(), "budgets renewed");
            Ok(renewed)
        })
    }

    pub(super) async fn budgets_of_month(
        &self,
        db: &DatabaseTransaction,
        month: NaiveDate,
        user_id: &str,
    ) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::Month.eq(month))
            .order_by_asc(budgets::Column::CategoryId)
            .order_by_asc(budgets::Column::WalletId)
            .all(db)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    async fn budget_scope_exists(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
        wallet_id: Uuid,
        month: NaiveDate,
        exclude: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<bool> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::CategoryId.eq(category_id))
            .filter(budgets::Column::WalletId.eq(wallet_id))
            .filter(budgets::Column::Month.eq(month));
        if let Some(id) = exclude {
            query = query.filter(budgets::Column::Id.ne(id));
        }
        Ok(query.count(db).await? > 0)
    }

    /// Sum of `|amount|` over the scope's transactions in `month`.
    async fn scope_balance(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
        wallet_id: Uuid,
        month: NaiveDate,
        user_id: &str,
    ) -> ResultEngine<Money> {
        let (start, end) = month_bounds(month)?;
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::CategoryId.eq(category_id))
            .filter(transactions::Column::WalletId.eq(wallet_id))
            .filter(transactions::Column::Date.gte(start))
            .filter(transactions::Column::Date.lt(end))
            .all(db)
            .await?
            .into_iter()
            .try_fold(Money::ZERO, |total, model| {
                let amount = Money::from_db(&model.amount, "transaction amount")?.abs();
                total.checked_add(amount).ok_or_else(too_large)
            })
    }
}
