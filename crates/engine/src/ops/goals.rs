use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Goal, GoalFilter, GoalKind, GoalUpdate, Money, NewGoalCmd, ResultEngine, debts,
    rules, savings, transactions,
    util::{name_key, normalize_required_name},
};

use super::{Engine, PendingNotice, with_tx};

fn validate_goal_amount(goal: Money) -> ResultEngine<()> {
    if goal <= Money::ZERO {
        return Err(EngineError::Validation("goal must be > 0".to_string()));
    }
    Ok(())
}

impl Engine {
    /// Return a saving or debt snapshot from DB.
    pub async fn goal(&self, kind: GoalKind, goal_id: Uuid, user_id: &str) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| {
            self.find_goal_owned(&db_tx, kind, goal_id, user_id).await
        })
    }

    /// List the user's savings or debts, oldest first.
    pub async fn goals(
        &self,
        kind: GoalKind,
        filter: GoalFilter,
        user_id: &str,
    ) -> ResultEngine<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            let goals = match kind {
                GoalKind::Saving => {
                    let mut query = savings::Entity::find()
                        .filter(savings::Column::UserId.eq(user_id.to_string()));
                    if filter.hide_hidden {
                        query = query.filter(savings::Column::Hidden.eq(false));
                    }
                    if filter.hide_completed {
                        query = query.filter(savings::Column::Completed.eq(false));
                    }
                    query
                        .order_by_asc(savings::Column::CreatedAt)
                        .all(&db_tx)
                        .await?
                        .into_iter()
                        .map(Goal::try_from)
                        .collect::<ResultEngine<Vec<_>>>()?
                }
                GoalKind::Debt => {
                    let mut query = debts::Entity::find()
                        .filter(debts::Column::UserId.eq(user_id.to_string()));
                    if filter.hide_hidden {
                        query = query.filter(debts::Column::Hidden.eq(false));
                    }
                    if filter.hide_completed {
                        query = query.filter(debts::Column::Completed.eq(false));
                    }
                    query
                        .order_by_asc(debts::Column::CreatedAt)
                        .all(&db_tx)
                        .await?
                        .into_iter()
                        .map(Goal::try_from)
                        .collect::<ResultEngine<Vec<_>>>()?
                }
            };
            Ok(goals)
        })
    }

    /// Create a saving or a debt with a zero balance.
    pub async fn new_goal(&self, cmd: NewGoalCmd, user_id: &str) -> ResultEngine<Goal> {
        let name = normalize_required_name(&cmd.name, cmd.kind.label())?;
        validate_goal_amount(cmd.goal)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            if self
                .goal_name_exists(&db_tx, cmd.kind, &name, None, user_id)
                .await?
            {
                return Err(EngineError::Conflict(name));
            }

            let mut goal = Goal::new(cmd.kind, name, cmd.goal, user_id);
            goal.due_date = cmd.due_date;
            goal.notify_on_completion = cmd.notify_on_completion;
            goal.delete_on_completion = cmd.delete_on_completion;
            goal.hidden = cmd.hidden;
            goal.is_receiving = cmd.kind == GoalKind::Debt && cmd.is_receiving;
            self.insert_goal(&db_tx, &goal).await?;

            tracing::info!(
                kind = goal.kind.label(),
                goal_id = %goal.id,
                goal = %goal.goal,
                "goal created"
            );
            Ok(goal)
        })
    }

    /// Apply a partial update.
    ///
    /// Changing the target re-evaluates completion: lowering it under the
    /// current balance completes the goal (notification and deletion
    /// included), raising it over the balance reopens it.
    pub async fn update_goal(
        &self,
        kind: GoalKind,
        goal_id: Uuid,
        update: GoalUpdate,
        user_id: &str,
    ) -> ResultEngine<Goal> {
        let name = update
            .name
            .as_deref()
            .map(|value| normalize_required_name(value, kind.label()))
            .transpose()?;
        if let Some(goal) = update.goal {
            validate_goal_amount(goal)?;
        }

        let result: ResultEngine<(Goal, Vec<PendingNotice>)> = with_tx!(self, |db_tx| {
            let mut goal = self.find_goal_owned(&db_tx, kind, goal_id, user_id).await?;

            if let Some(name) = name {
                if self
                    .goal_name_exists(&db_tx, kind, &name, Some(goal_id), user_id)
                    .await?
                {
                    return Err(EngineError::Conflict(name));
                }
                goal.name = name;
            }
            if let Some(target) = update.goal {
                goal.goal = target;
            }
            if let Some(due_date) = update.due_date {
                goal.due_date = due_date;
            }
            if let Some(notify) = update.notify_on_completion {
                goal.notify_on_completion = notify;
            }
            if let Some(delete) = update.delete_on_completion {
                goal.delete_on_completion = delete;
            }
            if let Some(hidden) = update.hidden {
                goal.hidden = hidden;
            }
            if let Some(is_receiving) = update.is_receiving
                && kind == GoalKind::Debt
            {
                goal.is_receiving = is_receiving;
            }

            let mut pending = Vec::new();
            let met = rules::is_goal_met(goal.balance, goal.goal);
            if met && !goal.completed {
                let (_, notice) = self.complete_goal(&db_tx, &mut goal).await?;
                pending.extend(notice);
            } else {
                goal.completed = met;
                self.persist_goal(&db_tx, &goal).await?;
            }
            Ok((goal, pending))
        });
        let (goal, pending) = result?;

        self.dispatch_notifications(pending).await;
        Ok(goal)
    }

    /// Delete a saving or a debt together with its transactions.
    ///
    /// The removed transactions are not reversed: the wallets they moved keep
    /// their balance.
    pub async fn delete_goal(&self, kind: GoalKind, goal_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.find_goal_owned(&db_tx, kind, goal_id, user_id).await?;
            self.remove_goal(&db_tx, kind, goal_id).await?;
            tracing::info!(kind = kind.label(), %goal_id, "goal deleted");
            Ok(())
        })
    }

    pub(super) async fn find_goal_owned(
        &self,
        db: &DatabaseTransaction,
        kind: GoalKind,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Goal> {
        let goal = match kind {
            GoalKind::Saving => savings::Entity::find_by_id(goal_id)
                .one(db)
                .await?
                .map(Goal::try_from)
                .transpose()?,
            GoalKind::Debt => debts::Entity::find_by_id(goal_id)
                .one(db)
                .await?
                .map(Goal::try_from)
                .transpose()?,
        }
        .ok_or_else(|| EngineError::NotFound(kind.label().to_string()))?;

        if goal.user_id != user_id {
            return Err(EngineError::Forbidden(kind.label().to_string()));
        }
        Ok(goal)
    }

    async fn goal_name_exists(
        &self,
        db: &DatabaseTransaction,
        kind: GoalKind,
        name: &str,
        exclude: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<bool> {
        let key = name_key(name);
        let count = match kind {
            GoalKind::Saving => {
                let mut query = savings::Entity::find()
                    .filter(savings::Column::UserId.eq(user_id.to_string()))
                    .filter(savings::Column::NameNorm.eq(key));
                if let Some(id) = exclude {
                    query = query.filter(savings::Column::Id.ne(id));
                }
                query.count(db).await?
            }
            GoalKind::Debt => {
                let mut query = debts::Entity::find()
                    .filter(debts::Column::UserId.eq(user_id.to_string()))
                    .filter(debts::Column::NameNorm.eq(key));
                if let Some(id) = exclude {
                    query = query.filter(debts::Column::Id.ne(id));
                }
                query.count(db).await?
            }
        };
        Ok(count > 0)
    }

    async fn insert_goal(&self, db: &DatabaseTransaction, goal: &Goal) -> ResultEngine<()> {
        match goal.kind {
            GoalKind::Saving => {
                savings::ActiveModel::from(goal).insert(db).await?;
            }
            GoalKind::Debt => {
                debts::ActiveModel::from(goal).insert(db).await?;
            }
        }
        Ok(())
    }

    /// Write every field of `goal` back to its table.
    pub(super) async fn persist_goal(&self, db: &DatabaseTransaction, goal: &Goal) -> ResultEngine<()> {
        match goal.kind {
            GoalKind::Saving => {
                savings::ActiveModel::from(goal).update(db).await?;
            }
            GoalKind::Debt => {
                debts::ActiveModel::from(goal).update(db).await?;
            }
        }
        Ok(())
    }

    /// Delete the goal's transactions, then the goal row.
    pub(super) async fn remove_goal(
        &self,
        db: &DatabaseTransaction,
        kind: GoalKind,
        goal_id: Uuid,
    ) -> ResultEngine<()> {
        let column = match kind {
            GoalKind::Saving => transactions::Column::SavingId,
            GoalKind::Debt => transactions::Column::DebtId,
        };
        let removed = transactions::Entity::delete_many()
            .filter(column.eq(goal_id))
            .exec(db)
            .await?;

        match kind {
            GoalKind::Saving => {
                savings::Entity::delete_by_id(goal_id).exec(db).await?;
            }
            GoalKind::Debt => {
                debts::Entity::delete_by_id(goal_id).exec(db).await?;
            }
        }

        tracing::debug!(
            kind = kind.label(),
            %goal_id,
            transactions = removed.rows_affected,
            "goal removed"
        );
        Ok(())
    }
}
