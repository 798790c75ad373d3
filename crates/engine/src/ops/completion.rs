//! Goal completion.
//!
//! Runs inside the caller's database transaction, in this order:
//!
//! 1. mark the goal completed and persist it
//! 2. when `notify_on_completion`, store a notification row and queue the
//!    sink event (sent after commit)
//! 3. when `delete_on_completion`, delete the goal and its transactions

use chrono::Utc;
use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{Goal, Notification, NotificationKind, ResultEngine, notifications};

use super::{CompletedGoal, Engine, PendingNotice};

impl Engine {
    pub(super) async fn complete_goal(
        &self,
        db: &DatabaseTransaction,
        goal: &mut Goal,
    ) -> ResultEngine<(CompletedGoal, Option<PendingNotice>)> {
        goal.completed = true;
        self.persist_goal(db, goal).await?;

        let mut pending = None;
        if goal.notify_on_completion {
            let kind = NotificationKind::for_goal(goal.kind);
            let notification = Notification {
                id: Uuid::new_v4(),
                user_id: goal.user_id.clone(),
                kind,
                title: kind.title().to_string(),
                body: kind.body(&goal.name),
                alert: kind.alert().to_string(),
                created_at: Utc::now(),
                dismissed: false,
                dismissed_at: None,
            };
            notifications::ActiveModel::from(&notification)
                .insert(db)
                .await?;
            pending = Some(PendingNotice {
                kind,
                goal: goal.clone(),
            });
        }

        let deleted = goal.delete_on_completion;
        if deleted {
            self.remove_goal(db, goal.kind, goal.id).await?;
        }

        tracing::info!(
            kind = goal.kind.label(),
            goal_id = %goal.id,
            balance = %goal.balance,
            deleted,
            "goal completed"
        );

        Ok((
            CompletedGoal {
                kind: goal.kind,
                goal: goal.clone(),
                deleted,
            },
            pending,
        ))
    }
}
