//! Goal completion notifications.
//!
//! The engine stores a [`Notification`](crate::Notification) row for every
//! completed goal that asked to be notified, then hands the event to a
//! [`NotificationSink`] once the database work is committed. Delivery is best
//! effort: a failing sink is logged and never fails the ledger operation.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{EngineError, Goal, GoalKind};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Sink unavailable")]
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SavingComplete,
    DebtComplete,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SavingComplete => "saving_complete",
            Self::DebtComplete => "debt_complete",
        }
    }

    pub(crate) fn for_goal(kind: GoalKind) -> Self {
        match kind {
            GoalKind::Saving => Self::SavingComplete,
            GoalKind::Debt => Self::DebtComplete,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::SavingComplete => "Saving Complete!",
            Self::DebtComplete => "Debt Complete!",
        }
    }

    pub fn body(self, goal_name: &str) -> String {
        match self {
            Self::SavingComplete => format!("You completed your savings goal for {goal_name}"),
            Self::DebtComplete => format!("You completed your debt goal for {goal_name}"),
        }
    }

    pub(crate) fn alert(self) -> &'static str {
        "success"
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "saving_complete" => Ok(Self::SavingComplete),
            "debt_complete" => Ok(Self::DebtComplete),
            other => Err(EngineError::Validation(format!(
                "invalid notification kind: {other}"
            ))),
        }
    }
}

/// Receives completion events after the ledger change is committed.
///
/// `goal` is a snapshot taken when the goal completed, so it is still
/// available when the goal was deleted by the same operation.
#[async_trait]
pub trait NotificationSink: Send + Sync + fmt::Debug {
    async fn notify(&self, kind: NotificationKind, goal: &Goal) -> Result<(), NotifyError>;
}

/// Default sink: records the event in the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, kind: NotificationKind, goal: &Goal) -> Result<(), NotifyError> {
        tracing::info!(
            kind = %kind,
            goal_id = %goal.id,
            user_id = %goal.user_id,
            "{}",
            kind.body(&goal.name)
        );
        Ok(())
    }
}
