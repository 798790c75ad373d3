use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    Budget, Goal, GoalKind, NotificationKind, NotificationSink, ResultEngine, TracingNotifier,
    Transaction, Wallet,
};

mod access;
mod budgets;
mod categories;
mod completion;
mod goals;
mod ledger;
mod notifications;
mod summary;
mod transactions;
mod users;
mod wallets;

pub use summary::{CategoryTotal, MonthSummary};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn NotificationSink>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Hand queued completion events to the sink.
    ///
    /// Called only after the unit of work that produced them has committed.
    async fn dispatch_notifications(&self, pending: Vec<PendingNotice>) {
        for notice in pending {
            if let Err(err) = self.notifier.notify(notice.kind, &notice.goal).await {
                tracing::warn!(
                    kind = %notice.kind,
                    goal_id = %notice.goal.id,
                    error = %err,
                    "failed to deliver goal completion notification"
                );
            }
        }
    }
}

/// Everything a transaction write touched.
///
/// `transaction` is the row as stored after the operation; for a delete, or
/// when the goal it completed deleted itself and its transactions, it is the
/// removed row. The other collections hold the entities whose balances
/// changed, in their final state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerChanges {
    pub transaction: Transaction,
    pub wallets: Vec<Wallet>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
    pub completed: Vec<CompletedGoal>,
}

/// A saving or debt that reached its goal during an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedGoal {
    pub kind: GoalKind,
    /// Snapshot taken when the goal completed.
    pub goal: Goal,
    /// The goal removed itself and its transactions (`delete_on_completion`).
    pub deleted: bool,
}

/// A completion event waiting for the commit.
#[derive(Clone, Debug)]
struct PendingNotice {
    kind: NotificationKind,
    goal: Goal,
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Arc<dyn NotificationSink>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            notifier: Arc::new(TracingNotifier),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the default [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> EngineBuilder {
        self.notifier = notifier;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self.notifier,
        })
    }
}
