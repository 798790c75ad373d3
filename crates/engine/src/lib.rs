//! Ledger engine for Pynny.
//!
//! The engine owns every balance in the system: wallet cash, the accumulated
//! balance of monthly budgets and the progress of savings/debt goals. All
//! writes go through [`Engine`], which runs each operation inside a single
//! database transaction so balances never drift apart.

pub use budgets::Budget;
pub use categories::Category;
pub use commands::{
    BudgetUpdate, GoalFilter, GoalUpdate, MAX_DESCRIPTION_LEN, NewGoalCmd, TransactionFilter,
    TransactionForm, TransactionIntent,
};
pub use error::EngineError;
pub use goals::{Goal, GoalKind};
pub use money::Money;
pub use notifications::Notification;
pub use notify::{NotificationKind, NotificationSink, NotifyError, TracingNotifier};
pub use ops::{CategoryTotal, CompletedGoal, Engine, EngineBuilder, LedgerChanges, MonthSummary};
pub use rules::{Effect, RuleTarget};
pub use transactions::{TargetKind, TargetRef, Transaction};
pub use wallets::Wallet;

mod budgets;
mod categories;
mod commands;
mod debts;
mod error;
mod goals;
mod money;
mod notifications;
mod notify;
mod ops;
pub mod rules;
mod savings;
mod transactions;
mod users;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
