//! Command line definition.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{GoalKind, Money, TransactionForm};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pynny")]
#[command(about = "Personal finance ledger: wallets, budgets, savings and debts")]
pub struct Cli {
    /// Database connection string. Overrides `settings.toml`.
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Settings file (TOML), without extension.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// User the command acts for.
    #[arg(long, short, env = "PYNNY_USER", global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register users.
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage wallets.
    Wallet {
        #[command(subcommand)]
        command: WalletCommand,
    },
    /// Manage income and expense categories.
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Manage monthly budgets.
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },
    /// Manage savings goals.
    Saving {
        #[command(subcommand)]
        command: GoalCommand,
    },
    /// Manage debts.
    Debt {
        #[command(subcommand)]
        command: GoalCommand,
    },
    /// Record and edit transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommand,
    },
    /// Read and dismiss goal notifications.
    Notification {
        #[command(subcommand)]
        command: NotificationCommand,
    },
    /// Budgets and category totals of a month.
    Summary {
        /// Any day of the month, defaults to today.
        #[arg(long)]
        month: Option<NaiveDate>,
    },
}

impl Command {
    /// Goal kind of the `saving` and `debt` subcommands.
    pub fn goal_kind(&self) -> Option<GoalKind> {
        match self {
            Self::Saving { .. } => Some(GoalKind::Saving),
            Self::Debt { .. } => Some(GoalKind::Debt),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Create {
        #[arg(long)]
        username: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    List,
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        name: String,
        /// Opening balance.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: Money,
    },
    Rename {
        id: Uuid,
        #[arg(long)]
        name: String,
    },
    /// Overwrite the balance, e.g. after reconciling with the bank.
    SetBalance {
        id: Uuid,
        #[arg(long, allow_hyphen_values = true)]
        balance: Money,
    },
    /// Delete the wallet with its transactions and budgets.
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        /// Income category (expense otherwise).
        #[arg(long)]
        income: bool,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        income: Option<bool>,
    },
    /// Delete the category with its transactions and budgets.
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    List {
        /// Any day of the month, defaults to today.
        #[arg(long)]
        month: Option<NaiveDate>,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        wallet: Uuid,
        #[arg(long)]
        goal: Money,
        /// Any day of the month, defaults to today.
        #[arg(long)]
        month: Option<NaiveDate>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        goal: Option<Money>,
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(long)]
        wallet: Option<Uuid>,
    },
    Delete {
        id: Uuid,
    },
    /// Copy last month's budgets into the current month.
    Renew {
        /// Reference date, defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    List {
        #[arg(long)]
        hide_hidden: bool,
        #[arg(long)]
        hide_completed: bool,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        goal: Money,
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Do not notify when the goal is reached.
        #[arg(long)]
        silent: bool,
        #[arg(long)]
        delete_on_completion: bool,
        #[arg(long)]
        hidden: bool,
        /// Debts only: the money is owed to you.
        #[arg(long)]
        receiving: bool,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<Money>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        notify: Option<bool>,
        #[arg(long)]
        delete_on_completion: Option<bool>,
        #[arg(long)]
        hidden: Option<bool>,
        #[arg(long)]
        receiving: Option<bool>,
    },
    /// Delete the goal together with its transactions.
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    List {
        #[arg(long)]
        wallet: Option<Uuid>,
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(long)]
        saving: Option<Uuid>,
        #[arg(long)]
        debt: Option<Uuid>,
        /// Any day of the month.
        #[arg(long)]
        month: Option<NaiveDate>,
        #[arg(long)]
        limit: Option<u64>,
    },
    Show {
        id: Uuid,
    },
    Create(TxFields),
    /// Rewrite a transaction; every field must be given again.
    Edit {
        id: Uuid,
        #[command(flatten)]
        fields: TxFields,
    },
    /// Undo a transaction and remove it.
    Delete {
        id: Uuid,
    },
}

/// Transaction fields, validated by the engine like a submitted form.
#[derive(Args, Debug)]
pub struct TxFields {
    #[arg(long)]
    pub wallet: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`, defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub saving: Option<String>,
    #[arg(long)]
    pub debt: Option<String>,
}

impl From<TxFields> for TransactionForm {
    fn from(fields: TxFields) -> Self {
        Self {
            wallet: fields.wallet,
            amount: fields.amount,
            description: fields.description,
            date: fields.date,
            category: fields.category,
            saving: fields.saving,
            debt: fields.debt,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    List {
        /// Include dismissed notifications.
        #[arg(long)]
        all: bool,
    },
    Dismiss {
        id: Uuid,
    },
}
