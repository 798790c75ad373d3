//! Dispatch of parsed commands to the engine and plain text output.

use chrono::NaiveDate;
use engine::{
    Budget, BudgetUpdate, Category, Engine, EngineError, Goal, GoalFilter, GoalKind, GoalUpdate,
    LedgerChanges, MonthSummary, NewGoalCmd, Notification, Transaction, TransactionFilter,
    TransactionForm, Wallet,
};

use crate::cli::{
    BudgetCommand, CategoryCommand, Command, GoalCommand, NotificationCommand, TxCommand,
    UserCommand, WalletCommand,
};

type Result<T> = std::result::Result<T, EngineError>;

pub async fn run(
    engine: &Engine,
    command: Command,
    user: Option<&str>,
    today: NaiveDate,
) -> Result<()> {
    let kind = command.goal_kind();
    match command {
        Command::User {
            command: UserCommand::Create { username },
        } => {
            let username = engine.new_user(&username).await?;
            println!("created user: {username}");
        }
        Command::Wallet { command } => wallet(engine, command, require(user)?).await?,
        Command::Category { command } => category(engine, command, require(user)?).await?,
        Command::Budget { command } => budget(engine, command, today, require(user)?).await?,
        Command::Saving { command } | Command::Debt { command } => {
            let kind = kind.ok_or_else(|| EngineError::Validation("unknown goal kind".into()))?;
            goal(engine, kind, command, require(user)?).await?;
        }
        Command::Tx { command } => tx(engine, command, today, require(user)?).await?,
        Command::Notification { command } => {
            notification(engine, command, require(user)?).await?;
        }
        Command::Summary { month } => {
            let summary = engine
                .month_summary(month.unwrap_or(today), require(user)?)
                .await?;
            print_summary(&summary);
        }
    }
    Ok(())
}

fn require(user: Option<&str>) -> Result<&str> {
    user.ok_or_else(|| EngineError::Validation("--user (or PYNNY_USER) is required".to_string()))
}

async fn wallet(engine: &Engine, command: WalletCommand, user: &str) -> Result<()> {
    match command {
        WalletCommand::List => {
            for wallet in engine.wallets(user).await? {
                print_wallet(&wallet);
            }
        }
        WalletCommand::Show { id } => print_wallet(&engine.wallet(id, user).await?),
        WalletCommand::Create { name, balance } => {
            print_wallet(&engine.new_wallet(&name, balance, user).await?);
        }
        WalletCommand::Rename { id, name } => {
            print_wallet(&engine.rename_wallet(id, &name, user).await?);
        }
        WalletCommand::SetBalance { id, balance } => {
            print_wallet(&engine.set_wallet_balance(id, balance, user).await?);
        }
        WalletCommand::Delete { id } => {
            engine.delete_wallet(id, user).await?;
            println!("deleted wallet {id}");
        }
    }
    Ok(())
}

async fn category(engine: &Engine, command: CategoryCommand, user: &str) -> Result<()> {
    match command {
        CategoryCommand::List => {
            for category in engine.categories(user).await? {
                print_category(&category);
            }
        }
        CategoryCommand::Create { name, income } => {
            print_category(&engine.new_category(&name, income, user).await?);
        }
        CategoryCommand::Update { id, name, income } => {
            let category = engine
                .update_category(id, name.as_deref(), income, user)
                .await?;
            print_category(&category);
        }
        CategoryCommand::Delete { id } => {
            engine.delete_category(id, user).await?;
            println!("deleted category {id}");
        }
    }
    Ok(())
}

async fn budget(
    engine: &Engine,
    command: BudgetCommand,
    today: NaiveDate,
    user: &str,
) -> Result<()> {
    match command {
        BudgetCommand::List { month } => {
            for budget in engine.budgets(month.unwrap_or(today), user).await? {
                print_budget(&budget);
            }
        }
        BudgetCommand::Show { id } => print_budget(&engine.budget(id, user).await?),
        BudgetCommand::Create {
            category,
            wallet,
            goal,
            month,
        } => {
            let budget = engine
                .new_budget(category, wallet, goal, month.unwrap_or(today), user)
                .await?;
            print_budget(&budget);
        }
        BudgetCommand::Update {
            id,
            goal,
            category,
            wallet,
        } => {
            let update = BudgetUpdate {
                goal,
                category_id: category,
                wallet_id: wallet,
            };
            print_budget(&engine.update_budget(id, update, user).await?);
        }
        BudgetCommand::Delete { id } => {
            engine.delete_budget(id, user).await?;
            println!("deleted budget {id}");
        }
        BudgetCommand::Renew { today: date } => {
            let renewed = engine.renew_budgets(date.unwrap_or(today), user).await?;
            println!("renewed {} budget(s)", renewed.len());
            for budget in &renewed {
                print_budget(budget);
            }
        }
    }
    Ok(())
}

async fn goal(engine: &Engine, kind: GoalKind, command: GoalCommand, user: &str) -> Result<()> {
    match command {
        GoalCommand::List {
            hide_hidden,
            hide_completed,
        } => {
            let filter = GoalFilter {
                hide_hidden,
                hide_completed,
            };
            for goal in engine.goals(kind, filter, user).await? {
                print_goal(&goal);
            }
        }
        GoalCommand::Show { id } => print_goal(&engine.goal(kind, id, user).await?),
        GoalCommand::Create {
            name,
            goal,
            due,
            silent,
            delete_on_completion,
            hidden,
            receiving,
        } => {
            let mut cmd = NewGoalCmd::new(kind, name, goal)
                .notify_on_completion(!silent)
                .delete_on_completion(delete_on_completion)
                .hidden(hidden)
                .is_receiving(receiving);
            if let Some(due) = due {
                cmd = cmd.due_date(due);
            }
            print_goal(&engine.new_goal(cmd, user).await?);
        }
        GoalCommand::Update {
            id,
            name,
            goal,
            due,
            clear_due,
            notify,
            delete_on_completion,
            hidden,
            receiving,
        } => {
            let update = GoalUpdate {
                name,
                goal,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                notify_on_completion: notify,
                delete_on_completion,
                hidden,
                is_receiving: receiving,
            };
            print_goal(&engine.update_goal(kind, id, update, user).await?);
        }
        GoalCommand::Delete { id } => {
            engine.delete_goal(kind, id, user).await?;
            println!("deleted {} {id}", kind.label());
        }
    }
    Ok(())
}

async fn tx(engine: &Engine, command: TxCommand, today: NaiveDate, user: &str) -> Result<()> {
    match command {
        TxCommand::List {
            wallet,
            category,
            saving,
            debt,
            month,
            limit,
        } => {
            let filter = TransactionFilter {
                wallet_id: wallet,
                category_id: category,
                saving_id: saving,
                debt_id: debt,
                month,
                limit,
            };
            for transaction in engine.transactions(&filter, user).await? {
                print_transaction(&transaction);
            }
        }
        TxCommand::Show { id } => print_transaction(&engine.transaction(id, user).await?),
        TxCommand::Create(fields) => {
            let intent = TransactionForm::from(fields).parse(today)?;
            print_changes(&engine.create_transaction(intent, user).await?);
        }
        TxCommand::Edit { id, fields } => {
            let intent = TransactionForm::from(fields).parse(today)?;
            print_changes(&engine.update_transaction(id, intent, user).await?);
        }
        TxCommand::Delete { id } => {
            let changes = engine.delete_transaction(id, user).await?;
            println!("deleted transaction {id}");
            print_changes(&changes);
        }
    }
    Ok(())
}

async fn notification(engine: &Engine, command: NotificationCommand, user: &str) -> Result<()> {
    match command {
        NotificationCommand::List { all } => {
            for notification in engine.notifications(all, user).await? {
                print_notification(&notification);
            }
        }
        NotificationCommand::Dismiss { id } => {
            print_notification(&engine.dismiss_notification(id, user).await?);
        }
    }
    Ok(())
}

fn print_wallet(wallet: &Wallet) {
    println!("{}  {:<20} {:>12}", wallet.id, wallet.name, wallet.balance);
}

fn print_category(category: &Category) {
    let side = if category.is_income { "income" } else { "expense" };
    println!("{}  {:<20} {side}", category.id, category.name);
}

fn print_budget(budget: &Budget) {
    println!(
        "{}  {}  category {}  wallet {}  {} / {}",
        budget.id,
        budget.month.format("%Y-%m"),
        budget.category_id,
        budget.wallet_id,
        budget.balance,
        budget.goal
    );
}

fn print_goal(goal: &Goal) {
    let mut flags = Vec::new();
    if goal.completed {
        flags.push("completed");
    }
    if goal.hidden {
        flags.push("hidden");
    }
    if goal.is_receiving {
        flags.push("receiving");
    }
    let due = goal
        .due_date
        .map(|d| format!("  due {d}"))
        .unwrap_or_default();
    println!(
        "{}  {:<20} {} / {}{due}  {}",
        goal.id,
        goal.name,
        goal.balance,
        goal.goal,
        flags.join(",")
    );
}

fn print_transaction(transaction: &Transaction) {
    println!(
        "{}  {}  {:>12}  wallet {}  {} {}  {}",
        transaction.id,
        transaction.date,
        transaction.amount,
        transaction.wallet_id,
        transaction.kind().as_str(),
        transaction.target.id(),
        transaction.description
    );
}

fn print_changes(changes: &LedgerChanges) {
    print_transaction(&changes.transaction);
    for wallet in &changes.wallets {
        print!("  wallet  ");
        print_wallet(wallet);
    }
    for budget in &changes.budgets {
        print!("  budget  ");
        print_budget(budget);
    }
    for goal in &changes.goals {
        print!("  {:<7} ", goal.kind.label());
        print_goal(goal);
    }
    for completed in &changes.completed {
        let suffix = if completed.deleted {
            " and was deleted with its transactions"
        } else {
            ""
        };
        println!(
            "  {} \"{}\" reached its goal{suffix}",
            completed.kind.label(),
            completed.goal.name
        );
    }
}

fn print_notification(notification: &Notification) {
    let state = if notification.dismissed { "dismissed" } else { "new" };
    println!(
        "{}  {}  [{state}] {}: {}",
        notification.id,
        notification.created_at.format("%Y-%m-%d %H:%M"),
        notification.title,
        notification.body
    );
}

fn print_summary(summary: &MonthSummary) {
    println!("{}", summary.month.format("%B %Y"));
    println!("income {}  expenses {}", summary.income, summary.expenses);
    for total in &summary.categories {
        println!(
            "  {:<20} {:>4} tx {:>12}",
            total.name, total.count, total.total
        );
    }
    for budget in &summary.budgets {
        print!("  budget  ");
        print_budget(budget);
    }
}
