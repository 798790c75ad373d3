mod common;

use std::sync::Arc;

use rust_decimal_macros::dec;

use common::{FailingSink, RecordingSink, date, engine_with_db, engine_with_sink, money};
use engine::{
    EngineError, GoalFilter, GoalKind, GoalUpdate, NewGoalCmd, NotificationKind, TargetKind,
    TargetRef, TransactionFilter, TransactionIntent,
};

#[tokio::test]
async fn saving_completes_when_balance_reaches_goal() {
    let sink = Arc::new(RecordingSink::default());
    let (engine, _db) = engine_with_sink(Some(sink.clone())).await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(500)), "alice")
        .await
        .unwrap();
    let bike = engine
        .new_goal(NewGoalCmd::saving("Bike", money(dec!(100))), "alice")
        .await
        .unwrap();

    let first = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(90)),
                date(2024, 5, 1),
                TargetRef::Saving(bike.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    assert!(!first.goals[0].completed);
    assert!(first.completed.is_empty());

    let short = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(9)),
                date(2024, 5, 2),
                TargetRef::Saving(bike.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(short.goals[0].balance, money(dec!(99)));
    assert!(!short.goals[0].completed);
    assert!(sink.events().is_empty());

    let last = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(1)),
                date(2024, 5, 3),
                TargetRef::Saving(bike.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    assert!(last.goals[0].completed);
    assert_eq!(last.completed.len(), 1);
    assert!(!last.completed[0].deleted);

    let stored = engine
        .goal(GoalKind::Saving, bike.id, "alice")
        .await
        .unwrap();
    assert!(stored.completed);
    assert_eq!(stored.balance, money(dec!(100)));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, NotificationKind::SavingComplete);
    assert_eq!(events[0].1.id, bike.id);

    let notifications = engine.notifications(false, "alice").await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Saving Complete!");
    assert_eq!(
        notifications[0].body,
        "You completed your savings goal for Bike"
    );
    assert_eq!(notifications[0].alert, "success");
}

#[tokio::test]
async fn completion_fires_once_and_reopens_on_undo() {
    let sink = Arc::new(RecordingSink::default());
    let (engine, _db) = engine_with_sink(Some(sink.clone())).await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(500)), "alice")
        .await
        .unwrap();
    let fund = engine
        .new_goal(NewGoalCmd::saving("Fund", money(dec!(50))), "alice")
        .await
        .unwrap();

    let done = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(60)),
                date(2024, 5, 1),
                TargetRef::Saving(fund.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(done.completed.len(), 1);

    // Already completed: no second event.
    let more = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(5)),
                date(2024, 5, 2),
                TargetRef::Saving(fund.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    assert!(more.completed.is_empty());
    assert_eq!(sink.events().len(), 1);

    engine
        .delete_transaction(done.transaction.id, "alice")
        .await
        .unwrap();
    let fund = engine
        .goal(GoalKind::Saving, fund.id, "alice")
        .await
        .unwrap();
    assert_eq!(fund.balance, money(dec!(5)));
    assert!(!fund.completed);
    assert_eq!(
        engine.wallet(wallet.id, "alice").await.unwrap().balance,
        money(dec!(495))
    );
}

#[tokio::test]
async fn delete_on_completion_removes_goal_after_notifying() {
    let sink = Arc::new(RecordingSink::default());
    let (engine, _db) = engine_with_sink(Some(sink.clone())).await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(200)), "alice")
        .await
        .unwrap();
    let loan = engine
        .new_goal(
            NewGoalCmd::debt("Loan from Sam", money(dec!(80))).delete_on_completion(true),
            "alice",
        )
        .await
        .unwrap();

    let changes = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(80)),
                date(2024, 5, 1),
                TargetRef::Debt(loan.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(changes.completed.len(), 1);
    assert!(changes.completed[0].deleted);
    assert_eq!(changes.completed[0].goal.balance, money(dec!(80)));
    assert_eq!(changes.transaction.kind(), TargetKind::Debt);
    assert_eq!(changes.transaction.target, TargetRef::Debt(loan.id));
    let paid_balance = changes.wallets[0].balance;

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, NotificationKind::DebtComplete);
    assert_eq!(events[0].1.name, "Loan from Sam");
    assert_eq!(
        engine.notifications(false, "alice").await.unwrap()[0].title,
        "Debt Complete!"
    );

    assert_eq!(
        engine.goal(GoalKind::Debt, loan.id, "alice").await,
        Err(EngineError::NotFound("debt".to_string()))
    );
    assert_eq!(
        engine
            .create_transaction(
                TransactionIntent::new(
                    wallet.id,
                    money(dec!(1)),
                    date(2024, 5, 2),
                    TargetRef::Debt(loan.id),
                ),
                "alice",
            )
            .await
            .map(|_| ()),
        Err(EngineError::NotFound("debt".to_string()))
    );

    // The goal took its transactions with it; the wallet keeps the payment.
    assert_eq!(
        engine.transaction(changes.transaction.id, "alice").await,
        Err(EngineError::NotFound("transaction".to_string()))
    );
    assert_eq!(
        engine.wallet(wallet.id, "alice").await.unwrap().balance,
        paid_balance
    );
}

#[tokio::test]
async fn failing_sink_does_not_fail_the_transaction() {
    let (engine, _db) = engine_with_sink(Some(Arc::new(FailingSink))).await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let phone = engine
        .new_goal(NewGoalCmd::saving("Phone", money(dec!(20))), "alice")
        .await
        .unwrap();

    let changes = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(20)),
                date(2024, 5, 1),
                TargetRef::Saving(phone.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(changes.completed.len(), 1);
    assert_eq!(changes.wallets[0].balance, money(dec!(80)));
    assert_eq!(engine.notifications(false, "alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn silent_goals_store_no_notification() {
    let sink = Arc::new(RecordingSink::default());
    let (engine, _db) = engine_with_sink(Some(sink.clone())).await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let quiet = engine
        .new_goal(
            NewGoalCmd::saving("Quiet", money(dec!(10))).notify_on_completion(false),
            "alice",
        )
        .await
        .unwrap();

    let changes = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(10)),
                date(2024, 5, 1),
                TargetRef::Saving(quiet.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(changes.completed.len(), 1);
    assert!(sink.events().is_empty());
    assert!(engine.notifications(true, "alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_goal_deletes_its_transactions() {
    let (engine, _db) = engine_with_db().await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let trip = engine
        .new_goal(NewGoalCmd::saving("Trip", money(dec!(1000))), "alice")
        .await
        .unwrap();
    let food = engine.new_category("Food", false, "alice").await.unwrap();

    let saved = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(25)),
                date(2024, 5, 1),
                TargetRef::Saving(trip.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    let lunch = engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(10)),
                date(2024, 5, 2),
                TargetRef::Category(food.id),
            ),
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(lunch.wallets[0].balance, money(dec!(65)));

    engine
        .delete_goal(GoalKind::Saving, trip.id, "alice")
        .await
        .unwrap();

    assert_eq!(
        engine.transaction(saved.transaction.id, "alice").await,
        Err(EngineError::NotFound("transaction".to_string()))
    );
    let remaining = engine
        .transactions(&TransactionFilter::default(), "alice")
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, lunch.transaction.id);

    // Removed without reversal.
    assert_eq!(
        engine.wallet(wallet.id, "alice").await.unwrap().balance,
        money(dec!(65))
    );
}

#[tokio::test]
async fn goal_updates_recheck_completion() {
    let sink = Arc::new(RecordingSink::default());
    let (engine, _db) = engine_with_sink(Some(sink.clone())).await;

    let wallet = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let laptop = engine
        .new_goal(
            NewGoalCmd::saving("Laptop", money(dec!(100))).due_date(date(2024, 12, 24)),
            "alice",
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            TransactionIntent::new(
                wallet.id,
                money(dec!(60)),
                date(2024, 5, 1),
                TargetRef::Saving(laptop.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    let lowered = engine
        .update_goal(
            GoalKind::Saving,
            laptop.id,
            GoalUpdate::default().goal(money(dec!(50))),
            "alice",
        )
        .await
        .unwrap();
    assert!(lowered.completed);
    assert_eq!(sink.events().len(), 1);

    let raised = engine
        .update_goal(
            GoalKind::Saving,
            laptop.id,
            GoalUpdate::default()
                .goal(money(dec!(70)))
                .name("Gaming laptop")
                .hidden(true)
                .due_date(None),
            "alice",
        )
        .await
        .unwrap();
    assert!(!raised.completed);
    assert_eq!(raised.name, "Gaming laptop");
    assert_eq!(raised.due_date, None);
    assert_eq!(sink.events().len(), 1);

    let visible = engine
        .goals(
            GoalKind::Saving,
            GoalFilter {
                hide_hidden: true,
                hide_completed: false,
            },
            "alice",
        )
        .await
        .unwrap();
    assert!(visible.is_empty());
    assert_eq!(
        engine
            .goals(GoalKind::Saving, GoalFilter::default(), "alice")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn goal_names_and_amounts_are_validated() {
    let (engine, _db) = engine_with_db().await;

    engine
        .new_goal(NewGoalCmd::saving("Emergency", money(dec!(1000))), "alice")
        .await
        .unwrap();

    assert_eq!(
        engine
            .new_goal(NewGoalCmd::saving(" emergency ", money(dec!(5))), "alice")
            .await,
        Err(EngineError::Conflict("emergency".to_string()))
    );
    assert!(matches!(
        engine
            .new_goal(NewGoalCmd::saving("Zero", money(dec!(0))), "alice")
            .await,
        Err(EngineError::Validation(_))
    ));

    // Names are unique per user and per kind.
    engine
        .new_goal(NewGoalCmd::debt("Emergency", money(dec!(10))), "alice")
        .await
        .unwrap();
    engine
        .new_goal(NewGoalCmd::saving("Emergency", money(dec!(10))), "bob")
        .await
        .unwrap();
}
