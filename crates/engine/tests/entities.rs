mod common;

use rust_decimal_macros::dec;

use common::{date, engine_with_db, money};
use engine::{
    EngineError, GoalKind, Money, NewGoalCmd, TargetRef, TransactionFilter, TransactionIntent,
};

#[tokio::test]
async fn users_are_unique() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(
        engine.new_user("alice").await,
        Err(EngineError::Conflict("alice".to_string()))
    );
    assert_eq!(engine.new_user(" carol ").await.unwrap(), "carol");
    assert!(engine.user_exists("carol").await.unwrap());
    assert!(!engine.user_exists("dave").await.unwrap());

    assert_eq!(
        engine.new_wallet("Cash", Money::ZERO, "dave").await,
        Err(EngineError::NotFound("user".to_string()))
    );
}

#[tokio::test]
async fn wallet_names_collide_after_normalization() {
    let (engine, _db) = engine_with_db().await;

    let cash = engine
        .new_wallet("  Cash ", money(dec!(10)), "alice")
        .await
        .unwrap();
    assert_eq!(cash.name, "Cash");

    assert_eq!(
        engine.new_wallet("CASH", Money::ZERO, "alice").await,
        Err(EngineError::Conflict("CASH".to_string()))
    );
    assert_eq!(
        engine.new_wallet("ｃａｓｈ", Money::ZERO, "alice").await,
        Err(EngineError::Conflict("ｃａｓｈ".to_string()))
    );
    assert!(matches!(
        engine.new_wallet("   ", Money::ZERO, "alice").await,
        Err(EngineError::Validation(_))
    ));

    // Another user may reuse the name.
    engine.new_wallet("Cash", Money::ZERO, "bob").await.unwrap();

    let bank = engine
        .new_wallet("Bank", Money::ZERO, "alice")
        .await
        .unwrap();
    assert_eq!(
        engine.rename_wallet(bank.id, "cash", "alice").await,
        Err(EngineError::Conflict("cash".to_string()))
    );
    let renamed = engine
        .rename_wallet(bank.id, "Savings account", "alice")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Savings account");
    assert_eq!(renamed.id, bank.id);

    // Renaming to a different case of its own name is allowed.
    engine.rename_wallet(cash.id, "CASH", "alice").await.unwrap();

    let names: Vec<String> = engine
        .wallets("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["CASH", "Savings account"]);
}

#[tokio::test]
async fn set_balance_becomes_the_new_base() {
    let (engine, _db) = engine_with_db().await;

    let cash = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let food = engine.new_category("Food", false, "alice").await.unwrap();
    let created = engine
        .create_transaction(
            TransactionIntent::new(
                cash.id,
                money(dec!(10)),
                date(2024, 5, 1),
                TargetRef::Category(food.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    let reset = engine
        .set_wallet_balance(cash.id, money(dec!(42.10)), "alice")
        .await
        .unwrap();
    assert_eq!(reset.balance, money(dec!(42.10)));

    engine
        .delete_transaction(created.transaction.id, "alice")
        .await
        .unwrap();
    assert_eq!(
        engine.wallet(cash.id, "alice").await.unwrap().balance,
        money(dec!(52.10))
    );

    assert_eq!(
        engine
            .set_wallet_balance(cash.id, Money::ZERO, "bob")
            .await,
        Err(EngineError::Forbidden("wallet".to_string()))
    );
}

#[tokio::test]
async fn deleting_a_wallet_removes_its_rows_without_reversal() {
    let (engine, _db) = engine_with_db().await;

    let cash = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let card = engine
        .new_wallet("Card", money(dec!(100)), "alice")
        .await
        .unwrap();
    let food = engine.new_category("Food", false, "alice").await.unwrap();
    let car = engine
        .new_goal(NewGoalCmd::saving("Car", money(dec!(5000))), "alice")
        .await
        .unwrap();

    engine
        .new_budget(food.id, cash.id, money(dec!(50)), date(2024, 5, 1), "alice")
        .await
        .unwrap();
    let kept = engine
        .new_budget(food.id, card.id, money(dec!(50)), date(2024, 5, 1), "alice")
        .await
        .unwrap();
    for (wallet_id, target) in [
        (cash.id, TargetRef::Category(food.id)),
        (cash.id, TargetRef::Saving(car.id)),
        (card.id, TargetRef::Category(food.id)),
    ] {
        engine
            .create_transaction(
                TransactionIntent::new(wallet_id, money(dec!(20)), date(2024, 5, 2), target),
                "alice",
            )
            .await
            .unwrap();
    }

    engine.delete_wallet(cash.id, "alice").await.unwrap();

    assert_eq!(
        engine.wallet(cash.id, "alice").await,
        Err(EngineError::NotFound("wallet".to_string()))
    );
    let budgets = engine.budgets(date(2024, 5, 1), "alice").await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].id, kept.id);
    let left = engine
        .transactions(&TransactionFilter::default(), "alice")
        .await
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].wallet_id, card.id);
    assert_eq!(
        engine
            .goal(GoalKind::Saving, car.id, "alice")
            .await
            .unwrap()
            .balance,
        money(dec!(20))
    );
}

#[tokio::test]
async fn categories_guard_their_income_flag() {
    let (engine, _db) = engine_with_db().await;

    let cash = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let misc = engine.new_category("Misc", false, "alice").await.unwrap();
    let bonus = engine.new_category("Bonus", false, "alice").await.unwrap();

    // Unused: the flag can flip.
    let bonus = engine
        .update_category(bonus.id, None, Some(true), "alice")
        .await
        .unwrap();
    assert!(bonus.is_income);

    engine
        .create_transaction(
            TransactionIntent::new(
                cash.id,
                money(dec!(5)),
                date(2024, 5, 1),
                TargetRef::Category(misc.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    assert!(matches!(
        engine
            .update_category(misc.id, None, Some(true), "alice")
            .await,
        Err(EngineError::Validation(_))
    ));
    // Same value is not a change.
    engine
        .update_category(misc.id, Some("Other"), Some(false), "alice")
        .await
        .unwrap();
    assert_eq!(
        engine
            .update_category(misc.id, Some(" bonus"), None, "alice")
            .await,
        Err(EngineError::Conflict("bonus".to_string()))
    );
    assert_eq!(
        engine.new_category("OTHER", true, "alice").await,
        Err(EngineError::Conflict("OTHER".to_string()))
    );

    let unchanged = engine
        .update_category(misc.id, None, None, "alice")
        .await
        .unwrap();
    assert_eq!(unchanged.name, "Other");
    assert!(!unchanged.is_income);

    let names: Vec<String> = engine
        .categories("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Bonus", "Other"]);
}

#[tokio::test]
async fn deleting_a_category_removes_its_budgets_and_transactions() {
    let (engine, _db) = engine_with_db().await;

    let cash = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let food = engine.new_category("Food", false, "alice").await.unwrap();
    engine
        .new_budget(food.id, cash.id, money(dec!(50)), date(2024, 5, 1), "alice")
        .await
        .unwrap();
    engine
        .create_transaction(
            TransactionIntent::new(
                cash.id,
                money(dec!(30)),
                date(2024, 5, 1),
                TargetRef::Category(food.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(
        engine.delete_category(food.id, "bob").await,
        Err(EngineError::Forbidden("category".to_string()))
    );
    engine.delete_category(food.id, "alice").await.unwrap();

    assert!(engine.categories("alice").await.unwrap().is_empty());
    assert!(
        engine
            .budgets(date(2024, 5, 1), "alice")
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        engine
            .transactions(&TransactionFilter::default(), "alice")
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        engine.wallet(cash.id, "alice").await.unwrap().balance,
        money(dec!(70))
    );
}

#[tokio::test]
async fn notifications_can_be_dismissed_once() {
    let (engine, _db) = engine_with_db().await;

    let cash = engine
        .new_wallet("Cash", money(dec!(100)), "alice")
        .await
        .unwrap();
    let gift = engine
        .new_goal(NewGoalCmd::saving("Gift", money(dec!(10))), "alice")
        .await
        .unwrap();
    engine
        .create_transaction(
            TransactionIntent::new(
                cash.id,
                money(dec!(10)),
                date(2024, 5, 1),
                TargetRef::Saving(gift.id),
            ),
            "alice",
        )
        .await
        .unwrap();

    let pending = engine.notifications(false, "alice").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].dismissed);

    assert_eq!(
        engine.dismiss_notification(pending[0].id, "bob").await,
        Err(EngineError::Forbidden("notification".to_string()))
    );

    let first = engine
        .dismiss_notification(pending[0].id, "alice")
        .await
        .unwrap();
    assert!(first.dismissed);
    assert!(first.dismissed_at.is_some());

    let second = engine
        .dismiss_notification(pending[0].id, "alice")
        .await
        .unwrap();
    assert!(second.dismissed);

    assert!(engine.notifications(false, "alice").await.unwrap().is_empty());
    let all = engine.notifications(true, "alice").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].dismissed_at, second.dismissed_at);
    assert!(engine.notifications(true, "bob").await.unwrap().is_empty());
}
