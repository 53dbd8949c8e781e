use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    CategoryKey, Engine, EngineError, InitializeBudgetCmd, LedgerEffect, PaymentMethod,
    ReconcilePolicy, ReconcileWarning, Transaction, TransactionDraft, TransactionPatch,
};
use migration::MigratorTrait;

async fn engine_with_db(policy: ReconcilePolicy) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .policy(policy)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn funded_engine() -> Engine {
    let (engine, _db) = engine_with_db(ReconcilePolicy::default()).await;
    engine
        .register_user("alice", "password", 1_000_000)
        .await
        .unwrap();
    engine
        .initialize_budget(
            "alice",
            InitializeBudgetCmd::new(1_000_000)
                .allocate("food", 200_000)
                .allocate("transport", 150_000),
        )
        .await
        .unwrap();
    engine
}

fn expense(amount: i64, category: &str) -> TransactionDraft {
    TransactionDraft::new()
        .amount(amount)
        .category(category)
        .description("nasi goreng")
        .payment_method(PaymentMethod::Qris)
}

fn inserted(effect: &LedgerEffect) -> Transaction {
    match effect {
        LedgerEffect::Insert(tx) => tx.clone(),
        other => panic!("expected insert, got {other:?}"),
    }
}

#[tokio::test]
async fn create_and_delete_scenario() {
    let engine = funded_engine().await;

    let created = engine
        .create_transaction("alice", expense(150_000, "food"))
        .await
        .unwrap();
    let tx = inserted(&created.effect);
    assert!(!created.is_critical());

    let budget = engine.budget("alice").await.unwrap();
    let food = budget.categories.get(CategoryKey::Food);
    assert_eq!(food.spent, 150_000);
    assert_eq!(food.remaining(), 50_000);
    assert_eq!(budget.current_balance, 850_000);
    assert_eq!(budget, created.aggregate);

    let stored = engine.transaction("alice", tx.id).await.unwrap();
    assert_eq!(stored.amount_minor, 150_000);
    assert_eq!(stored.description, "nasi goreng");

    let deleted = engine.delete_transaction("alice", tx.id).await.unwrap();
    assert_eq!(deleted.effect, LedgerEffect::Remove(tx.id));

    let budget = engine.budget("alice").await.unwrap();
    let food = budget.categories.get(CategoryKey::Food);
    assert_eq!(food.spent, 0);
    assert_eq!(food.remaining(), 200_000);
    assert_eq!(budget.current_balance, 1_000_000);

    let err = engine.transaction("alice", tx.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound(format!("transaction {}", tx.id)));
}

#[tokio::test]
async fn update_moves_category() {
    let engine = funded_engine().await;
    let tx = inserted(
        &engine
            .create_transaction("alice", expense(40_000, "food"))
            .await
            .unwrap()
            .effect,
    );

    let updated = engine
        .update_transaction(
            "alice",
            tx.id,
            TransactionPatch::new().category("transport").amount(45_000),
        )
        .await
        .unwrap();
    assert!(matches!(updated.effect, LedgerEffect::Replace(_)));

    let budget = engine.budget("alice").await.unwrap();
    assert_eq!(budget.categories.get(CategoryKey::Food).spent, 0);
    assert_eq!(budget.categories.get(CategoryKey::Transport).spent, 45_000);
    assert_eq!(budget.current_balance, 955_000);

    let stored = engine.transaction("alice", tx.id).await.unwrap();
    assert_eq!(stored.amount_minor, 45_000);
    assert_eq!(stored.category.key(), Some(CategoryKey::Transport));
    assert_eq!(stored.description, "nasi goreng");
    assert_eq!(stored.created_at, tx.created_at);
}

#[tokio::test]
async fn failed_update_persists_nothing() {
    let engine = funded_engine().await;
    let tx = inserted(
        &engine
            .create_transaction("alice", expense(100_000, "food"))
            .await
            .unwrap()
            .effect,
    );
    let before = engine.budget("alice").await.unwrap();

    let err = engine
        .update_transaction("alice", tx.id, TransactionPatch::new().amount(2_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    assert_eq!(engine.budget("alice").await.unwrap(), before);
    assert_eq!(
        engine.transaction("alice", tx.id).await.unwrap().amount_minor,
        100_000
    );
}

#[tokio::test]
async fn other_owner_is_forbidden() {
    let engine = funded_engine().await;
    engine
        .register_user("bob", "secret", 500_000)
        .await
        .unwrap();
    let tx = inserted(
        &engine
            .create_transaction("alice", expense(10_000, "laundry"))
            .await
            .unwrap()
            .effect,
    );

    for err in [
        engine.transaction("bob", tx.id).await.unwrap_err(),
        engine
            .update_transaction("bob", tx.id, TransactionPatch::new().amount(1))
            .await
            .unwrap_err(),
        engine.delete_transaction("bob", tx.id).await.unwrap_err(),
    ] {
        assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");
    }

    let missing = Uuid::new_v4();
    assert!(matches!(
        engine.delete_transaction("alice", missing).await,
        Err(EngineError::NotFound(_))
    ));
    assert_eq!(engine.budget("bob").await.unwrap().current_balance, 500_000);
}

#[tokio::test]
async fn validation_errors_leave_no_trace() {
    let engine = funded_engine().await;
    let before = engine.budget("alice").await.unwrap();

    let err = engine
        .create_transaction("alice", expense(0, "food"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_transaction(
            "alice",
            TransactionDraft::new().amount(10).category("food"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("description".to_string()));

    assert_eq!(engine.budget("alice").await.unwrap(), before);
    assert!(engine.list_transactions("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_amount_is_rejected_before_commit() {
    let engine = funded_engine().await;
    engine
        .create_transaction("alice", expense(i64::MAX, "food"))
        .await
        .unwrap();
    let before = engine.budget("alice").await.unwrap();

    let err = engine
        .create_transaction("alice", expense(i64::MAX, "food"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount out of range".to_string())
    );
    assert_eq!(engine.budget("alice").await.unwrap(), before);
    assert_eq!(engine.list_transactions("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_category_charges_balance_only() {
    let engine = funded_engine().await;
    let created = engine
        .create_transaction("alice", expense(25_000, "wishlist"))
        .await
        .unwrap();
    assert_eq!(
        created.warnings,
        vec![ReconcileWarning::UnknownCategory {
            category: "wishlist".to_string()
        }]
    );
    let budget = engine.budget("alice").await.unwrap();
    assert_eq!(budget.current_balance, 975_000);
    assert_eq!(budget.total_spent(), 0);

    let stored = engine.list_transactions("alice").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category.as_str(), "wishlist");
}

#[tokio::test]
async fn critical_flag_follows_balance() {
    let engine = funded_engine().await;
    let created = engine
        .create_transaction("alice", expense(950_000, "food"))
        .await
        .unwrap();
    assert!(created.is_critical());
    assert_eq!(
        created.alert.as_ref().map(|a| a.message.as_str()),
        Some(engine::CRITICAL_MESSAGE)
    );

    let tx = inserted(&created.effect);
    let deleted = engine.delete_transaction("alice", tx.id).await.unwrap();
    assert!(!deleted.is_critical());
}

#[tokio::test]
async fn list_is_newest_first_and_today_sums_the_day() {
    let engine = funded_engine().await;
    let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();

    for (amount, on) in [(10_000, day(1)), (20_000, day(3)), (5_000, day(2)), (7_500, day(3))] {
        engine
            .create_transaction("alice", expense(amount, "food").occurred_on(on))
            .await
            .unwrap();
    }

    let listed = engine.list_transactions("alice").await.unwrap();
    let days: Vec<NaiveDate> = listed.iter().map(|tx| tx.occurred_on).collect();
    assert_eq!(days, vec![day(3), day(3), day(2), day(1)]);
    assert_eq!(listed[0].amount_minor, 7_500);

    let summary = engine.today_summary("alice", day(3)).await.unwrap();
    assert_eq!(summary.transactions.len(), 2);
    assert_eq!(summary.total_minor, 27_500);

    let empty = engine.today_summary("alice", day(4)).await.unwrap();
    assert!(empty.transactions.is_empty());
    assert_eq!(empty.total_minor, 0);
}

#[tokio::test]
async fn created_without_date_lands_today() {
    let engine = funded_engine().await;
    engine
        .create_transaction("alice", expense(1_000, "supplies"))
        .await
        .unwrap();
    let today = Utc::now().date_naive();
    let summary = engine.today_summary("alice", today).await.unwrap();
    assert_eq!(summary.total_minor, 1_000);
}

#[tokio::test]
async fn concurrent_creates_do_not_lose_updates() {
    let engine = Arc::new(funded_engine().await);

    let mut handles = Vec::new();
    for i in 0..10 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let category = if i % 2 == 0 { "food" } else { "skincare" };
            engine
                .create_transaction("alice", expense(1_000, category))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let budget = engine.budget("alice").await.unwrap();
    assert_eq!(budget.current_balance, 990_000);
    assert_eq!(budget.categories.get(CategoryKey::Food).spent, 5_000);
    assert_eq!(budget.categories.get(CategoryKey::Skincare).spent, 5_000);
    assert_eq!(budget.ledger_drift(), 0);
}
