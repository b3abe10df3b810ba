mod common;

use std::{sync::Arc, time::Duration};

use common::{engine_with_db, engine_with_file_db, insert_child, insert_reward, parent, seed_earn};
use engine::{
    Actor, Balance, EngineError, LedgerSettings, PointTransaction, PointsCmd, PurchaseListFilter,
    PurchaseStatus, TransactionKind,
};

#[tokio::test]
async fn request_reserves_the_reward_price() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 100).await;
    let bike = insert_reward(&db, "Bike", 60, true).await;

    let purchase = engine
        .request_purchase(&Actor::child(anna), anna, bike)
        .await
        .unwrap();
    assert_eq!(purchase.status, PurchaseStatus::Pending);
    assert_eq!(purchase.cost_points, 60);
    assert_eq!(purchase.reward_name.as_deref(), Some("Bike"));
    assert!(purchase.decided_at.is_none());

    let balance = engine.balance(&parent(), anna).await.unwrap();
    assert_eq!(balance, Balance::new(100, 60));
    assert_eq!(balance.available_points, 40);
    // Nothing hits the ledger until approval.
    assert_eq!(engine.ledger(&parent(), anna).await.unwrap().len(), 1);
}

#[tokio::test]
async fn approve_turns_reservation_into_spend() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 100).await;
    let bike = insert_reward(&db, "Bike", 60, true).await;

    let purchase = engine
        .request_purchase(&parent(), anna, bike)
        .await
        .unwrap();
    let approved = engine
        .approve_purchase(&parent(), purchase.id)
        .await
        .unwrap();
    assert_eq!(approved.status, PurchaseStatus::Approved);
    assert!(approved.decided_at.is_some());

    let ledger = engine.ledger(&parent(), anna).await.unwrap();
    let spend = ledger.last().unwrap();
    assert_eq!(spend.kind, TransactionKind::Spend);
    assert_eq!(spend.points, 60);
    assert_eq!(spend.reason.as_deref(), Some("purchase"));
    assert_eq!(spend.message.as_deref(), Some("Bike"));

    assert_eq!(
        engine.balance(&parent(), anna).await.unwrap(),
        Balance::new(40, 0)
    );
}

#[tokio::test]
async fn approving_twice_never_charges_twice() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 100).await;
    let bike = insert_reward(&db, "Bike", 60, true).await;

    let purchase = engine
        .request_purchase(&parent(), anna, bike)
        .await
        .unwrap();
    engine
        .approve_purchase(&parent(), purchase.id)
        .await
        .unwrap();
    let err = engine
        .approve_purchase(&parent(), purchase.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let spends = engine
        .ledger(&parent(), anna)
        .await
        .unwrap()
        .into_iter()
        .filter(|tx| tx.kind == TransactionKind::Spend)
        .count();
    assert_eq!(spends, 1);
    assert_eq!(engine.balance(&parent(), anna).await.unwrap().total_points, 40);
}

#[tokio::test]
async fn reject_releases_reservation_without_ledger_entry() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 100).await;
    let bike = insert_reward(&db, "Bike", 60, true).await;

    let purchase = engine
        .request_purchase(&parent(), anna, bike)
        .await
        .unwrap();
    let rejected = engine
        .reject_purchase(&parent(), purchase.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, PurchaseStatus::Rejected);

    assert_eq!(
        engine.balance(&parent(), anna).await.unwrap(),
        Balance::new(100, 0)
    );
    assert_eq!(engine.ledger(&parent(), anna).await.unwrap().len(), 1);

    // Terminal: nothing else may happen to it.
    assert!(matches!(
        engine.approve_purchase(&parent(), purchase.id).await,
        Err(EngineError::InvalidState(_))
    ));
    assert!(matches!(
        engine.cancel_purchase(&Actor::child(anna), purchase.id).await,
        Err(EngineError::InvalidState(_))
    ));
}

#[tokio::test]
async fn cancel_is_reserved_to_the_requesting_child() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    let ben = insert_child(&db, "Ben").await;
    seed_earn(&db, anna, 30).await;
    let kite = insert_reward(&db, "Kite", 20, true).await;

    let purchase = engine
        .request_purchase(&Actor::child(anna), anna, kite)
        .await
        .unwrap();

    assert!(matches!(
        engine.cancel_purchase(&Actor::child(ben), purchase.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.cancel_purchase(&parent(), purchase.id).await,
        Err(EngineError::Forbidden(_))
    ));

    let cancelled = engine
        .cancel_purchase(&Actor::child(anna), purchase.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, PurchaseStatus::Cancelled);
    assert_eq!(
        engine.balance(&parent(), anna).await.unwrap(),
        Balance::new(30, 0)
    );
}

#[tokio::test]
async fn children_cannot_decide_purchases() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 30).await;
    let kite = insert_reward(&db, "Kite", 20, true).await;

    let purchase = engine
        .request_purchase(&Actor::child(anna), anna, kite)
        .await
        .unwrap();
    assert!(matches!(
        engine.approve_purchase(&Actor::child(anna), purchase.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.reject_purchase(&Actor::child(anna), purchase.id).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn child_cannot_request_for_a_sibling() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    let ben = insert_child(&db, "Ben").await;
    seed_earn(&db, ben, 30).await;
    let kite = insert_reward(&db, "Kite", 20, true).await;

    assert!(matches!(
        engine.request_purchase(&Actor::child(anna), ben, kite).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn request_needs_an_active_reward() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 30).await;
    let retired = insert_reward(&db, "Old game", 5, false).await;

    assert_eq!(
        engine
            .request_purchase(&parent(), anna, retired)
            .await
            .unwrap_err(),
        EngineError::RewardNotAvailable(format!("reward {retired} is not active"))
    );
    assert_eq!(
        engine.request_purchase(&parent(), anna, 404).await.unwrap_err(),
        EngineError::RewardNotAvailable("reward 404 not found".to_string())
    );
}

#[tokio::test]
async fn request_for_unknown_child() {
    let (engine, db) = engine_with_db().await;
    let kite = insert_reward(&db, "Kite", 5, true).await;

    assert_eq!(
        engine.request_purchase(&parent(), 7, kite).await.unwrap_err(),
        EngineError::UnknownChild(vec![7])
    );
}

#[tokio::test]
async fn unknown_purchase_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(
        engine.approve_purchase(&parent(), 12).await.unwrap_err(),
        EngineError::KeyNotFound("purchase 12".to_string())
    );
}

#[tokio::test]
async fn reservation_blocks_requests_until_rejected() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    let ten = insert_reward(&db, "Cinema", 10, true).await;
    let one = insert_reward(&db, "Sticker", 1, true).await;
    let child = Actor::child(anna);

    engine
        .award(&parent(), PointsCmd::new([anna], 10))
        .await
        .unwrap();
    let cinema = engine.request_purchase(&child, anna, ten).await.unwrap();

    assert_eq!(
        engine.request_purchase(&child, anna, one).await.unwrap_err(),
        EngineError::InsufficientPoints {
            required: 1,
            available: 0
        }
    );

    engine.reject_purchase(&parent(), cinema.id).await.unwrap();
    let sticker = engine.request_purchase(&child, anna, one).await.unwrap();
    assert_eq!(sticker.status, PurchaseStatus::Pending);
    assert_eq!(
        engine.balance(&child, anna).await.unwrap(),
        Balance::new(10, 1)
    );
}

#[tokio::test]
async fn listing_filters_by_status_and_child() {
    let (engine, db) = engine_with_db().await;
    let anna = insert_child(&db, "Anna").await;
    let ben = insert_child(&db, "Ben").await;
    seed_earn(&db, anna, 50).await;
    seed_earn(&db, ben, 50).await;
    let kite = insert_reward(&db, "Kite", 10, true).await;

    let first = engine.request_purchase(&parent(), anna, kite).await.unwrap();
    let second = engine.request_purchase(&parent(), anna, kite).await.unwrap();
    let bens = engine.request_purchase(&parent(), ben, kite).await.unwrap();
    engine.approve_purchase(&parent(), first.id).await.unwrap();

    let pending = engine
        .list_purchases(&parent(), &PurchaseListFilter::pending())
        .await
        .unwrap();
    let ids: Vec<i64> = pending.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![bens.id, second.id]);
    assert!(pending.iter().all(|p| p.reward_name.as_deref() == Some("Kite")));

    let annas = engine
        .list_purchases(&parent(), &PurchaseListFilter::default().child(anna))
        .await
        .unwrap();
    let ids: Vec<i64> = annas.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    // A child only ever sees its own requests.
    let own = engine
        .list_purchases(&Actor::child(ben), &PurchaseListFilter::default())
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, bens.id);
    assert!(matches!(
        engine
            .list_purchases(&Actor::child(ben), &PurchaseListFilter::default().child(anna))
            .await,
        Err(EngineError::Forbidden(_))
    ));
}

fn pooled_settings() -> LedgerSettings {
    LedgerSettings {
        lock_timeout: Duration::from_secs(10),
        ..LedgerSettings::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_cannot_overspend() {
    let (engine, db, path) = engine_with_file_db(pooled_settings()).await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 100).await;
    let bike = insert_reward(&db, "Bike", 60, true).await;
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .request_purchase(&Actor::child(anna), anna, bike)
                .await
        }));
    }

    let mut ok = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(EngineError::InsufficientPoints { required, available }) => {
                assert_eq!((required, available), (60, 40));
                refused += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((ok, refused), (1, 3));

    let balance = engine.balance(&parent(), anna).await.unwrap();
    assert_eq!(balance, Balance::new(100, 60));
    let pending = engine
        .list_purchases(&parent(), &PurchaseListFilter::pending())
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    drop(engine);
    db.close().await.unwrap();
    let _ = std::fs::remove_file(path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn approve_and_cancel_race_settles_once() {
    let (engine, db, path) = engine_with_file_db(pooled_settings()).await;
    let anna = insert_child(&db, "Anna").await;
    seed_earn(&db, anna, 100).await;
    let bike = insert_reward(&db, "Bike", 60, true).await;
    let purchase = engine
        .request_purchase(&Actor::child(anna), anna, bike)
        .await
        .unwrap();
    let engine = Arc::new(engine);

    let approve = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.approve_purchase(&parent(), purchase.id).await })
    };
    let cancel = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .cancel_purchase(&Actor::child(anna), purchase.id)
                .await
        })
    };
    let approved = approve.await.unwrap();
    let cancelled = cancel.await.unwrap();

    let spends = |ledger: &[PointTransaction]| {
        ledger
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Spend)
            .count()
    };
    let ledger = engine.ledger(&parent(), anna).await.unwrap();
    let balance = engine.balance(&parent(), anna).await.unwrap();
    match (approved, cancelled) {
        (Ok(p), Err(EngineError::InvalidState(_))) => {
            assert_eq!(p.status, PurchaseStatus::Approved);
            assert_eq!(spends(&ledger), 1);
            assert_eq!(balance, Balance::new(40, 0));
        }
        (Err(EngineError::InvalidState(_)), Ok(p)) => {
            assert_eq!(p.status, PurchaseStatus::Cancelled);
            assert_eq!(spends(&ledger), 0);
            assert_eq!(balance, Balance::new(100, 0));
        }
        (a, c) => panic!("expected exactly one winner, got {a:?} and {c:?}"),
    }

    drop(engine);
    db.close().await.unwrap();
    let _ = std::fs::remove_file(path);
}
