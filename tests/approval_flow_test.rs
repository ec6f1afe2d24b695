//! End-to-end lifecycle coverage over the in-memory store: the full
//! create -> verify -> approve/deny path, plus the guarantees around
//! concurrent reviews.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use fx_pipeline::adapters::InMemoryTransactionStore;
use fx_pipeline::domain::lifecycle::ReviewDecision;
use fx_pipeline::domain::{Actor, NewTransaction, PolicyConfig, Role, TransactionStatus};
use fx_pipeline::error::AppError;
use fx_pipeline::use_cases::create_transaction::CreateTransaction;
use fx_pipeline::use_cases::review_transaction::ReviewTransaction;
use fx_pipeline::use_cases::verify_documentation::VerifyDocumentation;

fn new_transaction(customer: &str) -> NewTransaction {
    NewTransaction {
        customer_name: customer.to_string(),
        customer_address: Some("12 Harbour Rd".to_string()),
        sector: Some("agriculture".to_string()),
        nature_of_business: None,
        contact_name: None,
        contact_number: None,
        purpose: Some("working capital".to_string()),
        description: None,
        documentation_type: None,
        funding_status: None,
        amount: BigDecimal::from(5_000),
        amount_requested: BigDecimal::from(10_000),
        cedi_balance: BigDecimal::from(0),
        loan_limit: BigDecimal::from(20_000),
        loan_balance: BigDecimal::from(0),
        tenor: 7,
        uploaded_files: vec![],
    }
}

#[tokio::test]
async fn full_approval_flow() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let marketer = Actor::new(Uuid::new_v4(), Role::Marketing);
    let treasurer = Actor::new(Uuid::new_v4(), Role::Treasury);
    let trader = Actor::new(Uuid::new_v4(), Role::Trade);

    let created = CreateTransaction::new(store.clone())
        .execute(&marketer, new_transaction("Acme Ltd"))
        .await
        .unwrap();
    assert_eq!(created.status, TransactionStatus::Pending);
    assert!(!created.documentation_verified);

    let verified = VerifyDocumentation::new(store.clone(), config)
        .execute(&treasurer, created.id)
        .await
        .unwrap();
    assert!(verified.documentation_verified);
    assert_eq!(verified.verified_by, Some(treasurer.id));
    assert!(verified.verified_at.is_some());

    let approved = ReviewTransaction::new(store.clone(), config)
        .execute(&trader, created.id, ReviewDecision::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, TransactionStatus::Approved);
    assert_eq!(approved.approved_by, Some(trader.id));
    assert!(approved.approved_at.is_some());

    // Terminal transactions reject any further transition.
    let err = ReviewTransaction::new(store.clone(), config)
        .execute(&trader, created.id, ReviewDecision::Deny)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(msg) if msg == "terminal state"));
}

#[tokio::test]
async fn denial_is_terminal_too() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let marketer = Actor::new(Uuid::new_v4(), Role::Marketing);
    let treasurer = Actor::new(Uuid::new_v4(), Role::Treasury);
    let trader = Actor::new(Uuid::new_v4(), Role::Trade);

    let created = CreateTransaction::new(store.clone())
        .execute(&marketer, new_transaction("Beta Co"))
        .await
        .unwrap();
    VerifyDocumentation::new(store.clone(), config)
        .execute(&treasurer, created.id)
        .await
        .unwrap();

    let denied = ReviewTransaction::new(store.clone(), config)
        .execute(&trader, created.id, ReviewDecision::Deny)
        .await
        .unwrap();
    assert_eq!(denied.status, TransactionStatus::Denied);
    assert_eq!(denied.approved_by, Some(trader.id));

    let err = ReviewTransaction::new(store, config)
        .execute(&trader, created.id, ReviewDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(msg) if msg == "terminal state"));
}

#[tokio::test]
async fn unverified_transactions_cannot_be_reviewed() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let marketer = Actor::new(Uuid::new_v4(), Role::Marketing);
    let trader = Actor::new(Uuid::new_v4(), Role::Trade);

    let created = CreateTransaction::new(store.clone())
        .execute(&marketer, new_transaction("Gamma Plc"))
        .await
        .unwrap();

    let err = ReviewTransaction::new(store.clone(), config)
        .execute(&trader, created.id, ReviewDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // With the verification gate off the same review goes through.
    let relaxed = PolicyConfig {
        require_verified_review: false,
        ..PolicyConfig::default()
    };
    let approved = ReviewTransaction::new(store, relaxed)
        .execute(&trader, created.id, ReviewDecision::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, TransactionStatus::Approved);
}

#[tokio::test]
async fn creators_cannot_review_their_own_transactions() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let admin = Actor::new(Uuid::new_v4(), Role::Admin);
    let treasurer = Actor::new(Uuid::new_v4(), Role::Treasury);

    let created = CreateTransaction::new(store.clone())
        .execute(&admin, new_transaction("Delta LLC"))
        .await
        .unwrap();
    VerifyDocumentation::new(store.clone(), config)
        .execute(&treasurer, created.id)
        .await
        .unwrap();

    let err = ReviewTransaction::new(store.clone(), config)
        .execute(&admin, created.id, ReviewDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(msg) if msg == "self-approval"));

    // The refused review left the record untouched.
    use fx_pipeline::ports::TransactionStore as _;
    let stored = store.get(created.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
    assert!(stored.approved_by.is_none());
}

// The racing-review guarantee is staged explicitly: both reviewers read the
// same pending row before either writes, so the second guarded write always
// hits a row that no longer satisfies its guard.
#[tokio::test]
async fn exactly_one_racing_review_wins() {
    use chrono::Utc;
    use fx_pipeline::domain::lifecycle;
    use fx_pipeline::ports::{StoreError, TransactionStore as _, WriteGuard};

    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let marketer = Actor::new(Uuid::new_v4(), Role::Marketing);
    let treasurer = Actor::new(Uuid::new_v4(), Role::Treasury);
    let trader_a = Actor::new(Uuid::new_v4(), Role::Trade);
    let trader_b = Actor::new(Uuid::new_v4(), Role::Trade);

    let created = CreateTransaction::new(store.clone())
        .execute(&marketer, new_transaction("Race Ltd"))
        .await
        .unwrap();
    VerifyDocumentation::new(store.clone(), config)
        .execute(&treasurer, created.id)
        .await
        .unwrap();

    // Two stale reads of the same pending, verified row.
    let mut seen_a = store.get(created.id).await.unwrap();
    let mut seen_b = seen_a.clone();
    lifecycle::review(&mut seen_a, &trader_a, ReviewDecision::Approve, &config, Utc::now()).unwrap();
    lifecycle::review(&mut seen_b, &trader_b, ReviewDecision::Deny, &config, Utc::now()).unwrap();

    store
        .update_guarded(&seen_a, WriteGuard::pending(), trader_a.id)
        .await
        .unwrap();
    let err = store
        .update_guarded(&seen_b, WriteGuard::pending(), trader_b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // The winner's decision stands untouched by the losing write.
    let stored = store.get(created.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Approved);
    assert_eq!(stored.approved_by, Some(trader_a.id));
}

// A losing reviewer going through the use case re-reads the now-terminal row
// and is refused there instead.
#[tokio::test]
async fn late_reviewer_after_a_lost_race_gets_terminal_state() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let marketer = Actor::new(Uuid::new_v4(), Role::Marketing);
    let treasurer = Actor::new(Uuid::new_v4(), Role::Treasury);
    let trader_a = Actor::new(Uuid::new_v4(), Role::Trade);
    let trader_b = Actor::new(Uuid::new_v4(), Role::Trade);

    let created = CreateTransaction::new(store.clone())
        .execute(&marketer, new_transaction("Late Ltd"))
        .await
        .unwrap();
    VerifyDocumentation::new(store.clone(), config)
        .execute(&treasurer, created.id)
        .await
        .unwrap();

    ReviewTransaction::new(store.clone(), config)
        .execute(&trader_a, created.id, ReviewDecision::Approve)
        .await
        .unwrap();
    let err = ReviewTransaction::new(store, config)
        .execute(&trader_b, created.id, ReviewDecision::Deny)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(msg) if msg == "terminal state"));
}

#[tokio::test]
async fn exactly_one_racing_verification_wins() {
    use chrono::Utc;
    use fx_pipeline::domain::lifecycle;
    use fx_pipeline::ports::{StoreError, TransactionStore as _, WriteGuard};

    let store = Arc::new(InMemoryTransactionStore::new());
    let config = PolicyConfig::default();
    let marketer = Actor::new(Uuid::new_v4(), Role::Marketing);
    let treasurer_a = Actor::new(Uuid::new_v4(), Role::Treasury);
    let treasurer_b = Actor::new(Uuid::new_v4(), Role::Treasury);

    let created = CreateTransaction::new(store.clone())
        .execute(&marketer, new_transaction("Verify Race"))
        .await
        .unwrap();

    let mut seen_a = store.get(created.id).await.unwrap();
    let mut seen_b = seen_a.clone();
    lifecycle::verify(&mut seen_a, &treasurer_a, &config, Utc::now()).unwrap();
    lifecycle::verify(&mut seen_b, &treasurer_b, &config, Utc::now()).unwrap();

    store
        .update_guarded(&seen_a, WriteGuard::pending_unverified(), treasurer_a.id)
        .await
        .unwrap();
    let err = store
        .update_guarded(&seen_b, WriteGuard::pending_unverified(), treasurer_b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let stored = store.get(created.id).await.unwrap();
    assert_eq!(stored.verified_by, Some(treasurer_a.id));
}
