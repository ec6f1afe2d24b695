//! Lifecycle state machine.
//! Applies the legal transitions of a transaction: pending -> verified
//! (tracked via the documentation flag) -> approved/denied. Every transition
//! authorizes first and then writes its paired audit fields together; a
//! partially applied transition is never observable.

use chrono::{DateTime, Utc};
use std::fmt;

use super::policy::{self, Action, Forbidden, PolicyConfig};
use super::transaction::{Actor, Transaction};

/// Outcome of a trade review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Deny,
}

impl ReviewDecision {
    pub fn target_status(&self) -> super::transaction::TransactionStatus {
        match self {
            ReviewDecision::Approve => super::transaction::TransactionStatus::Approved,
            ReviewDecision::Deny => super::transaction::TransactionStatus::Denied,
        }
    }

    fn action(&self) -> Action {
        match self {
            ReviewDecision::Approve => Action::Approve,
            ReviewDecision::Deny => Action::Deny,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewDecision::Approve => f.write_str("approve"),
            ReviewDecision::Deny => f.write_str("deny"),
        }
    }
}

/// Treasury attestation that supporting documentation is complete.
/// Sets `documentation_verified` plus both verification audit fields.
pub fn verify(
    tx: &mut Transaction,
    actor: &Actor,
    config: &PolicyConfig,
    now: DateTime<Utc>,
) -> Result<(), Forbidden> {
    policy::authorize(actor, tx, Action::Verify, config)?;

    tx.documentation_verified = true;
    tx.verified_by = Some(actor.id);
    tx.verified_at = Some(now);
    tx.updated_at = now;
    Ok(())
}

/// Trade approval or denial. Moves the transaction to its terminal status
/// and stamps both review audit fields.
pub fn review(
    tx: &mut Transaction,
    actor: &Actor,
    decision: ReviewDecision,
    config: &PolicyConfig,
    now: DateTime<Utc>,
) -> Result<(), Forbidden> {
    policy::authorize(actor, tx, decision.action(), config)?;

    tx.status = decision.target_status();
    tx.approved_by = Some(actor.id);
    tx.approved_at = Some(now);
    tx.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{NewTransaction, Role, TransactionStatus};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn pending_tx(created_by: Uuid) -> Transaction {
        Transaction::create(
            NewTransaction {
                customer_name: "Acme Ltd".to_string(),
                customer_address: None,
                sector: None,
                nature_of_business: None,
                contact_name: None,
                contact_number: None,
                purpose: None,
                description: None,
                documentation_type: None,
                funding_status: None,
                amount: BigDecimal::from(5_000),
                amount_requested: BigDecimal::from_str("10000.00").unwrap(),
                cedi_balance: BigDecimal::from(0),
                loan_limit: BigDecimal::from(0),
                loan_balance: BigDecimal::from(0),
                tenor: 2,
                uploaded_files: vec![],
            },
            created_by,
            Utc::now(),
        )
    }

    #[test]
    fn full_lifecycle_marketing_treasury_trade() {
        // U1 creates, U2 verifies, U3 approves, U4 is rejected afterwards.
        let u1 = Actor::new(Uuid::new_v4(), Role::Marketing);
        let u2 = Actor::new(Uuid::new_v4(), Role::Treasury);
        let u3 = Actor::new(Uuid::new_v4(), Role::Trade);
        let u4 = Actor::new(Uuid::new_v4(), Role::Trade);
        let config = PolicyConfig::default();

        let mut tx = pending_tx(u1.id);
        assert_eq!(tx.amount_requested, BigDecimal::from_str("10000.00").unwrap());

        verify(&mut tx, &u2, &config, Utc::now()).unwrap();
        assert!(tx.documentation_verified);
        assert_eq!(tx.verified_by, Some(u2.id));
        assert!(tx.verified_at.is_some());

        review(&mut tx, &u3, ReviewDecision::Approve, &config, Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::Approved);
        assert_eq!(tx.approved_by, Some(u3.id));
        assert!(tx.approved_at.is_some());

        let err = review(&mut tx, &u4, ReviewDecision::Deny, &config, Utc::now()).unwrap_err();
        assert_eq!(err, Forbidden::TerminalState);
        assert_eq!(err.to_string(), "terminal state");
        // No resurrection: terminal fields are untouched by the failed call.
        assert_eq!(tx.status, TransactionStatus::Approved);
        assert_eq!(tx.approved_by, Some(u3.id));
    }

    #[test]
    fn self_approval_fails_before_any_mutation() {
        let creator = Actor::new(Uuid::new_v4(), Role::Trade);
        let mut tx = pending_tx(creator.id);
        tx.documentation_verified = true;
        let before = tx.clone();
        let config = PolicyConfig::default();

        let err =
            review(&mut tx, &creator, ReviewDecision::Approve, &config, Utc::now()).unwrap_err();
        assert_eq!(err, Forbidden::SelfApproval);
        assert_eq!(err.to_string(), "self-approval");
        assert_eq!(tx.status, before.status);
        assert_eq!(tx.approved_by, before.approved_by);
        assert_eq!(tx.approved_at, before.approved_at);
        assert_eq!(tx.updated_at, before.updated_at);
    }

    #[test]
    fn deny_sets_the_same_audit_pair_as_approve() {
        let reviewer = Actor::new(Uuid::new_v4(), Role::Trade);
        let verifier = Actor::new(Uuid::new_v4(), Role::Treasury);
        let mut tx = pending_tx(Uuid::new_v4());
        let config = PolicyConfig::default();

        verify(&mut tx, &verifier, &config, Utc::now()).unwrap();
        review(&mut tx, &reviewer, ReviewDecision::Deny, &config, Utc::now()).unwrap();

        assert_eq!(tx.status, TransactionStatus::Denied);
        assert_eq!(tx.approved_by, Some(reviewer.id));
        assert!(tx.approved_at.is_some());
    }

    #[test]
    fn audit_pairs_stay_paired() {
        let verifier = Actor::new(Uuid::new_v4(), Role::Treasury);
        let reviewer = Actor::new(Uuid::new_v4(), Role::Trade);
        let config = PolicyConfig::default();
        let mut tx = pending_tx(Uuid::new_v4());

        assert_eq!(tx.verified_by.is_none(), tx.verified_at.is_none());
        assert_eq!(tx.approved_by.is_none(), tx.approved_at.is_none());

        verify(&mut tx, &verifier, &config, Utc::now()).unwrap();
        assert_eq!(tx.verified_by.is_some(), tx.verified_at.is_some());
        assert_eq!(tx.approved_by.is_none(), tx.approved_at.is_none());

        review(&mut tx, &reviewer, ReviewDecision::Approve, &config, Utc::now()).unwrap();
        assert_eq!(tx.approved_by.is_some(), tx.approved_at.is_some());
    }

    #[test]
    fn double_verify_is_rejected() {
        let verifier = Actor::new(Uuid::new_v4(), Role::Treasury);
        let second = Actor::new(Uuid::new_v4(), Role::Treasury);
        let config = PolicyConfig::default();
        let mut tx = pending_tx(Uuid::new_v4());

        verify(&mut tx, &verifier, &config, Utc::now()).unwrap();
        let err = verify(&mut tx, &second, &config, Utc::now()).unwrap_err();
        assert_eq!(err, Forbidden::AlreadyVerified);
        assert_eq!(tx.verified_by, Some(verifier.id));
    }

    #[test]
    fn unverified_review_is_rejected_under_default_policy() {
        let reviewer = Actor::new(Uuid::new_v4(), Role::Trade);
        let config = PolicyConfig::default();
        let mut tx = pending_tx(Uuid::new_v4());

        let err =
            review(&mut tx, &reviewer, ReviewDecision::Approve, &config, Utc::now()).unwrap_err();
        assert_eq!(err, Forbidden::DocumentationNotVerified);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }
}
