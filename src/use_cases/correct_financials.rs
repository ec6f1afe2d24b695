//! Financial field correction use case.
//! A narrow treasury-only path to revise monetary fields on a transaction
//! that is still pending. Touches nothing but the five monetary fields and
//! `updated_at`; status, verification, and audit identities are untouched.

use bigdecimal::BigDecimal;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{policy, Action, Actor, PolicyConfig, Transaction};
use crate::error::AppError;
use crate::ports::{TransactionStore, WriteGuard};
use crate::validation;

/// Partial update; `None` leaves the field as stored.
#[derive(Debug, Clone, Default)]
pub struct FinancialCorrection {
    pub amount: Option<BigDecimal>,
    pub amount_requested: Option<BigDecimal>,
    pub cedi_balance: Option<BigDecimal>,
    pub loan_limit: Option<BigDecimal>,
    pub loan_balance: Option<BigDecimal>,
}

pub struct CorrectFinancials {
    store: Arc<dyn TransactionStore>,
    config: PolicyConfig,
}

impl CorrectFinancials {
    pub fn new(store: Arc<dyn TransactionStore>, config: PolicyConfig) -> Self {
        Self { store, config }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        correction: FinancialCorrection,
    ) -> Result<Transaction, AppError> {
        let mut tx = self.store.get(id).await?;
        policy::authorize(actor, &tx, Action::EditFinancials, &self.config)?;

        apply(&mut tx, correction)?;
        tx.updated_at = Utc::now();

        let stored = self
            .store
            .update_guarded(&tx, WriteGuard::pending(), actor.id)
            .await?;

        tracing::info!("transaction {} financials corrected by {}", id, actor.id);
        Ok(stored)
    }
}

fn apply(
    tx: &mut Transaction,
    correction: FinancialCorrection,
) -> Result<(), validation::ValidationError> {
    if let Some(amount) = correction.amount {
        validation::validate_non_negative_amount("amount", &amount)?;
        tx.amount = amount;
    }
    if let Some(amount_requested) = correction.amount_requested {
        validation::validate_non_negative_amount("amount_requested", &amount_requested)?;
        tx.amount_requested = amount_requested;
    }
    if let Some(cedi_balance) = correction.cedi_balance {
        validation::validate_non_negative_amount("cedi_balance", &cedi_balance)?;
        tx.cedi_balance = cedi_balance;
    }
    if let Some(loan_limit) = correction.loan_limit {
        validation::validate_non_negative_amount("loan_limit", &loan_limit)?;
        tx.loan_limit = loan_limit;
    }
    if let Some(loan_balance) = correction.loan_balance {
        validation::validate_non_negative_amount("loan_balance", &loan_balance)?;
        tx.loan_balance = loan_balance;
    }
    Ok(())
}
