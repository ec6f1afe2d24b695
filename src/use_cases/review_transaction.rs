//! Review transaction use case.
//! Trade approves or denies a pending transaction. The guarded write makes
//! the terminal transition atomic: of two racing reviewers exactly one wins,
//! the other gets Conflict and must re-read.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::lifecycle::{self, ReviewDecision};
use crate::domain::{Actor, PolicyConfig, Transaction};
use crate::error::AppError;
use crate::ports::{TransactionStore, WriteGuard};

pub struct ReviewTransaction {
    store: Arc<dyn TransactionStore>,
    config: PolicyConfig,
}

impl ReviewTransaction {
    pub fn new(store: Arc<dyn TransactionStore>, config: PolicyConfig) -> Self {
        Self { store, config }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        decision: ReviewDecision,
    ) -> Result<Transaction, AppError> {
        let mut tx = self.store.get(id).await?;
        lifecycle::review(&mut tx, actor, decision, &self.config, Utc::now())?;

        let stored = self
            .store
            .update_guarded(&tx, WriteGuard::pending(), actor.id)
            .await?;

        tracing::info!(
            "transaction {} {} by {}",
            id,
            stored.status.as_str(),
            actor.id
        );
        Ok(stored)
    }
}
