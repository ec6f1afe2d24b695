//! Verify documentation use case.
//! Treasury attests that a pending transaction's documentation is complete.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{lifecycle, Actor, PolicyConfig, Transaction};
use crate::error::AppError;
use crate::ports::{TransactionStore, WriteGuard};

pub struct VerifyDocumentation {
    store: Arc<dyn TransactionStore>,
    config: PolicyConfig,
}

impl VerifyDocumentation {
    pub fn new(store: Arc<dyn TransactionStore>, config: PolicyConfig) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<Transaction, AppError> {
        let mut tx = self.store.get(id).await?;
        lifecycle::verify(&mut tx, actor, &self.config, Utc::now())?;

        // The guard also requires the row to still be unverified, so two
        // concurrent verifications resolve to one winner and one Conflict.
        let stored = self
            .store
            .update_guarded(&tx, WriteGuard::pending_unverified(), actor.id)
            .await?;

        tracing::info!("transaction {} documentation verified by {}", id, actor.id);
        Ok(stored)
    }
}
