//! In-memory implementation of TransactionStore. Backs the integration
//! tests; the mutex gives the same guarded-write semantics as the Postgres
//! adapter's row lock.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::ports::{
    AmountTotals, Page, PageResult, StoreError, StoreResult, TransactionFilter, TransactionStore,
    WriteGuard,
};

/// Mirror of the audit row the Postgres adapter writes alongside a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub entity_id: Uuid,
    pub action: String,
    pub actor: Uuid,
}

#[derive(Default)]
pub struct InMemoryTransactionStore {
    inner: Mutex<HashMap<Uuid, Transaction>>,
    audit: Mutex<Vec<AuditEntry>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.lock().expect("audit mutex poisoned").clone()
    }

    fn matches(filter: &TransactionFilter, tx: &Transaction) -> bool {
        if let Some(status) = filter.status {
            if tx.status != status {
                return false;
            }
        }
        if let Some(created_by) = filter.created_by {
            if tx.created_by != created_by {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, tx: &Transaction) -> StoreResult<Transaction> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.contains_key(&tx.id) {
            return Err(StoreError::Conflict(format!(
                "transaction {} already exists",
                tx.id
            )));
        }
        inner.insert(tx.id, tx.clone());
        self.audit
            .lock()
            .expect("audit mutex poisoned")
            .push(AuditEntry {
                entity_id: tx.id,
                action: "create".to_string(),
                actor: tx.created_by,
            });
        Ok(tx.clone())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Transaction> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("transaction {id}")))
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> StoreResult<PageResult<Transaction>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut matching: Vec<Transaction> = inner
            .values()
            .filter(|tx| Self::matches(filter, tx))
            .cloned()
            .collect();
        // Newest first, id as a stable tiebreak.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total_count = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.size.max(0) as usize)
            .collect();

        Ok(PageResult { items, total_count })
    }

    async fn totals(&self, filter: &TransactionFilter) -> StoreResult<AmountTotals> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut totals = AmountTotals {
            total: BigDecimal::from(0),
            pending: BigDecimal::from(0),
            approved: BigDecimal::from(0),
        };

        for tx in inner.values().filter(|tx| Self::matches(filter, tx)) {
            totals.total += tx.amount.clone();
            match tx.status {
                TransactionStatus::Pending => totals.pending += tx.amount.clone(),
                TransactionStatus::Approved => totals.approved += tx.amount.clone(),
                TransactionStatus::Denied => {}
            }
        }

        Ok(totals)
    }

    async fn update_guarded(
        &self,
        tx: &Transaction,
        guard: WriteGuard,
        actor: Uuid,
    ) -> StoreResult<Transaction> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let existing = inner
            .get(&tx.id)
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", tx.id)))?;

        if existing.status != guard.expected_status
            || (guard.expect_unverified && existing.documentation_verified)
        {
            return Err(StoreError::Conflict(format!(
                "transaction {} is no longer {}",
                tx.id,
                guard.expected_status.as_str()
            )));
        }

        inner.insert(tx.id, tx.clone());
        self.audit
            .lock()
            .expect("audit mutex poisoned")
            .push(AuditEntry {
                entity_id: tx.id,
                action: "update".to_string(),
                actor,
            });
        Ok(tx.clone())
    }
}
