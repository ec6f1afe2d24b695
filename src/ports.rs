//! Ports: async traits at the service seams. The domain and use cases only
//! ever talk to these; adapters live in `adapters/` and `services/`.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{FileRef, Role, Transaction, TransactionStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    /// The record's state no longer matched the write precondition.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Upstream(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            other => StoreError::Upstream(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filter for dashboard listings. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub created_by: Option<Uuid>,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }
}

#[derive(Debug, Clone)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

/// Sum reductions over the rows matching a filter; feeds dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountTotals {
    pub total: BigDecimal,
    pub pending: BigDecimal,
    pub approved: BigDecimal,
}

/// Precondition for a guarded write. The store applies the mutation only if
/// the row still satisfies the guard at write time; the loser of a race gets
/// `StoreError::Conflict` and must re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteGuard {
    pub expected_status: TransactionStatus,
    /// Additionally require `documentation_verified = false` (verify races).
    pub expect_unverified: bool,
}

impl WriteGuard {
    pub fn pending() -> Self {
        Self {
            expected_status: TransactionStatus::Pending,
            expect_unverified: false,
        }
    }

    pub fn pending_unverified() -> Self {
        Self {
            expected_status: TransactionStatus::Pending,
            expect_unverified: true,
        }
    }
}

/// Single source of truth for transaction lifecycle state.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, tx: &Transaction) -> StoreResult<Transaction>;

    async fn get(&self, id: Uuid) -> StoreResult<Transaction>;

    async fn list(&self, filter: &TransactionFilter, page: Page)
        -> StoreResult<PageResult<Transaction>>;

    /// Amount sums over every row matching the filter, ignoring pagination.
    async fn totals(&self, filter: &TransactionFilter) -> StoreResult<AmountTotals>;

    /// Atomic conditional update: persists `tx` only while the stored row
    /// still satisfies `guard`. `actor` is recorded on the audit row.
    async fn update_guarded(
        &self,
        tx: &Transaction,
        guard: WriteGuard,
        actor: Uuid,
    ) -> StoreResult<Transaction>;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("identity provider unavailable: {0}")]
    Upstream(String),
}

/// User record as issued by the identity provider; referenced, never owned.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// External identity provider. Issues a token and a role claim per user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn current_user(&self, token: &str) -> Result<User, IdentityError>;
}

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file storage unavailable: {0}")]
    Upstream(String),
}

/// Document storage. Files are immutable once uploaded.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<FileRef, FileStoreError>;

    /// Expiring access URL for a stored file.
    fn access_url(&self, file: &FileRef) -> String;

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError>;
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report generation failed: {0}")]
    Failed(String),
    #[error("report service unavailable: {0}")]
    Upstream(String),
}

/// Operator-supplied indicative rates fed into report generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RateInputs {
    pub indicative_buying: BigDecimal,
    pub indicative_selling: BigDecimal,
}

/// A fully generated, downloadable report artifact. All-or-nothing: either
/// the whole bundle exists or generation failed.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Opaque report generation boundary: takes rate inputs plus a snapshot of
/// approved transactions and produces a downloadable bundle, or fails.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(
        &self,
        rates: &RateInputs,
        approved: &[Transaction],
    ) -> Result<ReportBundle, ReportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_one_based() {
        assert_eq!(Page { number: 1, size: 20 }.offset(), 0);
        assert_eq!(Page { number: 3, size: 10 }.offset(), 20);
    }

    #[test]
    fn sqlx_row_not_found_maps_to_not_found() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
