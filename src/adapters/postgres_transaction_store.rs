//! Postgres implementation of TransactionStore.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::audit::{AuditLog, ENTITY_TRANSACTION};
use crate::domain::{FileRef, Transaction, TransactionStatus};
use crate::ports::{
    AmountTotals, Page, PageResult, StoreError, StoreResult, TransactionFilter, TransactionStore,
    WriteGuard,
};

/// Postgres-backed transaction store. Guarded writes take a row lock so the
/// precondition still holds at write time; the loser of a race sees
/// `Conflict`.
#[derive(Clone)]
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &TransactionFilter) -> (String, Vec<FilterValue>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        let mut param_count = 1;

        if let Some(status) = filter.status {
            conditions.push(format!("status = ${}", param_count));
            params.push(FilterValue::Status(status));
            param_count += 1;
        }

        if let Some(created_by) = filter.created_by {
            conditions.push(format!("created_by = ${}", param_count));
            params.push(FilterValue::Id(created_by));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (clause, params)
    }
}

enum FilterValue {
    Status(TransactionStatus),
    Id(Uuid),
}

fn bind_filters<'q, O>(
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    params: &'q [FilterValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for param in params {
        query = match param {
            FilterValue::Status(status) => query.bind(status.as_str()),
            FilterValue::Id(id) => query.bind(*id),
        };
    }
    query
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn insert(&self, tx: &Transaction) -> StoreResult<Transaction> {
        let mut dbtx = self.pool.begin().await.map_err(StoreError::from)?;

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (
                id, customer_name, customer_address, sector, nature_of_business,
                contact_name, contact_number, purpose, description,
                documentation_type, funding_status,
                amount, amount_requested, cedi_balance, loan_limit, loan_balance,
                tenor, uploaded_files, status, documentation_verified,
                created_by, created_at, updated_at,
                verified_by, verified_at, approved_by, approved_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            RETURNING *
            "#,
        )
        .bind(tx.id)
        .bind(&tx.customer_name)
        .bind(&tx.customer_address)
        .bind(&tx.sector)
        .bind(&tx.nature_of_business)
        .bind(&tx.contact_name)
        .bind(&tx.contact_number)
        .bind(&tx.purpose)
        .bind(&tx.description)
        .bind(&tx.documentation_type)
        .bind(&tx.funding_status)
        .bind(&tx.amount)
        .bind(&tx.amount_requested)
        .bind(&tx.cedi_balance)
        .bind(&tx.loan_limit)
        .bind(&tx.loan_balance)
        .bind(tx.tenor)
        .bind(sqlx::types::Json(tx.uploaded_files.clone()))
        .bind(tx.status.as_str())
        .bind(tx.documentation_verified)
        .bind(tx.created_by)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .bind(tx.verified_by)
        .bind(tx.verified_at)
        .bind(tx.approved_by)
        .bind(tx.approved_at)
        .fetch_one(&mut *dbtx)
        .await
        .map_err(StoreError::from)?;

        AuditLog::log_creation(
            &mut dbtx,
            tx.id,
            ENTITY_TRANSACTION,
            json!({
                "customer_name": tx.customer_name,
                "amount": tx.amount.to_string(),
                "amount_requested": tx.amount_requested.to_string(),
                "status": tx.status.as_str(),
            }),
            &tx.created_by.to_string(),
        )
        .await
        .map_err(StoreError::from)?;

        dbtx.commit().await.map_err(StoreError::from)?;

        row.into_domain()
    }

    async fn get(&self, id: Uuid) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        row.ok_or_else(|| StoreError::NotFound(format!("transaction {id}")))?
            .into_domain()
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> StoreResult<PageResult<Transaction>> {
        let (where_clause, params) = Self::where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM transactions {}", where_clause);
        let (total_count,): (i64,) =
            bind_filters(sqlx::query_as(&count_sql), &params)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from)?;

        let list_sql = format!(
            "SELECT * FROM transactions {} ORDER BY created_at DESC, id LIMIT {} OFFSET {}",
            where_clause,
            page.size,
            page.offset()
        );
        let rows = bind_filters(sqlx::query_as::<_, TransactionRow>(&list_sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.into_domain())
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(PageResult { items, total_count })
    }

    async fn totals(&self, filter: &TransactionFilter) -> StoreResult<AmountTotals> {
        let (where_clause, params) = Self::where_clause(filter);

        let sql = format!(
            r#"
            SELECT
                COALESCE(SUM(amount), 0) AS total,
                COALESCE(SUM(amount) FILTER (WHERE status = 'pending'), 0) AS pending,
                COALESCE(SUM(amount) FILTER (WHERE status = 'approved'), 0) AS approved
            FROM transactions {}
            "#,
            where_clause
        );

        let (total, pending, approved): (BigDecimal, BigDecimal, BigDecimal) =
            bind_filters(sqlx::query_as(&sql), &params)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from)?;

        Ok(AmountTotals {
            total,
            pending,
            approved,
        })
    }

    async fn update_guarded(
        &self,
        tx: &Transaction,
        guard: WriteGuard,
        actor: Uuid,
    ) -> StoreResult<Transaction> {
        let mut dbtx = self.pool.begin().await.map_err(StoreError::from)?;

        let existing =
            sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
                .bind(tx.id)
                .fetch_optional(&mut *dbtx)
                .await
                .map_err(StoreError::from)?
                .ok_or_else(|| StoreError::NotFound(format!("transaction {}", tx.id)))?
                .into_domain()?;

        if existing.status != guard.expected_status
            || (guard.expect_unverified && existing.documentation_verified)
        {
            return Err(StoreError::Conflict(format!(
                "transaction {} is no longer {}",
                tx.id,
                guard.expected_status.as_str()
            )));
        }

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions SET
                status = $2,
                documentation_verified = $3,
                verified_by = $4,
                verified_at = $5,
                approved_by = $6,
                approved_at = $7,
                amount = $8,
                amount_requested = $9,
                cedi_balance = $10,
                loan_limit = $11,
                loan_balance = $12,
                updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tx.id)
        .bind(tx.status.as_str())
        .bind(tx.documentation_verified)
        .bind(tx.verified_by)
        .bind(tx.verified_at)
        .bind(tx.approved_by)
        .bind(tx.approved_at)
        .bind(&tx.amount)
        .bind(&tx.amount_requested)
        .bind(&tx.cedi_balance)
        .bind(&tx.loan_limit)
        .bind(&tx.loan_balance)
        .bind(tx.updated_at)
        .fetch_one(&mut *dbtx)
        .await
        .map_err(StoreError::from)?;

        AuditLog::log_update(
            &mut dbtx,
            tx.id,
            ENTITY_TRANSACTION,
            "update",
            json!({
                "status": existing.status.as_str(),
                "documentation_verified": existing.documentation_verified,
                "amount": existing.amount.to_string(),
            }),
            json!({
                "status": tx.status.as_str(),
                "documentation_verified": tx.documentation_verified,
                "amount": tx.amount.to_string(),
            }),
            &actor.to_string(),
        )
        .await
        .map_err(StoreError::from)?;

        dbtx.commit().await.map_err(StoreError::from)?;

        row.into_domain()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    customer_name: String,
    customer_address: Option<String>,
    sector: Option<String>,
    nature_of_business: Option<String>,
    contact_name: Option<String>,
    contact_number: Option<String>,
    purpose: Option<String>,
    description: Option<String>,
    documentation_type: Option<String>,
    funding_status: Option<String>,
    amount: BigDecimal,
    amount_requested: BigDecimal,
    cedi_balance: BigDecimal,
    loan_limit: BigDecimal,
    loan_balance: BigDecimal,
    tenor: i32,
    uploaded_files: sqlx::types::Json<Vec<FileRef>>,
    status: String,
    documentation_verified: bool,
    created_by: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    verified_by: Option<Uuid>,
    verified_at: Option<chrono::DateTime<chrono::Utc>>,
    approved_by: Option<Uuid>,
    approved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TransactionRow {
    fn into_domain(self) -> StoreResult<Transaction> {
        let status = self
            .status
            .parse::<TransactionStatus>()
            .map_err(StoreError::Upstream)?;

        Ok(Transaction {
            id: self.id,
            customer_name: self.customer_name,
            customer_address: self.customer_address,
            sector: self.sector,
            nature_of_business: self.nature_of_business,
            contact_name: self.contact_name,
            contact_number: self.contact_number,
            purpose: self.purpose,
            description: self.description,
            documentation_type: self.documentation_type,
            funding_status: self.funding_status,
            amount: self.amount,
            amount_requested: self.amount_requested,
            cedi_balance: self.cedi_balance,
            loan_limit: self.loan_limit,
            loan_balance: self.loan_balance,
            tenor: self.tenor,
            uploaded_files: self.uploaded_files.0,
            status,
            documentation_verified: self.documentation_verified,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            verified_by: self.verified_by,
            verified_at: self.verified_at,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
        })
    }
}
