//! Dashboard query projections.
//! Role-scoped, filtered, paginated reads over the transaction store, plus
//! the amount aggregates shown on the dashboard cards. Aggregates sum over
//! the currently filtered set, never the unfiltered table.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{policy, Actor, PolicyConfig, Transaction, TransactionStatus};
use crate::error::AppError;
use crate::ports::{AmountTotals, Page, TransactionFilter, TransactionStore};
use crate::use_cases::retry_read;
use crate::validation::ValidationError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct DashboardQuery {
    /// `None` means all statuses.
    pub status: Option<TransactionStatus>,
    pub page: i64,
    pub page_size: i64,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub items: Vec<Transaction>,
    pub total_count: i64,
    pub total_pages: i64,
    pub totals: AmountTotals,
}

pub struct DashboardProjection {
    store: Arc<dyn TransactionStore>,
    config: PolicyConfig,
}

impl DashboardProjection {
    pub fn new(store: Arc<dyn TransactionStore>, config: PolicyConfig) -> Self {
        Self { store, config }
    }

    fn scoped_filter(&self, actor: &Actor, status: Option<TransactionStatus>) -> TransactionFilter {
        TransactionFilter {
            status,
            created_by: if policy::sees_all(actor.role, &self.config) {
                None
            } else {
                Some(actor.id)
            },
        }
    }

    pub async fn list(&self, actor: &Actor, query: DashboardQuery) -> Result<DashboardPage, AppError> {
        if query.page < 1 {
            return Err(ValidationError::new("page", "must be at least 1").into());
        }
        if query.page_size < 1 || query.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::new(
                "page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            )
            .into());
        }

        let filter = self.scoped_filter(actor, query.status);
        let page = Page {
            number: query.page,
            size: query.page_size,
        };

        let result = retry_read(|| self.store.list(&filter, page)).await?;
        let totals = retry_read(|| self.store.totals(&filter)).await?;

        let total_pages = (result.total_count + query.page_size - 1) / query.page_size;

        Ok(DashboardPage {
            items: result.items,
            total_count: result.total_count,
            total_pages,
            totals,
        })
    }

    /// Single-transaction view. Out-of-scope transactions read as missing
    /// rather than forbidden, so their existence is not leaked.
    pub async fn detail(&self, actor: &Actor, id: Uuid) -> Result<Transaction, AppError> {
        let tx = retry_read(|| self.store.get(id)).await?;
        if !policy::visible_to(actor, &tx, &self.config) {
            return Err(AppError::NotFound(format!("transaction {id}")));
        }
        Ok(tx)
    }
}
