//! Generate report use case.
//! Snapshots the approved transactions for the requested day, hands them to
//! the report service together with the operator's indicative rates, and
//! returns the finished bundle. The artifact is all-or-nothing: a failure
//! leaves nothing visible to the caller.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::{policy, Action, Actor, Role, Transaction, TransactionStatus};
use crate::error::AppError;
use crate::ports::{
    Page, RateInputs, ReportBundle, ReportGenerator, TransactionFilter, TransactionStore,
};
use crate::use_cases::retry_read;
use crate::validation;

const SNAPSHOT_PAGE_SIZE: i64 = 500;

pub struct GenerateReport {
    store: Arc<dyn TransactionStore>,
    generator: Arc<dyn ReportGenerator>,
}

impl GenerateReport {
    pub fn new(store: Arc<dyn TransactionStore>, generator: Arc<dyn ReportGenerator>) -> Self {
        Self { store, generator }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        rates: RateInputs,
        as_of: NaiveDate,
    ) -> Result<ReportBundle, AppError> {
        if !matches!(actor.role, Role::Treasury | Role::Admin) {
            return Err(policy::Forbidden::RoleNotPermitted {
                role: actor.role,
                action: Action::View,
            }
            .into());
        }

        validation::validate_non_negative_amount("indicative_buying", &rates.indicative_buying)?;
        validation::validate_non_negative_amount("indicative_selling", &rates.indicative_selling)?;

        let approved = self.approved_snapshot(as_of).await?;
        tracing::info!(
            "generating report over {} approved transactions as of {}",
            approved.len(),
            as_of
        );

        let bundle = self.generator.generate(&rates, &approved).await?;
        Ok(bundle)
    }

    async fn approved_snapshot(&self, as_of: NaiveDate) -> Result<Vec<Transaction>, AppError> {
        let filter = TransactionFilter {
            status: Some(TransactionStatus::Approved),
            created_by: None,
        };

        let mut approved = Vec::new();
        let mut page_number = 1;
        loop {
            let page = Page {
                number: page_number,
                size: SNAPSHOT_PAGE_SIZE,
            };
            let result = retry_read(|| self.store.list(&filter, page)).await?;
            let fetched = result.items.len();
            approved.extend(result.items);
            if (approved.len() as i64) >= result.total_count || fetched == 0 {
                break;
            }
            page_number += 1;
        }

        approved.retain(|tx| {
            tx.approved_at
                .map(|at| at.date_naive() == as_of)
                .unwrap_or(false)
        });
        Ok(approved)
    }
}
