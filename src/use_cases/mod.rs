pub mod correct_financials;
pub mod create_transaction;
pub mod dashboard;
pub mod generate_report;
pub mod review_transaction;
pub mod verify_documentation;

use crate::ports::{StoreError, StoreResult};
use std::future::Future;

/// Idempotent reads are retried once on upstream failure; writes never are.
pub(crate) async fn retry_read<T, F, Fut>(op: F) -> StoreResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    match op().await {
        Err(StoreError::Upstream(msg)) => {
            tracing::warn!("read failed, retrying once: {}", msg);
            op().await
        }
        other => other,
    }
}
