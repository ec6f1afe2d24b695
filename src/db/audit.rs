//! Audit log rows, written in the same database transaction as the change
//! they describe.

use chrono::Utc;
use sqlx::{Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

pub const ENTITY_TRANSACTION: &str = "transaction";

pub struct AuditLog;

impl AuditLog {
    pub async fn log_creation(
        executor: &mut SqlxTransaction<'_, Postgres>,
        entity_id: Uuid,
        entity_type: &str,
        new_val: serde_json::Value,
        actor: &str,
    ) -> sqlx::Result<()> {
        Self::insert(executor, entity_id, entity_type, "create", None, Some(new_val), actor).await
    }

    pub async fn log_update(
        executor: &mut SqlxTransaction<'_, Postgres>,
        entity_id: Uuid,
        entity_type: &str,
        action: &str,
        old_val: serde_json::Value,
        new_val: serde_json::Value,
        actor: &str,
    ) -> sqlx::Result<()> {
        Self::insert(
            executor,
            entity_id,
            entity_type,
            action,
            Some(old_val),
            Some(new_val),
            actor,
        )
        .await
    }

    async fn insert(
        executor: &mut SqlxTransaction<'_, Postgres>,
        entity_id: Uuid,
        entity_type: &str,
        action: &str,
        old_val: Option<serde_json::Value>,
        new_val: Option<serde_json::Value>,
        actor: &str,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, entity_id, entity_type, action, old_val, new_val, actor, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entity_id)
        .bind(entity_type)
        .bind(action)
        .bind(old_val)
        .bind(new_val)
        .bind(actor)
        .bind(Utc::now())
        .execute(&mut **executor)
        .await?;

        Ok(())
    }
}
