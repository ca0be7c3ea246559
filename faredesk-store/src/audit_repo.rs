use crate::ticket_repo::db_err;
use async_trait::async_trait;
use faredesk_audit::{AuditEntry, AuditRecord, AuditSink, NameEditEntry};
use faredesk_core::{CoreError, CoreResult};
use sqlx::PgPool;

/// Append-only audit storage. No update or delete statement exists against
/// either table, in code or in the schema's grants.
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn append_entry(&self, entity: &str, entry: &AuditEntry) -> CoreResult<()> {
        let action = match entry.action {
            faredesk_audit::AuditAction::Create => "CREATE",
            faredesk_audit::AuditAction::Update => "UPDATE",
            faredesk_audit::AuditAction::Delete => "DELETE",
        };
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, entity, actor_id, actor_email, action, changes, snapshot, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entity)
        .bind(&entry.actor_id)
        .bind(&entry.actor_email)
        .bind(action)
        .bind(serde_json::to_value(&entry.changes).map_err(|e| CoreError::Internal(e.to_string()))?)
        .bind(&entry.snapshot)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn append_name_edit(&self, entry: &NameEditEntry) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO passenger_name_edits (id, admin_name, booking_reference, ticket_pnr, old_name, new_name, remarks, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.admin_name)
        .bind(&entry.booking_reference)
        .bind(&entry.ticket_pnr)
        .bind(&entry.old_name)
        .bind(&entry.new_name)
        .bind(&entry.remarks)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, record: AuditRecord) -> CoreResult<()> {
        let entity = record.entity();
        match &record {
            AuditRecord::Ticket(entry)
            | AuditRecord::Airline(entry)
            | AuditRecord::Location(entry)
            | AuditRecord::Admin(entry)
            | AuditRecord::Booking(entry) => self.append_entry(entity, entry).await,
            AuditRecord::PassengerNameEdit(entry) => self.append_name_edit(entry).await,
        }
    }
}
