use crate::diff;
use crate::models::{AuditAction, AuditEntry, AuditRecord, FieldChange};
use async_trait::async_trait;
use chrono::Utc;
use faredesk_core::identity::Actor;
use faredesk_core::CoreResult;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Append-only destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: AuditRecord) -> CoreResult<()>;
}

/// Best-effort audit writer.
///
/// The write is spawned and detached from the caller's transaction: a failed
/// audit write is logged and must never roll back or fail the primary
/// mutation. Callers get the join handle back and may await it when they care
/// about completion (tests do), but nothing forces them to.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Build an entry for a freshly created entity: every persisted field is
    /// recorded as null -> value, minus identity/timestamp fields.
    pub fn creation_entry(actor: &Actor, snapshot: Value) -> AuditEntry {
        let changes = diff::creation_changes(&snapshot, diff::IDENTITY_FIELDS);
        Self::entry(actor, AuditAction::Create, changes, snapshot)
    }

    /// Build an entry for a deleted entity: value -> null per field.
    pub fn deletion_entry(actor: &Actor, snapshot: Value) -> AuditEntry {
        let changes = diff::deletion_changes(&snapshot, diff::IDENTITY_FIELDS);
        Self::entry(actor, AuditAction::Delete, changes, snapshot)
    }

    pub fn entry(
        actor: &Actor,
        action: AuditAction,
        changes: BTreeMap<String, FieldChange>,
        snapshot: Value,
    ) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            actor_id: actor.id.clone(),
            actor_email: actor.email.clone(),
            action,
            changes,
            snapshot,
            recorded_at: Utc::now(),
        }
    }

    /// Fire-and-forget append with error capture.
    pub fn record(&self, record: AuditRecord) -> JoinHandle<()> {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let entity = record.entity();
            if let Err(e) = sink.append(record).await {
                tracing::warn!("Audit write failed for {} record: {}", entity, e);
            }
        })
    }

    /// UPDATE records are only written when the diff is non-empty; a no-op
    /// edit produces no audit row at all.
    pub fn record_update<F>(&self, entry: AuditEntry, wrap: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(AuditEntry) -> AuditRecord,
    {
        if entry.changes.is_empty() {
            return None;
        }
        Some(self.record(wrap(entry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct VecSink {
        records: Mutex<Vec<AuditRecord>>,
    }

    #[async_trait]
    impl AuditSink for VecSink {
        async fn append(&self, record: AuditRecord) -> CoreResult<()> {
            self.records.lock().unwrap().push(record);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _record: AuditRecord) -> CoreResult<()> {
            Err(faredesk_core::CoreError::Internal("sink down".to_string()))
        }
    }

    fn actor() -> Actor {
        Actor {
            id: "admin-1".to_string(),
            email: "ops@example.com".to_string(),
            name: "Ops Admin".to_string(),
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn test_creation_entry_synthesizes_full_diff() {
        let snapshot = json!({"id": "t1", "pnr": "AB12CD", "sale_price": 5000, "created_at": "x"});
        let entry = AuditRecorder::creation_entry(&actor(), snapshot);

        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.changes.len(), 2);
        assert_eq!(entry.changes["pnr"].to, json!("AB12CD"));
        assert!(!entry.changes.contains_key("id"));
    }

    #[tokio::test]
    async fn test_record_appends_to_sink() {
        let sink = Arc::new(VecSink {
            records: Mutex::new(Vec::new()),
        });
        let recorder = AuditRecorder::new(sink.clone());

        let entry = AuditRecorder::creation_entry(&actor(), json!({"pnr": "AB12CD"}));
        recorder.record(AuditRecord::Ticket(entry)).await.unwrap();

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity(), "TICKET");
    }

    #[tokio::test]
    async fn test_empty_update_is_skipped() {
        let sink = Arc::new(VecSink {
            records: Mutex::new(Vec::new()),
        });
        let recorder = AuditRecorder::new(sink.clone());

        let entry = AuditRecorder::entry(
            &actor(),
            AuditAction::Update,
            BTreeMap::new(),
            json!({}),
        );
        assert!(recorder.record_update(entry, AuditRecord::Booking).is_none());
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_panic_the_task() {
        let recorder = AuditRecorder::new(Arc::new(FailingSink));
        let entry = AuditRecorder::creation_entry(&actor(), json!({"pnr": "AB12CD"}));
        // The spawned task swallows the error; joining must succeed.
        recorder.record(AuditRecord::Ticket(entry)).await.unwrap();
    }
}
