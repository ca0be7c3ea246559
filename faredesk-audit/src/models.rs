use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// One field's before/after pair inside an audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub from: Value,
    pub to: Value,
}

/// Append-only record of a field-level change to a tracked entity.
/// Never mutated or deleted after the write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: String,
    pub actor_email: String,
    pub action: AuditAction,
    pub changes: BTreeMap<String, FieldChange>,
    /// Denormalized snapshot of the entity after the mutation.
    pub snapshot: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Dedicated audit stream for passenger name corrections: the generic entry
/// shape does not carry the booking/ticket cross references reviewers need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameEditEntry {
    pub id: Uuid,
    pub admin_name: String,
    pub booking_reference: String,
    pub ticket_pnr: String,
    pub old_name: String,
    pub new_name: String,
    pub remarks: String,
    pub recorded_at: DateTime<Utc>,
}

/// Every audit record kind is its own variant with an explicit discriminant,
/// so readers dispatch on the tag instead of probing optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditRecord {
    Ticket(AuditEntry),
    Airline(AuditEntry),
    Location(AuditEntry),
    Admin(AuditEntry),
    Booking(AuditEntry),
    PassengerNameEdit(NameEditEntry),
}

impl AuditRecord {
    pub fn entity(&self) -> &'static str {
        match self {
            AuditRecord::Ticket(_) => "TICKET",
            AuditRecord::Airline(_) => "AIRLINE",
            AuditRecord::Location(_) => "LOCATION",
            AuditRecord::Admin(_) => "ADMIN",
            AuditRecord::Booking(_) => "BOOKING",
            AuditRecord::PassengerNameEdit(_) => "PASSENGER_NAME_EDIT",
        }
    }
}
