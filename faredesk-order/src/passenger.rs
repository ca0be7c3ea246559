use crate::models::{Booking, Passenger, PassengerType};
use crate::repository::BookingRepository;
use chrono::Utc;
use faredesk_audit::{AuditRecord, AuditRecorder, NameEditEntry};
use faredesk_catalog::TicketRepository;
use faredesk_core::identity::Actor;
use faredesk_core::{CoreError, CoreResult};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Partial in-place edit of one passenger on a booking's manifest. Only the
/// fields present in the request are touched.
#[derive(Debug, Clone, Deserialize)]
pub struct EditPassengerRequest {
    pub booking_id: Uuid,
    pub passenger_index: usize,
    pub honorific: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub remarks: Option<String>,
    pub name_edit_remarks: Option<String>,
}

/// In-place passenger mutation gated by the name-edit audit stream: whenever
/// the concatenated full name changes, a dedicated PassengerNameEdit record
/// is written with the supplied remarks.
pub struct PassengerRecordEditor {
    bookings: Arc<dyn BookingRepository>,
    tickets: Arc<dyn TicketRepository>,
    audit: AuditRecorder,
}

impl PassengerRecordEditor {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        tickets: Arc<dyn TicketRepository>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            bookings,
            tickets,
            audit,
        }
    }

    pub async fn edit(&self, actor: &Actor, req: EditPassengerRequest) -> CoreResult<Passenger> {
        let mut booking = self
            .bookings
            .get(req.booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {} not found", req.booking_id)))?;

        if !actor.can_access_bookings_of(&booking.user_id) {
            return Err(CoreError::Forbidden(
                "Only the owning user or an admin may edit this booking".to_string(),
            ));
        }
        if booking.booking_status.is_terminal() {
            return Err(CoreError::Validation(format!(
                "Cannot edit passengers on a {} booking",
                booking.booking_status.as_str()
            )));
        }

        let index = req.passenger_index;
        let passenger = booking.passengers.get_mut(index).ok_or_else(|| {
            CoreError::NotFound(format!(
                "Passenger index {} is out of range for booking {}",
                index, booking.reference
            ))
        })?;

        let old_name = passenger.full_name();

        if let Some(honorific) = &req.honorific {
            passenger.honorific = honorific.clone();
            passenger.passenger_type = PassengerType::from_honorific(honorific);
        }
        if let Some(first_name) = &req.first_name {
            passenger.first_name = first_name.clone();
        }
        if let Some(last_name) = &req.last_name {
            passenger.last_name = last_name.clone();
        }
        if req.remarks.is_some() {
            passenger.remarks = req.remarks.clone();
        }

        let new_name = passenger.full_name();
        let name_changed = old_name != new_name;
        if name_changed {
            passenger.name_edit_remarks = req.name_edit_remarks.clone();
        }
        let edited = passenger.clone();

        booking.updated_at = Utc::now();
        self.bookings.update(&booking).await?;

        if name_changed {
            let remarks = req.name_edit_remarks.clone().unwrap_or_default();
            if remarks.trim().is_empty() {
                // The UI requires remarks on a name edit; an empty value here
                // means that gate was bypassed. Keep the record anyway.
                tracing::warn!(
                    "Name edit on booking {} recorded without remarks",
                    booking.reference
                );
            }
            self.record_name_edit(actor, &booking, old_name, new_name, remarks)
                .await;
        }

        Ok(edited)
    }

    async fn record_name_edit(
        &self,
        actor: &Actor,
        booking: &Booking,
        old_name: String,
        new_name: String,
        remarks: String,
    ) {
        let ticket_pnr = match self.tickets.get(booking.ticket_id).await {
            Ok(Some(ticket)) => ticket.pnr,
            _ => String::new(),
        };
        let entry = NameEditEntry {
            id: Uuid::new_v4(),
            admin_name: actor.name.clone(),
            booking_reference: booking.reference.clone(),
            ticket_pnr,
            old_name,
            new_name,
            remarks,
            recorded_at: Utc::now(),
        };
        self.audit.record(AuditRecord::PassengerNameEdit(entry));
    }
}
