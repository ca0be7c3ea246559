use async_trait::async_trait;
use faredesk_audit::{AuditRecord, AuditSink};
use faredesk_catalog::{Ticket, TicketRepository};
use faredesk_core::{CoreError, CoreResult};
use faredesk_order::{Booking, BookingRepository};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// In-memory implementation of every storage trait. Backs tests and local
/// development; the Postgres repositories are the production path.
///
/// Seat reservation performs the availability check and the decrement under
/// one mutex acquisition, matching the single-statement conditional UPDATE
/// of the SQL store.
#[derive(Default)]
pub struct MemoryStore {
    tickets: Mutex<HashMap<Uuid, Ticket>>,
    bookings: Mutex<HashMap<Uuid, Booking>>,
    audit: Mutex<Vec<AuditRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything audited so far, oldest first.
    pub fn audit_records(&self) -> CoreResult<Vec<AuditRecord>> {
        Ok(lock(&self.audit)?.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> CoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CoreError::Internal("store lock poisoned".to_string()))
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn insert(&self, ticket: &Ticket) -> CoreResult<()> {
        lock(&self.tickets)?.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Ticket>> {
        Ok(lock(&self.tickets)?.get(&id).cloned())
    }

    async fn get_by_pnr(&self, pnr: &str) -> CoreResult<Option<Ticket>> {
        Ok(lock(&self.tickets)?
            .values()
            .find(|t| t.pnr == pnr)
            .cloned())
    }

    async fn list(&self) -> CoreResult<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = lock(&self.tickets)?.values().cloned().collect();
        tickets.sort_by(|a, b| a.journey_date.cmp(&b.journey_date));
        Ok(tickets)
    }

    async fn update(&self, ticket: &Ticket) -> CoreResult<()> {
        let mut tickets = lock(&self.tickets)?;
        match tickets.get_mut(&ticket.id) {
            Some(existing) => {
                // Seat counters stay owned by reserve/release.
                let total_seats = existing.total_seats;
                let available_seats = existing.available_seats;
                *existing = ticket.clone();
                existing.total_seats = total_seats;
                existing.available_seats = available_seats;
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("Ticket {} not found", ticket.id))),
        }
    }

    async fn reserve_seats(&self, id: Uuid, count: i32) -> CoreResult<bool> {
        let mut tickets = lock(&self.tickets)?;
        match tickets.get_mut(&id) {
            Some(t) if t.available_seats >= count => {
                t.available_seats -= count;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_seats(&self, id: Uuid, count: i32) -> CoreResult<()> {
        let mut tickets = lock(&self.tickets)?;
        if let Some(t) = tickets.get_mut(&id) {
            t.available_seats = (t.available_seats + count).min(t.total_seats);
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> CoreResult<()> {
        lock(&self.bookings)?.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        Ok(lock(&self.bookings)?.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = lock(&self.bookings)?
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn update(&self, booking: &Booking) -> CoreResult<()> {
        let mut bookings = lock(&self.bookings)?;
        if !bookings.contains_key(&booking.id) {
            return Err(CoreError::NotFound(format!(
                "Booking {} not found",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, record: AuditRecord) -> CoreResult<()> {
        lock(&self.audit)?.push(record);
        Ok(())
    }
}
