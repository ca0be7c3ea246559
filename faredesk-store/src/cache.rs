use faredesk_catalog::Ticket;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheSlot {
    stored_at: Instant,
    tickets: Vec<Ticket>,
}

/// Ticket-list read cache, keyed by endpoint + page.
///
/// Explicitly owned by the service layer: populated on a read miss and
/// invalidated wholesale on every ticket mutation, never refreshed behind
/// the caller's back.
pub struct TicketListCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheSlot>>,
}

impl TicketListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<Ticket>> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(slot) if slot.stored_at.elapsed() < self.ttl => Some(slot.tickets.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, tickets: Vec<Ticket>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CacheSlot {
                    stored_at: Instant::now(),
                    tickets,
                },
            );
        }
    }

    /// Drop every cached page. Called after any write to the ticket
    /// collection.
    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
