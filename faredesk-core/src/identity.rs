use serde::{Deserialize, Serialize};

/// Authenticated identity resolved from a request's credentials.
///
/// Authentication mechanics live outside the core; only this shape matters
/// to the workflow and the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl Actor {
    /// Owner-or-admin rule for reading and mutating a booking.
    pub fn can_access_bookings_of(&self, user_id: &str) -> bool {
        self.is_admin || self.id == user_id
    }
}
