use crate::models::Booking;
use async_trait::async_trait;
use faredesk_core::CoreResult;
use uuid::Uuid;

/// Storage contract for bookings. Bookings are owned by their creating flow;
/// only the workflow transitions write through `update`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> CoreResult<()>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>>;

    async fn list_for_user(&self, user_id: &str) -> CoreResult<Vec<Booking>>;

    async fn update(&self, booking: &Booking) -> CoreResult<()>;
}
