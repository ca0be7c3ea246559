use crate::ticket::Ticket;
use async_trait::async_trait;
use faredesk_core::CoreResult;
use uuid::Uuid;

/// Storage contract for the ticket inventory ledger.
///
/// `reserve_seats` is the one operation with a hard concurrency requirement:
/// implementations must perform the availability check and the decrement as a
/// single atomic conditional update (one SQL statement, or one lock
/// acquisition), never as separate read-then-write steps.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn insert(&self, ticket: &Ticket) -> CoreResult<()>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Ticket>>;

    async fn get_by_pnr(&self, pnr: &str) -> CoreResult<Option<Ticket>>;

    async fn list(&self) -> CoreResult<Vec<Ticket>>;

    /// Persist mutable ticket fields. Seat counters are excluded; they only
    /// move through `reserve_seats`/`release_seats`.
    async fn update(&self, ticket: &Ticket) -> CoreResult<()>;

    /// Atomically decrement `available_seats` by `count` iff enough seats
    /// remain. Returns `Ok(false)` when the ticket had fewer than `count`
    /// seats (or does not exist); the caller maps that to the inventory
    /// error with the current availability.
    async fn reserve_seats(&self, id: Uuid, count: i32) -> CoreResult<bool>;

    /// Increment `available_seats` by `count`, clamped at `total_seats`.
    async fn release_seats(&self, id: Uuid, count: i32) -> CoreResult<()>;
}
