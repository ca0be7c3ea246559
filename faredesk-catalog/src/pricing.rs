use crate::ticket::Ticket;
use faredesk_core::{CoreError, CoreResult};

/// Discounted price wins whenever one is set.
pub fn effective_price_per_seat(ticket: &Ticket) -> i64 {
    if ticket.discount > 0 {
        ticket.discount
    } else {
        ticket.sale_price
    }
}

pub fn compute_total(ticket: &Ticket, seats: i32, infant_count: i32) -> i64 {
    effective_price_per_seat(ticket) * seats as i64 + ticket.infant_fees * infant_count as i64
}

/// Exact-equality check against the server-side recomputation. Any delta is
/// treated as a tamper signal, not a rounding issue: amounts are integral
/// currency units, so there is no epsilon.
pub fn verify_total(submitted: i64, computed: i64) -> CoreResult<()> {
    if submitted != computed {
        return Err(CoreError::PriceMismatch {
            submitted,
            computed,
        });
    }
    Ok(())
}
