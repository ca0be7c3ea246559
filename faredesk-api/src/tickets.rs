use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{patch, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use faredesk_audit::{diff, AuditAction, AuditRecord, AuditRecorder};
use faredesk_catalog::CreateTicketRequest;
use faredesk_core::identity::Actor;
use faredesk_core::CoreError;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket).get(list_tickets))
        .route("/tickets/{id}", patch(update_ticket))
}

fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if !actor.is_admin {
        return Err(CoreError::Forbidden(
            "Only an admin may manage tickets".to_string(),
        )
        .into());
    }
    Ok(())
}

async fn create_ticket(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    require_admin(&actor)?;
    req.validate()?;

    if state.tickets.get_by_pnr(&req.pnr).await?.is_some() {
        return Err(CoreError::Validation(format!(
            "A ticket with PNR {} already exists",
            req.pnr
        ))
        .into());
    }

    let ticket = req.into_ticket();
    state.tickets.insert(&ticket).await?;
    state.ticket_cache.invalidate_all();

    let entry = AuditRecorder::creation_entry(&actor, ticket.audit_snapshot());
    state.audit.record(AuditRecord::Ticket(entry));

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": ticket })),
    ))
}

#[derive(Debug, Deserialize)]
struct TicketQuery {
    page: Option<u32>,
}

const TICKET_PAGE_SIZE: usize = 20;

async fn list_tickets(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let page = query.page.unwrap_or(1).max(1) as usize;
    let key = format!("/tickets:{page}");

    let tickets = match state.ticket_cache.get(&key) {
        Some(cached) => cached,
        None => {
            let page_slice: Vec<_> = state
                .tickets
                .list()
                .await?
                .into_iter()
                .skip((page - 1) * TICKET_PAGE_SIZE)
                .take(TICKET_PAGE_SIZE)
                .collect();
            state.ticket_cache.put(&key, page_slice.clone());
            page_slice
        }
    };

    Ok(Json(json!({ "success": true, "data": tickets, "page": page })))
}

/// Partial admin edit of a ticket's commercial fields. Seat counters are not
/// editable here; they only move through reservations.
#[derive(Debug, Deserialize)]
struct UpdateTicketRequest {
    airline: Option<String>,
    origin: Option<String>,
    destination: Option<String>,
    journey_date: Option<NaiveDate>,
    departure_time: Option<NaiveTime>,
    arrival_time: Option<NaiveTime>,
    sale_price: Option<i64>,
    discount: Option<i64>,
    infant_fees: Option<i64>,
    non_bookable: Option<bool>,
}

async fn update_ticket(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&actor)?;

    let mut ticket = state
        .tickets
        .get(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Ticket {id} not found")))?;
    let before = ticket.audit_snapshot();

    if let Some(airline) = req.airline {
        ticket.airline = airline;
    }
    if let Some(origin) = req.origin {
        ticket.origin = origin;
    }
    if let Some(destination) = req.destination {
        ticket.destination = destination;
    }
    if let Some(journey_date) = req.journey_date {
        ticket.journey_date = journey_date;
    }
    if let Some(departure_time) = req.departure_time {
        ticket.departure_time = departure_time;
    }
    if let Some(arrival_time) = req.arrival_time {
        ticket.arrival_time = arrival_time;
    }
    if let Some(sale_price) = req.sale_price {
        ticket.sale_price = sale_price;
    }
    if let Some(discount) = req.discount {
        ticket.discount = discount;
    }
    if let Some(infant_fees) = req.infant_fees {
        ticket.infant_fees = infant_fees;
    }
    if let Some(non_bookable) = req.non_bookable {
        ticket.non_bookable = non_bookable;
    }

    if ticket.sale_price <= 0 {
        return Err(CoreError::Validation("Sale price must be positive".to_string()).into());
    }
    if ticket.discount < 0 || (ticket.discount > 0 && ticket.discount >= ticket.sale_price) {
        return Err(CoreError::Validation(
            "Discounted price must be below the sale price".to_string(),
        )
        .into());
    }
    if ticket.infant_fees < 0 {
        return Err(CoreError::Validation("Infant fees cannot be negative".to_string()).into());
    }

    ticket.updated_at = Utc::now();
    state.tickets.update(&ticket).await?;
    state.ticket_cache.invalidate_all();

    let after = ticket.audit_snapshot();
    let changes = diff::update_changes(&before, &after);
    let entry = AuditRecorder::entry(&actor, AuditAction::Update, changes, after);
    state.audit.record_update(entry, AuditRecord::Ticket);

    Ok(Json(json!({ "success": true, "data": ticket })))
}
