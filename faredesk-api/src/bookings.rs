use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use faredesk_core::identity::Actor;
use faredesk_core::CoreError;
use faredesk_order::workflow::ApproveRequest;
use faredesk_order::{
    Booking, CreateBookingRequest, EditPassengerRequest, UpdatePaymentRequest,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookings",
            post(create_booking)
                .get(get_bookings)
                .patch(edit_passenger),
        )
        .route("/bookings/{id}/approve", post(approve_booking))
        .route("/bookings/{id}/reject", post(reject_booking))
        .route("/bookings/{id}/update-payment", post(update_payment))
        .route("/bookings/{id}/complete", post(complete_booking))
}

/// Booking as the client sees it: the stored document with the Cancelled
/// display override applied to the payment status.
fn booking_view(booking: &Booking) -> serde_json::Value {
    let mut view = serde_json::to_value(booking).unwrap_or(serde_json::Value::Null);
    view["payment_status"] = json!(booking.display_payment_status().as_str());
    view
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let created = state.workflow.create(&actor, req).await?;
    let booking = &created.booking;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "_id": booking.id,
                "bookingReference": booking.reference,
                "totalAmount": booking.total_amount,
                "numberOfSeats": booking.number_of_seats,
                "passengers": booking.passengers,
                "infants": booking.infants,
                "user": booking.user_id,
                "Discount": created.discount,
            }
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct BookingQuery {
    id: Option<Uuid>,
    user: Option<String>,
}

async fn get_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(id) = query.id {
        let booking = state.workflow.get(&actor, id).await?;
        let mut view = booking_view(&booking);
        if let Ok(Some(ticket)) = state.tickets.get(booking.ticket_id).await {
            view["ticket"] = serde_json::to_value(&ticket).unwrap_or(serde_json::Value::Null);
        }
        return Ok(Json(json!({ "success": true, "data": view })));
    }

    if let Some(user) = query.user {
        let bookings = state.workflow.list_for_user(&actor, &user).await?;
        let views: Vec<_> = bookings.iter().map(booking_view).collect();
        return Ok(Json(json!({ "success": true, "data": views })));
    }

    Err(CoreError::Validation("Either 'id' or 'user' is required".to_string()).into())
}

async fn edit_passenger(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<EditPassengerRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let passenger = state.editor.edit(&actor, req).await?;
    Ok(Json(json!({ "success": true, "passenger": passenger })))
}

async fn approve_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = state.workflow.approve(&actor, id, req).await?;
    Ok(Json(json!({ "success": true, "data": booking_view(&booking) })))
}

#[derive(Debug, Deserialize, Default)]
struct RejectRequest {
    #[serde(default)]
    remarks: Option<String>,
}

async fn reject_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = state.workflow.reject(&actor, id, req.remarks).await?;
    Ok(Json(json!({ "success": true, "data": booking_view(&booking) })))
}

async fn update_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = state.workflow.update_payment(&actor, id, req).await?;
    Ok(Json(json!({ "success": true, "data": booking_view(&booking) })))
}

async fn complete_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = state.workflow.complete(&actor, id).await?;
    Ok(Json(json!({ "success": true, "data": booking_view(&booking) })))
}
