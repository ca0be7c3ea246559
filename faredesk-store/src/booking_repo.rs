use crate::ticket_repo::db_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use faredesk_core::{CoreError, CoreResult};
use faredesk_order::{
    Booking, BookingRepository, BookingStatus, Infant, Passenger, PaymentMethod, PaymentStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    reference: String,
    user_id: String,
    ticket_id: Uuid,
    number_of_seats: i32,
    passengers: serde_json::Value,
    infants: serde_json::Value,
    total_amount: i64,
    booking_status: String,
    payment_status: String,
    payment_method: String,
    transaction_id: Option<String>,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> CoreResult<Booking> {
        let passengers: Vec<Passenger> = serde_json::from_value(self.passengers)
            .map_err(|e| CoreError::Internal(format!("Malformed passenger manifest: {e}")))?;
        let infants: Vec<Infant> = serde_json::from_value(self.infants)
            .map_err(|e| CoreError::Internal(format!("Malformed infant list: {e}")))?;
        let booking_status = BookingStatus::parse(&self.booking_status).ok_or_else(|| {
            CoreError::Internal(format!("Unknown booking status '{}'", self.booking_status))
        })?;
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            CoreError::Internal(format!("Unknown payment status '{}'", self.payment_status))
        })?;
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            CoreError::Internal(format!("Unknown payment method '{}'", self.payment_method))
        })?;
        Ok(Booking {
            id: self.id,
            reference: self.reference,
            user_id: self.user_id,
            ticket_id: self.ticket_id,
            number_of_seats: self.number_of_seats,
            passengers,
            infants,
            total_amount: self.total_amount,
            booking_status,
            payment_status,
            payment_method,
            transaction_id: self.transaction_id,
            remarks: self.remarks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn json_err(e: serde_json::Error) -> CoreError {
    CoreError::Internal(e.to_string())
}

const BOOKING_COLUMNS: &str = "id, reference, user_id, ticket_id, number_of_seats, passengers, infants, total_amount, booking_status, payment_status, payment_method, transaction_id, remarks, created_at, updated_at";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: &Booking) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, reference, user_id, ticket_id, number_of_seats, passengers, infants, total_amount, booking_status, payment_status, payment_method, transaction_id, remarks, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.reference)
        .bind(&booking.user_id)
        .bind(booking.ticket_id)
        .bind(booking.number_of_seats)
        .bind(serde_json::to_value(&booking.passengers).map_err(json_err)?)
        .bind(serde_json::to_value(&booking.infants).map_err(json_err)?)
        .bind(booking.total_amount)
        .bind(booking.booking_status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_method.as_str())
        .bind(&booking.transaction_id)
        .bind(&booking.remarks)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_for_user(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn update(&self, booking: &Booking) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET passengers = $2, infants = $3, booking_status = $4,
                payment_status = $5, payment_method = $6, transaction_id = $7,
                remarks = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(booking.id)
        .bind(serde_json::to_value(&booking.passengers).map_err(json_err)?)
        .bind(serde_json::to_value(&booking.infants).map_err(json_err)?)
        .bind(booking.booking_status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.payment_method.as_str())
        .bind(&booking.transaction_id)
        .bind(&booking.remarks)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Booking {} not found",
                booking.id
            )));
        }
        Ok(())
    }
}
