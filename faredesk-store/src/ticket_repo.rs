use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use faredesk_catalog::{ClassType, JourneyType, Ticket, TicketRepository};
use faredesk_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn db_err(e: sqlx::Error) -> CoreError {
    CoreError::Internal(e.to_string())
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    pnr: String,
    airline: String,
    origin: String,
    destination: String,
    journey_date: NaiveDate,
    departure_time: NaiveTime,
    arrival_time: NaiveTime,
    total_seats: i32,
    available_seats: i32,
    sale_price: i64,
    discount: i64,
    infant_fees: i64,
    journey_type: String,
    class_type: String,
    non_bookable: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> CoreResult<Ticket> {
        let journey_type = JourneyType::parse(&self.journey_type).ok_or_else(|| {
            CoreError::Internal(format!("Unknown journey type '{}'", self.journey_type))
        })?;
        let class_type = ClassType::parse(&self.class_type).ok_or_else(|| {
            CoreError::Internal(format!("Unknown class type '{}'", self.class_type))
        })?;
        Ok(Ticket {
            id: self.id,
            pnr: self.pnr,
            airline: self.airline,
            origin: self.origin,
            destination: self.destination,
            journey_date: self.journey_date,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            total_seats: self.total_seats,
            available_seats: self.available_seats,
            sale_price: self.sale_price,
            discount: self.discount,
            infant_fees: self.infant_fees,
            journey_type,
            class_type,
            non_bookable: self.non_bookable,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const TICKET_COLUMNS: &str = "id, pnr, airline, origin, destination, journey_date, departure_time, arrival_time, total_seats, available_seats, sale_price, discount, infant_fees, journey_type, class_type, non_bookable, created_at, updated_at";

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets (id, pnr, airline, origin, destination, journey_date, departure_time, arrival_time, total_seats, available_seats, sale_price, discount, infant_fees, journey_type, class_type, non_bookable, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.pnr)
        .bind(&ticket.airline)
        .bind(&ticket.origin)
        .bind(&ticket.destination)
        .bind(ticket.journey_date)
        .bind(ticket.departure_time)
        .bind(ticket.arrival_time)
        .bind(ticket.total_seats)
        .bind(ticket.available_seats)
        .bind(ticket.sale_price)
        .bind(ticket.discount)
        .bind(ticket.infant_fees)
        .bind(ticket.journey_type.as_str())
        .bind(ticket.class_type.as_str())
        .bind(ticket.non_bookable)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Ticket>> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TicketRow::into_ticket).transpose()
    }

    async fn get_by_pnr(&self, pnr: &str) -> CoreResult<Option<Ticket>> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE pnr = $1"
        ))
        .bind(pnr)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(TicketRow::into_ticket).transpose()
    }

    async fn list(&self) -> CoreResult<Vec<Ticket>> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY journey_date, departure_time"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn update(&self, ticket: &Ticket) -> CoreResult<()> {
        // Seat counters are deliberately not part of this statement; they
        // only move through reserve_seats/release_seats.
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET airline = $2, origin = $3, destination = $4, journey_date = $5,
                departure_time = $6, arrival_time = $7, sale_price = $8,
                discount = $9, infant_fees = $10, journey_type = $11,
                class_type = $12, non_bookable = $13, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.airline)
        .bind(&ticket.origin)
        .bind(&ticket.destination)
        .bind(ticket.journey_date)
        .bind(ticket.departure_time)
        .bind(ticket.arrival_time)
        .bind(ticket.sale_price)
        .bind(ticket.discount)
        .bind(ticket.infant_fees)
        .bind(ticket.journey_type.as_str())
        .bind(ticket.class_type.as_str())
        .bind(ticket.non_bookable)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Ticket {} not found", ticket.id)));
        }
        Ok(())
    }

    async fn reserve_seats(&self, id: Uuid, count: i32) -> CoreResult<bool> {
        // Single conditional UPDATE; the WHERE clause is what prevents
        // overselling under concurrent bookings.
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET available_seats = available_seats - $2, updated_at = NOW()
            WHERE id = $1 AND available_seats >= $2
            "#,
        )
        .bind(id)
        .bind(count)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_seats(&self, id: Uuid, count: i32) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE tickets
            SET available_seats = LEAST(available_seats + $2, total_seats), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(count)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
