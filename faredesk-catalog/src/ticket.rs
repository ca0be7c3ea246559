use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use faredesk_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JourneyType {
    Domestic,
    International,
}

impl JourneyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyType::Domestic => "Domestic",
            JourneyType::International => "International",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Domestic" => Some(JourneyType::Domestic),
            "International" => Some(JourneyType::International),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    Economy,
    #[serde(rename = "Premium Economy")]
    PremiumEconomy,
    #[serde(rename = "Business Class")]
    BusinessClass,
    #[serde(rename = "First Class")]
    FirstClass,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Economy => "Economy",
            ClassType::PremiumEconomy => "Premium Economy",
            ClassType::BusinessClass => "Business Class",
            ClassType::FirstClass => "First Class",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Economy" => Some(ClassType::Economy),
            "Premium Economy" => Some(ClassType::PremiumEconomy),
            "Business Class" => Some(ClassType::BusinessClass),
            "First Class" => Some(ClassType::FirstClass),
            _ => None,
        }
    }
}

/// A sellable batch of resale seats for one flight/date/class combination.
///
/// `available_seats` only moves through `TicketRepository::reserve_seats` /
/// `release_seats`, always tied to a booking's seat count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    /// Unique 6-character alphanumeric PNR identifying this inventory line.
    pub pnr: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub journey_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub total_seats: i32,
    pub available_seats: i32,
    /// Integral currency units, no sub-unit fractions.
    pub sale_price: i64,
    /// Effective per-seat price when > 0; must stay below `sale_price`.
    pub discount: i64,
    pub infant_fees: i64,
    pub journey_type: JourneyType,
    pub class_type: ClassType,
    pub non_bookable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn audit_snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    pub pnr: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub journey_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub total_seats: i32,
    pub sale_price: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub infant_fees: i64,
    pub journey_type: JourneyType,
    pub class_type: ClassType,
    #[serde(default)]
    pub non_bookable: bool,
}

impl CreateTicketRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if !is_valid_pnr(&self.pnr) {
            return Err(CoreError::Validation(format!(
                "PNR must be 6 uppercase alphanumeric characters, got '{}'",
                self.pnr
            )));
        }
        if self.airline.trim().is_empty() {
            return Err(CoreError::Validation("Airline is required".to_string()));
        }
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(CoreError::Validation(
                "Origin and destination are required".to_string(),
            ));
        }
        if self.total_seats <= 0 {
            return Err(CoreError::Validation(
                "Total seats must be positive".to_string(),
            ));
        }
        if self.sale_price <= 0 {
            return Err(CoreError::Validation(
                "Sale price must be positive".to_string(),
            ));
        }
        if self.discount < 0 {
            return Err(CoreError::Validation(
                "Discount cannot be negative".to_string(),
            ));
        }
        if self.discount > 0 && self.discount >= self.sale_price {
            return Err(CoreError::Validation(
                "Discounted price must be below the sale price".to_string(),
            ));
        }
        if self.infant_fees < 0 {
            return Err(CoreError::Validation(
                "Infant fees cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the ticket; all seats start available.
    pub fn into_ticket(self) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            pnr: self.pnr,
            airline: self.airline,
            origin: self.origin,
            destination: self.destination,
            journey_date: self.journey_date,
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            total_seats: self.total_seats,
            available_seats: self.total_seats,
            sale_price: self.sale_price,
            discount: self.discount,
            infant_fees: self.infant_fees,
            journey_type: self.journey_type,
            class_type: self.class_type,
            non_bookable: self.non_bookable,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn is_valid_pnr(pnr: &str) -> bool {
    pnr.len() == 6
        && pnr
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
