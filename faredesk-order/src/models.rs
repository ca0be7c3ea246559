use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle. Cancelled and Completed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            "Completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(PaymentStatus::Pending),
            "Paid" => Some(PaymentStatus::Paid),
            "Failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Online,
    Offline,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "Online",
            PaymentMethod::Offline => "Offline",
            PaymentMethod::NotApplicable => "N/A",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Online" => Some(PaymentMethod::Online),
            "Offline" => Some(PaymentMethod::Offline),
            "N/A" => Some(PaymentMethod::NotApplicable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassengerType {
    Adult,
    Kid,
    Infant,
}

impl PassengerType {
    /// The honorific decides the type: Master/Miss travel as kids.
    pub fn from_honorific(honorific: &str) -> Self {
        match honorific {
            "Master" | "Miss" => PassengerType::Kid,
            _ => PassengerType::Adult,
        }
    }
}

/// One traveller on a booking's manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub passenger_type: PassengerType,
    pub honorific: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub passport_issue_date: Option<NaiveDate>,
    pub passport_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Required by the product whenever a name field is edited after
    /// creation; feeds the dedicated name-edit audit stream.
    #[serde(default)]
    pub name_edit_remarks: Option<String>,
}

impl Passenger {
    /// Honorific + first + last, empties filtered, space joined. This is the
    /// string compared before/after an edit to decide whether a name-edit
    /// audit row is due.
    pub fn full_name(&self) -> String {
        [
            self.honorific.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .cloned()
        .collect::<Vec<&str>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Infant {
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
}

/// One agent's reservation of seats against a ticket, with its own passenger
/// manifest. Bookings are only ever mutated by the workflow transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// System-generated unique reference, `BK<timestamp><seq>`.
    pub reference: String,
    pub user_id: String,
    pub ticket_id: Uuid,
    pub number_of_seats: i32,
    pub passengers: Vec<Passenger>,
    pub infants: Vec<Infant>,
    pub total_amount: i64,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Cancelled bookings always present payment as Failed. Presentation
    /// override only; the stored payment status is untouched.
    pub fn display_payment_status(&self) -> PaymentStatus {
        if self.booking_status == BookingStatus::Cancelled {
            PaymentStatus::Failed
        } else {
            self.payment_status
        }
    }

    pub fn audit_snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honorific_drives_passenger_type() {
        assert_eq!(PassengerType::from_honorific("Master"), PassengerType::Kid);
        assert_eq!(PassengerType::from_honorific("Miss"), PassengerType::Kid);
        assert_eq!(PassengerType::from_honorific("Mr"), PassengerType::Adult);
        assert_eq!(PassengerType::from_honorific("Mrs"), PassengerType::Adult);
    }

    #[test]
    fn test_full_name_filters_empty_parts() {
        let p = Passenger {
            passenger_type: PassengerType::Adult,
            honorific: "Mr".to_string(),
            first_name: "Ravi".to_string(),
            last_name: "".to_string(),
            dob: None,
            passport_number: None,
            passport_issue_date: None,
            passport_expiry_date: None,
            remarks: None,
            name_edit_remarks: None,
        };
        assert_eq!(p.full_name(), "Mr Ravi");
    }

    #[test]
    fn test_cancelled_booking_displays_failed_payment() {
        let now = Utc::now();
        let mut booking = Booking {
            id: Uuid::new_v4(),
            reference: "BK1700000000000001".to_string(),
            user_id: "agent-1".to_string(),
            ticket_id: Uuid::new_v4(),
            number_of_seats: 1,
            passengers: vec![],
            infants: vec![],
            total_amount: 5000,
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::NotApplicable,
            transaction_id: None,
            remarks: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(booking.display_payment_status(), PaymentStatus::Pending);

        booking.booking_status = BookingStatus::Cancelled;
        assert_eq!(booking.display_payment_status(), PaymentStatus::Failed);
        // Stored value is untouched.
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_payment_method_serializes_na() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::NotApplicable).unwrap(),
            serde_json::json!("N/A")
        );
        assert_eq!(PaymentMethod::parse("N/A"), Some(PaymentMethod::NotApplicable));
    }
}
