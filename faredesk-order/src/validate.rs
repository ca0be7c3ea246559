use crate::models::{Infant, Passenger, PassengerType};
use chrono::NaiveDate;
use faredesk_core::{CoreError, CoreResult};
use faredesk_catalog::JourneyType;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct PassengerInput {
    pub honorific: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub passport_issue_date: Option<NaiveDate>,
    pub passport_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl PassengerInput {
    pub fn into_passenger(self) -> Passenger {
        Passenger {
            passenger_type: PassengerType::from_honorific(&self.honorific),
            honorific: self.honorific,
            first_name: self.first_name,
            last_name: self.last_name,
            dob: self.dob,
            passport_number: self.passport_number,
            passport_issue_date: self.passport_issue_date,
            passport_expiry_date: self.passport_expiry_date,
            remarks: self.remarks,
            name_edit_remarks: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfantInput {
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub ticket_id: Uuid,
    pub number_of_seats: i32,
    pub passengers: Vec<PassengerInput>,
    #[serde(default)]
    pub infants: Vec<InfantInput>,
    pub total_amount: i64,
}

/// Everything checkable before the ticket is loaded: required fields, the
/// seat/passenger count rule, per-passenger basics and infant fields.
pub fn validate_request(req: &CreateBookingRequest) -> CoreResult<()> {
    if req.number_of_seats < 1 {
        return Err(CoreError::Validation(
            "Number of seats must be at least 1".to_string(),
        ));
    }
    if req.passengers.is_empty() {
        return Err(CoreError::Validation(
            "At least one passenger is required".to_string(),
        ));
    }
    if (req.passengers.len() as i32) < req.number_of_seats {
        return Err(CoreError::Validation(format!(
            "Passenger count {} is below the number of seats {}",
            req.passengers.len(),
            req.number_of_seats
        )));
    }

    for (i, p) in req.passengers.iter().enumerate() {
        if p.honorific.trim().is_empty()
            || p.first_name.trim().is_empty()
            || p.last_name.trim().is_empty()
        {
            return Err(CoreError::Validation(format!(
                "Passenger {}: honorific, first name and last name are required",
                i + 1
            )));
        }
        if PassengerType::from_honorific(&p.honorific) == PassengerType::Kid && p.dob.is_none() {
            return Err(CoreError::Validation(format!(
                "Passenger {}: date of birth is required for kids",
                i + 1
            )));
        }
    }

    for (i, infant) in req.infants.iter().enumerate() {
        if infant.first_name.trim().is_empty() || infant.last_name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Infant {}: first name and last name are required",
                i + 1
            )));
        }
        if infant.dob.is_none() {
            return Err(CoreError::Validation(format!(
                "Infant {}: date of birth is required",
                i + 1
            )));
        }
    }

    Ok(())
}

/// Journey-dependent checks, run once the ticket is known. International
/// journeys require dob plus the passport trio for every passenger, adults
/// and kids alike.
pub fn validate_for_journey(
    req: &CreateBookingRequest,
    journey_type: JourneyType,
) -> CoreResult<()> {
    if journey_type != JourneyType::International {
        return Ok(());
    }
    for (i, p) in req.passengers.iter().enumerate() {
        if p.dob.is_none() {
            return Err(CoreError::Validation(format!(
                "Passenger {}: date of birth is required for international journeys",
                i + 1
            )));
        }
        let passport_complete = p
            .passport_number
            .as_deref()
            .map(|n| !n.trim().is_empty())
            .unwrap_or(false)
            && p.passport_issue_date.is_some()
            && p.passport_expiry_date.is_some();
        if !passport_complete {
            return Err(CoreError::Validation(format!(
                "Passenger {}: passport number, issue date and expiry date are required for international journeys",
                i + 1
            )));
        }
    }
    Ok(())
}

pub fn build_infants(inputs: &[InfantInput]) -> Vec<Infant> {
    inputs
        .iter()
        .filter_map(|i| {
            i.dob.map(|dob| Infant {
                first_name: i.first_name.clone(),
                last_name: i.last_name.clone(),
                dob,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(honorific: &str) -> PassengerInput {
        PassengerInput {
            honorific: honorific.to_string(),
            first_name: "Ravi".to_string(),
            last_name: "Sharma".to_string(),
            dob: None,
            passport_number: None,
            passport_issue_date: None,
            passport_expiry_date: None,
            remarks: None,
        }
    }

    fn request(seats: i32, passengers: Vec<PassengerInput>) -> CreateBookingRequest {
        CreateBookingRequest {
            ticket_id: Uuid::new_v4(),
            number_of_seats: seats,
            passengers,
            infants: vec![],
            total_amount: 5000,
        }
    }

    #[test]
    fn test_passenger_count_must_cover_seats() {
        let req = request(2, vec![passenger("Mr")]);
        assert!(validate_request(&req).is_err());

        let req = request(1, vec![passenger("Mr"), passenger("Mrs")]);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_kid_requires_dob() {
        let req = request(1, vec![passenger("Master")]);
        assert!(validate_request(&req).is_err());

        let mut kid = passenger("Miss");
        kid.dob = NaiveDate::from_ymd_opt(2018, 5, 4);
        let req = request(1, vec![kid]);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_international_requires_passport_for_adults_and_kids() {
        let mut adult = passenger("Mr");
        adult.dob = NaiveDate::from_ymd_opt(1990, 1, 1);
        let req = request(1, vec![adult]);
        assert!(validate_for_journey(&req, JourneyType::Domestic).is_ok());
        assert!(validate_for_journey(&req, JourneyType::International).is_err());

        let mut adult = passenger("Mr");
        adult.dob = NaiveDate::from_ymd_opt(1990, 1, 1);
        adult.passport_number = Some("P1234567".to_string());
        adult.passport_issue_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        adult.passport_expiry_date = NaiveDate::from_ymd_opt(2030, 1, 1);
        let req = request(1, vec![adult]);
        assert!(validate_for_journey(&req, JourneyType::International).is_ok());
    }

    #[test]
    fn test_infant_fields_required_when_present() {
        let mut req = request(1, vec![passenger("Mr")]);
        req.infants.push(InfantInput {
            first_name: "Anya".to_string(),
            last_name: "Sharma".to_string(),
            dob: None,
        });
        assert!(validate_request(&req).is_err());

        req.infants[0].dob = NaiveDate::from_ymd_opt(2026, 1, 15);
        assert!(validate_request(&req).is_ok());
    }
}
