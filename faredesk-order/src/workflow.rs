use crate::models::{Booking, BookingStatus, PaymentMethod, PaymentStatus};
use crate::reference;
use crate::repository::BookingRepository;
use crate::validate::{self, build_infants};
use chrono::Utc;
use faredesk_audit::{diff, AuditRecord, AuditRecorder};
use faredesk_catalog::{pricing, TicketRepository};
use faredesk_core::identity::Actor;
use faredesk_core::notify::{NotificationSender, StatusKind};
use faredesk_core::{CoreError, CoreResult};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub use crate::validate::CreateBookingRequest;

/// Admin decision on a pending booking. `Unpaid` keeps the stored payment
/// status at Pending.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub payment_status: ApprovalPayment,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ApprovalPayment {
    Paid,
    Unpaid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
}

/// Result of a successful creation; the ticket's discount rides along for
/// the response envelope.
#[derive(Debug)]
pub struct BookingCreated {
    pub booking: Booking,
    pub discount: i64,
}

/// State machine driving bookings from Pending through Confirmed/Cancelled
/// to Completed, with inventory and audit side effects.
///
/// Validation and inventory/price failures abort before any write. Audit and
/// notification run after the write, fire-and-forget: their failure never
/// invalidates the mutation.
pub struct BookingWorkflow {
    tickets: Arc<dyn TicketRepository>,
    bookings: Arc<dyn BookingRepository>,
    audit: AuditRecorder,
    notifier: Arc<dyn NotificationSender>,
}

impl BookingWorkflow {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        bookings: Arc<dyn BookingRepository>,
        audit: AuditRecorder,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            tickets,
            bookings,
            audit,
            notifier,
        }
    }

    /// Agent action: reserve seats and persist a Pending booking.
    pub async fn create(&self, actor: &Actor, req: CreateBookingRequest) -> CoreResult<BookingCreated> {
        validate::validate_request(&req)?;

        let ticket = self
            .tickets
            .get(req.ticket_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Ticket {} not found", req.ticket_id)))?;

        if ticket.non_bookable {
            return Err(CoreError::Validation(format!(
                "Ticket {} is not open for booking",
                ticket.pnr
            )));
        }

        validate::validate_for_journey(&req, ticket.journey_type)?;

        if ticket.available_seats < req.number_of_seats {
            return Err(CoreError::InsufficientInventory {
                requested: req.number_of_seats,
                available: ticket.available_seats,
            });
        }

        let computed = pricing::compute_total(&ticket, req.number_of_seats, req.infants.len() as i32);
        pricing::verify_total(req.total_amount, computed)?;

        // Single atomic conditional decrement; a concurrent booking may have
        // taken the seats between the precheck and here.
        if !self
            .tickets
            .reserve_seats(ticket.id, req.number_of_seats)
            .await?
        {
            let available = self
                .tickets
                .get(ticket.id)
                .await?
                .map(|t| t.available_seats)
                .unwrap_or(0);
            return Err(CoreError::InsufficientInventory {
                requested: req.number_of_seats,
                available,
            });
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            reference: reference::next_reference(),
            user_id: actor.id.clone(),
            ticket_id: ticket.id,
            number_of_seats: req.number_of_seats,
            passengers: req
                .passengers
                .into_iter()
                .map(|p| p.into_passenger())
                .collect(),
            infants: build_infants(&req.infants),
            total_amount: computed,
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::NotApplicable,
            transaction_id: None,
            remarks: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.bookings.insert(&booking).await {
            // Compensating release so a failed persist does not leak the
            // reservation.
            if let Err(release_err) = self
                .tickets
                .release_seats(ticket.id, req.number_of_seats)
                .await
            {
                tracing::error!(
                    "Failed to release {} seats on ticket {} after aborted booking: {}",
                    req.number_of_seats,
                    ticket.pnr,
                    release_err
                );
            }
            return Err(e);
        }

        let entry = AuditRecorder::creation_entry(actor, booking.audit_snapshot());
        self.audit.record(AuditRecord::Booking(entry));
        self.notify(&booking.user_id, &ticket.pnr, StatusKind::Created);

        Ok(BookingCreated {
            booking,
            discount: ticket.discount,
        })
    }

    /// Admin decision: Pending -> Confirmed. Seats stay reserved.
    pub async fn approve(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        req: ApproveRequest,
    ) -> CoreResult<Booking> {
        self.require_admin(actor)?;
        let mut booking = self.load(booking_id).await?;
        self.require_status(&booking, BookingStatus::Pending, "approve")?;

        let before = booking.audit_snapshot();
        booking.booking_status = BookingStatus::Confirmed;
        booking.payment_status = match req.payment_status {
            ApprovalPayment::Paid => PaymentStatus::Paid,
            ApprovalPayment::Unpaid => PaymentStatus::Pending,
        };
        if let Some(method) = req.payment_method {
            booking.payment_method = method;
        }
        if req.transaction_id.is_some() {
            booking.transaction_id = req.transaction_id;
        }
        booking.updated_at = Utc::now();

        self.bookings.update(&booking).await?;
        self.audit_update(actor, &before, &booking);
        self.notify_for(&booking, StatusKind::Approved).await;

        Ok(booking)
    }

    /// Admin decision: Pending -> Cancelled; returns the reserved seats to
    /// the ticket.
    pub async fn reject(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        remarks: Option<String>,
    ) -> CoreResult<Booking> {
        self.require_admin(actor)?;
        let mut booking = self.load(booking_id).await?;
        self.require_status(&booking, BookingStatus::Pending, "reject")?;

        let before = booking.audit_snapshot();
        booking.booking_status = BookingStatus::Cancelled;
        if remarks.is_some() {
            booking.remarks = remarks;
        }
        booking.updated_at = Utc::now();

        self.bookings.update(&booking).await?;
        self.tickets
            .release_seats(booking.ticket_id, booking.number_of_seats)
            .await?;

        self.audit_update(actor, &before, &booking);
        self.notify_for(&booking, StatusKind::Rejected).await;

        Ok(booking)
    }

    /// Admin action on a confirmed booking: payment Pending -> Paid. Booking
    /// status and inventory are untouched.
    pub async fn update_payment(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        req: UpdatePaymentRequest,
    ) -> CoreResult<Booking> {
        self.require_admin(actor)?;
        let mut booking = self.load(booking_id).await?;
        self.require_status(&booking, BookingStatus::Confirmed, "update payment on")?;
        if booking.payment_status != PaymentStatus::Pending {
            return Err(CoreError::Validation(format!(
                "Payment is already {}",
                booking.payment_status.as_str()
            )));
        }

        let before = booking.audit_snapshot();
        booking.payment_status = PaymentStatus::Paid;
        booking.payment_method = req.payment_method;
        if req.transaction_id.is_some() {
            booking.transaction_id = req.transaction_id;
        }
        booking.updated_at = Utc::now();

        self.bookings.update(&booking).await?;
        self.audit_update(actor, &before, &booking);

        Ok(booking)
    }

    /// Admin action: Confirmed -> Completed, once travel is done.
    pub async fn complete(&self, actor: &Actor, booking_id: Uuid) -> CoreResult<Booking> {
        self.require_admin(actor)?;
        let mut booking = self.load(booking_id).await?;
        self.require_status(&booking, BookingStatus::Confirmed, "complete")?;

        let before = booking.audit_snapshot();
        booking.booking_status = BookingStatus::Completed;
        booking.updated_at = Utc::now();

        self.bookings.update(&booking).await?;
        self.audit_update(actor, &before, &booking);

        Ok(booking)
    }

    pub async fn get(&self, actor: &Actor, booking_id: Uuid) -> CoreResult<Booking> {
        let booking = self.load(booking_id).await?;
        if !actor.can_access_bookings_of(&booking.user_id) {
            return Err(CoreError::Forbidden(
                "Only the owning user or an admin may view this booking".to_string(),
            ));
        }
        Ok(booking)
    }

    pub async fn list_for_user(&self, actor: &Actor, user_id: &str) -> CoreResult<Vec<Booking>> {
        if !actor.can_access_bookings_of(user_id) {
            return Err(CoreError::Forbidden(
                "Only the owning user or an admin may list these bookings".to_string(),
            ));
        }
        self.bookings.list_for_user(user_id).await
    }

    async fn load(&self, booking_id: Uuid) -> CoreResult<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Booking {booking_id} not found")))
    }

    fn require_admin(&self, actor: &Actor) -> CoreResult<()> {
        if !actor.is_admin {
            return Err(CoreError::Forbidden(
                "Only an admin may perform this action".to_string(),
            ));
        }
        Ok(())
    }

    fn require_status(
        &self,
        booking: &Booking,
        expected: BookingStatus,
        verb: &str,
    ) -> CoreResult<()> {
        if booking.booking_status != expected {
            return Err(CoreError::Validation(format!(
                "Cannot {} a {} booking",
                verb,
                booking.booking_status.as_str()
            )));
        }
        Ok(())
    }

    fn audit_update(&self, actor: &Actor, before: &serde_json::Value, booking: &Booking) {
        let after = booking.audit_snapshot();
        let changes = diff::update_changes(before, &after);
        let entry = AuditRecorder::entry(
            actor,
            faredesk_audit::AuditAction::Update,
            changes,
            after,
        );
        self.audit.record_update(entry, AuditRecord::Booking);
    }

    async fn notify_for(&self, booking: &Booking, status: StatusKind) {
        let pnr = match self.tickets.get(booking.ticket_id).await {
            Ok(Some(ticket)) => ticket.pnr,
            _ => String::new(),
        };
        self.notify(&booking.user_id, &pnr, status);
    }

    fn notify(&self, user: &str, pnr: &str, status: StatusKind) {
        let notifier = self.notifier.clone();
        let user = user.to_string();
        let pnr = pnr.to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_status(&user, &pnr, status).await {
                tracing::warn!("Status notification to {} failed: {}", user, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{InfantInput, PassengerInput};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use faredesk_audit::AuditSink;
    use faredesk_catalog::{ClassType, JourneyType, Ticket};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct TestStore {
        tickets: Mutex<HashMap<Uuid, Ticket>>,
        bookings: Mutex<HashMap<Uuid, Booking>>,
        audit: Mutex<Vec<AuditRecord>>,
        fail_booking_insert: bool,
    }

    impl TestStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                tickets: Mutex::new(HashMap::new()),
                bookings: Mutex::new(HashMap::new()),
                audit: Mutex::new(Vec::new()),
                fail_booking_insert: false,
            })
        }

        fn audit_records(&self) -> Vec<AuditRecord> {
            self.audit.lock().unwrap().clone()
        }

        fn available(&self, ticket_id: Uuid) -> i32 {
            self.tickets.lock().unwrap()[&ticket_id].available_seats
        }
    }

    #[async_trait]
    impl TicketRepository for TestStore {
        async fn insert(&self, ticket: &Ticket) -> CoreResult<()> {
            self.tickets
                .lock()
                .unwrap()
                .insert(ticket.id, ticket.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<Ticket>> {
            Ok(self.tickets.lock().unwrap().get(&id).cloned())
        }

        async fn get_by_pnr(&self, pnr: &str) -> CoreResult<Option<Ticket>> {
            Ok(self
                .tickets
                .lock()
                .unwrap()
                .values()
                .find(|t| t.pnr == pnr)
                .cloned())
        }

        async fn list(&self) -> CoreResult<Vec<Ticket>> {
            Ok(self.tickets.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, ticket: &Ticket) -> CoreResult<()> {
            self.tickets
                .lock()
                .unwrap()
                .insert(ticket.id, ticket.clone());
            Ok(())
        }

        async fn reserve_seats(&self, id: Uuid, count: i32) -> CoreResult<bool> {
            let mut tickets = self.tickets.lock().unwrap();
            match tickets.get_mut(&id) {
                Some(t) if t.available_seats >= count => {
                    t.available_seats -= count;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn release_seats(&self, id: Uuid, count: i32) -> CoreResult<()> {
            let mut tickets = self.tickets.lock().unwrap();
            if let Some(t) = tickets.get_mut(&id) {
                t.available_seats = (t.available_seats + count).min(t.total_seats);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BookingRepository for TestStore {
        async fn insert(&self, booking: &Booking) -> CoreResult<()> {
            if self.fail_booking_insert {
                return Err(CoreError::Internal("storage unavailable".to_string()));
            }
            self.bookings
                .lock()
                .unwrap()
                .insert(booking.id, booking.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>> {
            Ok(self.bookings.lock().unwrap().get(&id).cloned())
        }

        async fn list_for_user(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn update(&self, booking: &Booking) -> CoreResult<()> {
            self.bookings
                .lock()
                .unwrap()
                .insert(booking.id, booking.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl AuditSink for TestStore {
        async fn append(&self, record: AuditRecord) -> CoreResult<()> {
            self.audit.lock().unwrap().push(record);
            Ok(())
        }
    }

    fn ticket(available: i32, sale_price: i64, discount: i64, infant_fees: i64) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Uuid::new_v4(),
            pnr: "AB12CD".to_string(),
            airline: "Altair Air".to_string(),
            origin: "DEL".to_string(),
            destination: "BOM".to_string(),
            journey_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            departure_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(11, 45, 0).unwrap(),
            total_seats: 10,
            available_seats: available,
            sale_price,
            discount,
            infant_fees,
            journey_type: JourneyType::Domestic,
            class_type: ClassType::Economy,
            non_bookable: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn agent() -> Actor {
        Actor {
            id: "agent-1".to_string(),
            email: "agent@example.com".to_string(),
            name: "Agent One".to_string(),
            is_admin: false,
        }
    }

    fn admin() -> Actor {
        Actor {
            id: "admin-1".to_string(),
            email: "ops@example.com".to_string(),
            name: "Ops Admin".to_string(),
            is_admin: true,
        }
    }

    fn passenger(first: &str) -> PassengerInput {
        PassengerInput {
            honorific: "Mr".to_string(),
            first_name: first.to_string(),
            last_name: "Sharma".to_string(),
            dob: None,
            passport_number: None,
            passport_issue_date: None,
            passport_expiry_date: None,
            remarks: None,
        }
    }

    fn workflow(store: &Arc<TestStore>) -> BookingWorkflow {
        BookingWorkflow::new(
            store.clone() as Arc<dyn TicketRepository>,
            store.clone() as Arc<dyn BookingRepository>,
            AuditRecorder::new(store.clone() as Arc<dyn AuditSink>),
            Arc::new(faredesk_core::notify::LogNotifier),
        )
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String, StatusKind)>>,
    }

    #[async_trait]
    impl NotificationSender for RecordingNotifier {
        async fn send_status(
            &self,
            user: &str,
            ticket_pnr: &str,
            status: StatusKind,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.sent
                .lock()
                .unwrap()
                .push((user.to_string(), ticket_pnr.to_string(), status));
            Ok(())
        }
    }

    async fn drain_side_effects() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn booking_request(ticket_id: Uuid, seats: i32, total: i64) -> CreateBookingRequest {
        CreateBookingRequest {
            ticket_id,
            number_of_seats: seats,
            passengers: (0..seats).map(|i| passenger(&format!("Pax{i}"))).collect(),
            infants: vec![],
            total_amount: total,
        }
    }

    #[tokio::test]
    async fn test_create_reserves_seats_and_audits() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 4000, 500);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let mut req = booking_request(ticket_id, 2, 8500);
        req.infants.push(InfantInput {
            first_name: "Anya".to_string(),
            last_name: "Sharma".to_string(),
            dob: NaiveDate::from_ymd_opt(2026, 1, 15),
        });

        let created = wf.create(&agent(), req).await.unwrap();
        assert_eq!(created.booking.total_amount, 8500);
        assert_eq!(created.booking.booking_status, BookingStatus::Pending);
        assert_eq!(created.booking.payment_method, PaymentMethod::NotApplicable);
        assert!(created.booking.reference.starts_with("BK"));
        assert_eq!(store.available(ticket_id), 3);

        drain_side_effects().await;
        let records = store.audit_records();
        assert_eq!(records.len(), 1);
        match &records[0] {
            AuditRecord::Booking(entry) => {
                assert_eq!(entry.action, faredesk_audit::AuditAction::Create);
                assert_eq!(entry.changes["total_amount"].to, serde_json::json!(8500));
            }
            other => panic!("expected booking audit, got {}", other.entity()),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_tampered_total_without_reserving() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 4000, 500);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let mut req = booking_request(ticket_id, 2, 9000);
        req.infants.push(InfantInput {
            first_name: "Anya".to_string(),
            last_name: "Sharma".to_string(),
            dob: NaiveDate::from_ymd_opt(2026, 1, 15),
        });

        let err = wf.create(&agent(), req).await.unwrap_err();
        assert!(matches!(err, CoreError::PriceMismatch { .. }));
        assert_eq!(store.available(ticket_id), 5);

        drain_side_effects().await;
        assert!(store.audit_records().is_empty());
    }

    #[tokio::test]
    async fn test_create_fails_when_not_enough_seats() {
        let store = TestStore::new();
        let t = ticket(2, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let err = wf
            .create(&agent(), booking_request(ticket_id, 3, 15000))
            .await
            .unwrap_err();
        match err {
            CoreError::InsufficientInventory {
                requested,
                available,
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientInventory, got {other:?}"),
        }
        assert_eq!(store.available(ticket_id), 2);
    }

    #[tokio::test]
    async fn test_failed_persist_releases_reservation() {
        let mut inner = TestStore {
            tickets: Mutex::new(HashMap::new()),
            bookings: Mutex::new(HashMap::new()),
            audit: Mutex::new(Vec::new()),
            fail_booking_insert: true,
        };
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        inner.tickets.get_mut().unwrap().insert(ticket_id, t);
        let store = Arc::new(inner);

        let wf = workflow(&store);
        let err = wf
            .create(&agent(), booking_request(ticket_id, 2, 10000))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
        assert_eq!(store.available(ticket_id), 5);
    }

    #[tokio::test]
    async fn test_approve_requires_admin_and_pending() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let created = wf
            .create(&agent(), booking_request(ticket_id, 1, 5000))
            .await
            .unwrap();
        let booking_id = created.booking.id;

        let approve = ApproveRequest {
            payment_status: ApprovalPayment::Unpaid,
            payment_method: None,
            transaction_id: None,
        };
        let err = wf
            .approve(&agent(), booking_id, approve.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let approved = wf.approve(&admin(), booking_id, approve.clone()).await.unwrap();
        assert_eq!(approved.booking_status, BookingStatus::Confirmed);
        // Unpaid approval keeps the stored payment status Pending.
        assert_eq!(approved.payment_status, PaymentStatus::Pending);
        // Seats were reserved at creation and stay reserved.
        assert_eq!(store.available(ticket_id), 4);

        let err = wf.approve(&admin(), booking_id, approve).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_notifications_address_the_booking_owner() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let wf = BookingWorkflow::new(
            store.clone() as Arc<dyn TicketRepository>,
            store.clone() as Arc<dyn BookingRepository>,
            AuditRecorder::new(store.clone() as Arc<dyn AuditSink>),
            notifier.clone(),
        );

        let created = wf
            .create(&agent(), booking_request(ticket_id, 1, 5000))
            .await
            .unwrap();
        wf.approve(
            &admin(),
            created.booking.id,
            ApproveRequest {
                payment_status: ApprovalPayment::Paid,
                payment_method: Some(PaymentMethod::Online),
                transaction_id: None,
            },
        )
        .await
        .unwrap();

        drain_side_effects().await;
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        // Every status goes to the booking's owning user, regardless of who
        // triggered the transition.
        assert_eq!(sent[0], ("agent-1".to_string(), "AB12CD".to_string(), StatusKind::Created));
        assert_eq!(sent[1], ("agent-1".to_string(), "AB12CD".to_string(), StatusKind::Approved));
    }

    #[tokio::test]
    async fn test_reject_releases_exactly_the_reserved_seats() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let created = wf
            .create(&agent(), booking_request(ticket_id, 3, 15000))
            .await
            .unwrap();
        assert_eq!(store.available(ticket_id), 2);

        let rejected = wf
            .reject(&admin(), created.booking.id, Some("Overbooked".to_string()))
            .await
            .unwrap();
        assert_eq!(rejected.booking_status, BookingStatus::Cancelled);
        assert_eq!(rejected.remarks.as_deref(), Some("Overbooked"));
        assert_eq!(store.available(ticket_id), 5);
        // Display override: cancelled bookings present payment as Failed.
        assert_eq!(rejected.display_payment_status(), PaymentStatus::Failed);

        drain_side_effects().await;
        let updates: Vec<_> = store
            .audit_records()
            .into_iter()
            .filter(|r| matches!(r, AuditRecord::Booking(e) if e.action == faredesk_audit::AuditAction::Update))
            .collect();
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn test_update_payment_only_touches_payment_fields() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let created = wf
            .create(&agent(), booking_request(ticket_id, 1, 5000))
            .await
            .unwrap();
        let booking_id = created.booking.id;

        wf.approve(
            &admin(),
            booking_id,
            ApproveRequest {
                payment_status: ApprovalPayment::Unpaid,
                payment_method: None,
                transaction_id: None,
            },
        )
        .await
        .unwrap();
        drain_side_effects().await;
        let audit_before = store.audit_records().len();

        let updated = wf
            .update_payment(
                &admin(),
                booking_id,
                UpdatePaymentRequest {
                    payment_method: PaymentMethod::Online,
                    transaction_id: Some("TXN-554".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.booking_status, BookingStatus::Confirmed);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.payment_method, PaymentMethod::Online);
        assert_eq!(updated.transaction_id.as_deref(), Some("TXN-554"));
        assert_eq!(store.available(ticket_id), 4);

        drain_side_effects().await;
        let records = store.audit_records();
        assert_eq!(records.len(), audit_before + 1);
        match records.last().unwrap() {
            AuditRecord::Booking(entry) => {
                let change = &entry.changes["payment_status"];
                assert_eq!(change.from, serde_json::json!("Pending"));
                assert_eq!(change.to, serde_json::json!("Paid"));
            }
            other => panic!("expected booking audit, got {}", other.entity()),
        }

        // A second payment update is rejected.
        let err = wf
            .update_payment(
                &admin(),
                booking_id,
                UpdatePaymentRequest {
                    payment_method: PaymentMethod::Online,
                    transaction_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_complete_requires_confirmed() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let created = wf
            .create(&agent(), booking_request(ticket_id, 1, 5000))
            .await
            .unwrap();

        let err = wf.complete(&admin(), created.booking.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        wf.approve(
            &admin(),
            created.booking.id,
            ApproveRequest {
                payment_status: ApprovalPayment::Paid,
                payment_method: Some(PaymentMethod::Offline),
                transaction_id: None,
            },
        )
        .await
        .unwrap();

        let completed = wf.complete(&admin(), created.booking.id).await.unwrap();
        assert_eq!(completed.booking_status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_booking_reads_are_owner_or_admin_only() {
        let store = TestStore::new();
        let t = ticket(5, 5000, 0, 0);
        let ticket_id = t.id;
        TicketRepository::insert(store.as_ref(), &t).await.unwrap();

        let wf = workflow(&store);
        let created = wf
            .create(&agent(), booking_request(ticket_id, 1, 5000))
            .await
            .unwrap();

        let stranger = Actor {
            id: "agent-2".to_string(),
            email: "other@example.com".to_string(),
            name: "Other Agent".to_string(),
            is_admin: false,
        };
        let err = wf.get(&stranger, created.booking.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        assert!(matches!(
            wf.list_for_user(&stranger, "agent-1").await.unwrap_err(),
            CoreError::Forbidden(_)
        ));

        assert!(wf.get(&agent(), created.booking.id).await.is_ok());
        assert_eq!(wf.list_for_user(&admin(), "agent-1").await.unwrap().len(), 1);
    }
}
