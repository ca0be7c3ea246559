use faredesk_audit::AuditRecorder;
use faredesk_catalog::TicketRepository;
use faredesk_order::{BookingWorkflow, PassengerRecordEditor};
use faredesk_store::TicketListCache;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub tickets: Arc<dyn TicketRepository>,
    pub workflow: Arc<BookingWorkflow>,
    pub editor: Arc<PassengerRecordEditor>,
    pub audit: AuditRecorder,
    pub ticket_cache: Arc<TicketListCache>,
    pub auth: AuthConfig,
}
