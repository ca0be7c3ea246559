use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What happened to the booking, from the traveller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    Created,
    Approved,
    Rejected,
}

/// Outbound status notification collaborator (email/WhatsApp delivery lives
/// outside the core). Failures are logged by callers and never propagated.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_status(
        &self,
        user: &str,
        ticket_pnr: &str,
        status: StatusKind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default sender that only records the intent in the log stream.
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send_status(
        &self,
        user: &str,
        ticket_pnr: &str,
        status: StatusKind,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "Notifying {} about ticket {}: {:?}",
            user,
            ticket_pnr,
            status
        );
        Ok(())
    }
}
