use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use faredesk_api::{
    app,
    state::{AppState, AuthConfig},
};
use faredesk_audit::AuditRecorder;
use faredesk_core::notify::LogNotifier;
use faredesk_order::{BookingWorkflow, PassengerRecordEditor};
use faredesk_store::audit_repo::PgAuditSink;
use faredesk_store::booking_repo::PgBookingRepository;
use faredesk_store::ticket_repo::PgTicketRepository;
use faredesk_store::{DbClient, TicketListCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "faredesk_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = faredesk_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting FareDesk API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let tickets = Arc::new(PgTicketRepository::new(db.pool.clone()));
    let bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let audit = AuditRecorder::new(Arc::new(PgAuditSink::new(db.pool.clone())));
    let notifier = Arc::new(LogNotifier);

    let workflow = Arc::new(BookingWorkflow::new(
        tickets.clone(),
        bookings.clone(),
        audit.clone(),
        notifier,
    ));
    let editor = Arc::new(PassengerRecordEditor::new(
        bookings,
        tickets.clone(),
        audit.clone(),
    ));
    let ticket_cache = Arc::new(TicketListCache::new(Duration::from_secs(
        config.business_rules.ticket_cache_ttl_seconds,
    )));

    let app_state = AppState {
        tickets,
        workflow,
        editor,
        audit,
        ticket_cache,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
