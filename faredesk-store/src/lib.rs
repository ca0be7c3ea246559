pub mod app_config;
pub mod audit_repo;
pub mod booking_repo;
pub mod cache;
pub mod database;
pub mod memory;
pub mod ticket_repo;

pub use cache::TicketListCache;
pub use database::DbClient;
pub use memory::MemoryStore;
