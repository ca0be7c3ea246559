pub mod pricing;
pub mod repository;
pub mod ticket;

pub use repository::TicketRepository;
pub use ticket::{ClassType, CreateTicketRequest, JourneyType, Ticket};
