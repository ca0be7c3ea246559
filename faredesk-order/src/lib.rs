pub mod models;
pub mod passenger;
pub mod reference;
pub mod repository;
pub mod validate;
pub mod workflow;

pub use models::{
    Booking, BookingStatus, Infant, Passenger, PassengerType, PaymentMethod, PaymentStatus,
};
pub use passenger::{EditPassengerRequest, PassengerRecordEditor};
pub use repository::BookingRepository;
pub use workflow::{ApproveRequest, BookingWorkflow, CreateBookingRequest, UpdatePaymentRequest};
