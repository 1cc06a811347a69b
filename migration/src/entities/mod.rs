pub mod link;
pub mod ticket;

pub use link::Entity as LinkEntity;
pub use ticket::Entity as TicketEntity;
