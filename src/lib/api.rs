pub mod handlers;
pub mod messages;
