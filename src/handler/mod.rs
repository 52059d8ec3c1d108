pub mod chat;
pub mod offers;
pub mod tasks;
pub mod users;
