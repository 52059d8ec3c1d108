pub mod error;
pub mod notification_service;
pub mod offer_service;
pub mod push;
