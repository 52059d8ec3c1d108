pub mod chatdb;
pub mod db;
pub mod idempotency;
pub mod offerdb;
pub mod taskdb;
pub mod userdb;
