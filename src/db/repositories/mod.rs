pub mod message;
pub mod team;
pub mod user;
