pub mod prelude;

pub mod messages;
pub mod teams;
pub mod users;
